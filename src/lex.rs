//! Análisis léxico.
//!
//! # Tokenization
//! Esta es la primera fase del compilador. Descompone el texto fuente
//! en unidades léxicas denominadas tokens. Los espacios en blanco y los
//! saltos de línea se descartan durante esta operación, aunque siguen
//! avanzando la contabilidad de línea y columna. Cada token emitido
//! está asociado a la posición donde inicia en el código fuente.
//!
//! # Reglas importantes del lenguaje
//! - Las palabras reservadas se reconocen antes que los identificadores
//!   genéricos. Este orden no es accidental: de lo contrario `AND` y
//!   compañía se clasificarían como identificadores.
//! - Los identificadores inician con letra o `'_'` y distinguen entre
//!   mayúsculas y minúsculas; `and` es un identificador, `AND` no.
//! - Los únicos dígitos aceptados son los literales `0` y `1`; cualquier
//!   otro dígito es un error léxico.
//!
//! # Errores
//! El primer carácter que no corresponde a ningún patrón aborta el
//! escaneo de inmediato. A diferencia de la fase semántica, aquí no se
//! acumulan diagnósticos.

use crate::source::{Located, Position};
use std::{
    fmt::{self, Display},
    iter::Peekable,
    rc::Rc,
    str::{Chars, FromStr},
};

use thiserror::Error;

/// Error de escaneo.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexerError {
    /// Carácter desconocido o inesperado en el flujo de entrada.
    #[error("Unexpected character {0:?} in input stream")]
    BadChar(char),
}

/// Un identificador o, en general, el nombre de una señal.
///
/// Los literales `0`/`1` también se representan con este tipo, ya que
/// fases posteriores los tratan como nombres de señal constantes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(Rc<str>);

impl Identifier {
    /// Valor booleano si el nombre es uno de los literales `0`/`1`.
    pub fn as_constant(&self) -> Option<bool> {
        match &*self.0 {
            "0" => Some(false),
            "1" => Some(true),
            _ => None,
        }
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier(Rc::from(name))
    }
}

impl Display for Identifier {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_ref().fmt(fmt)
    }
}

/// Objeto resultante del análisis léxico.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Identificador.
    Id(Identifier),

    /// Palabra reservada.
    Keyword(Keyword),

    /// Literal booleano.
    Constant(Constant),

    /// `=`
    Assign,

    /// `,`
    Comma,

    /// `;`
    Semicolon,

    /// `(`
    OpenParen,

    /// `)`
    CloseParen,

    /// `{`
    OpenCurly,

    /// `}`
    CloseCurly,
}

impl Display for Token {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Token::*;

        match self {
            Id(id) => write!(fmt, "identifier `{}`", id),
            Keyword(keyword) => write!(fmt, "keyword `{}`", keyword),
            Constant(constant) => write!(fmt, "constant `{}`", constant),
            Assign => fmt.write_str("`=`"),
            Comma => fmt.write_str("`,`"),
            Semicolon => fmt.write_str("`;`"),
            OpenParen => fmt.write_str("`(`"),
            CloseParen => fmt.write_str("`)`"),
            OpenCurly => fmt.write_str("`{`"),
            CloseCurly => fmt.write_str("`}`"),
        }
    }
}

/// Un literal booleano `0` o `1`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Constant {
    Zero,
    One,
}

impl Constant {
    /// Nombre de señal con el cual el literal participa en fases
    /// posteriores.
    pub fn name(self) -> &'static str {
        match self {
            Constant::Zero => "0",
            Constant::One => "1",
        }
    }
}

impl Display for Constant {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(self.name())
    }
}

/// Una palabra reservada.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Keyword {
    Circuit,
    Input,
    Output,
    Wire,
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Not,
}

impl Display for Keyword {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Keyword::*;

        let string = match self {
            Circuit => "CIRCUIT",
            Input   => "INPUT",
            Output  => "OUTPUT",
            Wire    => "WIRE",
            And     => "AND",
            Or      => "OR",
            Xor     => "XOR",
            Nand    => "NAND",
            Nor     => "NOR",
            Not     => "NOT",
        };

        fmt.write_str(string)
    }
}

impl FromStr for Keyword {
    type Err = ();

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        use Keyword::*;

        const KEYWORDS: &[(&str, Keyword)] = &[
            ("CIRCUIT", Circuit),
            ("INPUT",   Input),
            ("OUTPUT",  Output),
            ("WIRE",    Wire),
            ("AND",     And),
            ("OR",      Or),
            ("XOR",     Xor),
            ("NAND",    Nand),
            ("NOR",     Nor),
            ("NOT",     Not),
        ];

        KEYWORDS
            .iter()
            .find(|&&(name, _)| name == string)
            .map(|&(_, keyword)| keyword)
            .ok_or(())
    }
}

/// Escáner sobre un programa fuente.
pub struct Lexer<'a> {
    source: Peekable<Chars<'a>>,
    next: Position,
}

impl<'a> Lexer<'a> {
    /// Crea un lexer en estado inicial sobre el texto dado.
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source: source.chars().peekable(),
            next: Position::default(),
        }
    }

    /// Consume el siguiente carácter, avanzando línea y columna.
    fn bump(&mut self) -> Option<char> {
        let c = self.source.next()?;
        self.next = match c {
            '\n' => self.next.newline(),
            _ => self.next.advance(),
        };

        Some(c)
    }

    /// Intenta construir un siguiente token.
    fn lex(&mut self) -> Option<Result<Located<Token>, Located<LexerError>>> {
        use Token::*;

        // Primero se descarta todo espacio en blanco
        while self.source.peek()?.is_ascii_whitespace() {
            self.bump();
        }

        let start = self.next;
        let c = self.bump()?;

        let token = match c {
            '=' => Assign,
            ',' => Comma,
            ';' => Semicolon,
            '(' => OpenParen,
            ')' => CloseParen,
            '{' => OpenCurly,
            '}' => CloseCurly,

            '0' => Constant(self::Constant::Zero),
            '1' => Constant(self::Constant::One),

            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut word = c.to_string();
                while self.source.peek().copied().map_or(false, is_word_char) {
                    // El carácter ya fue observado con lookahead
                    word.push(self.bump().unwrap());
                }

                // Palabras reservadas antes que identificadores
                match self::Keyword::from_str(&word) {
                    Ok(keyword) => Keyword(keyword),
                    Err(()) => Id(Identifier(Rc::from(word))),
                }
            }

            c => return Some(Err(Located::at(LexerError::BadChar(c), start))),
        };

        Some(Ok(Located::at(token, start)))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Located<Token>, Located<LexerError>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lex()
    }
}

/// Reduce un programa completo a su secuencia de tokens.
///
/// El primer error léxico descarta los tokens acumulados y aborta el
/// escaneo.
pub fn tokenize(source: &str) -> Result<Vec<Located<Token>>, Located<LexerError>> {
    Lexer::new(source).collect()
}

/// Determina si un carácter puede continuar un término.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
