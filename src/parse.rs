//! Análisis sintáctico.
//!
//! Descenso recursivo LL(1) sobre la gramática del lenguaje, con un
//! único token de lookahead y sin retroceso. Todas las declaraciones
//! preceden a las compuertas: el lazo de declaraciones se detiene en el
//! primer token que no es una palabra clave de declaración.

use std::{iter::Peekable, vec};
use thiserror::Error;

use crate::{
    lex::{Identifier, Keyword, Token},
    source::{Located, Position},
};

/// Árbol de sintaxis de un circuito completo.
#[derive(Debug)]
pub struct Program {
    pub name: Identifier,
    pub declarations: Vec<Declaration>,
    pub gates: Vec<Gate>,
}

/// Una declaración de señales.
#[derive(Debug)]
pub struct Declaration {
    pub category: Category,
    pub identifiers: Vec<Identifier>,
}

/// Clase de una señal declarada.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Category {
    Input,
    Output,
    Wire,
}

impl std::fmt::Display for Category {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Input => fmt.write_str("INPUT"),
            Category::Output => fmt.write_str("OUTPUT"),
            Category::Wire => fmt.write_str("WIRE"),
        }
    }
}

/// Una asignación de compuerta de salida única.
#[derive(Debug)]
pub struct Gate {
    pub output: Identifier,
    pub op: GateOp,
    pub inputs: Vec<Identifier>,
}

/// Operador de una compuerta.
///
/// `Buf` no proviene de ninguna palabra reservada: es la forma
/// `salida = señal;`, que copia su única entrada.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GateOp {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Not,
    Buf,
}

impl GateOp {
    /// Cantidad exacta de entradas que exige el operador.
    pub fn arity(self) -> usize {
        match self {
            GateOp::Not | GateOp::Buf => 1,
            _ => 2,
        }
    }

    fn from_keyword(keyword: Keyword) -> Option<GateOp> {
        match keyword {
            Keyword::And => Some(GateOp::And),
            Keyword::Or => Some(GateOp::Or),
            Keyword::Xor => Some(GateOp::Xor),
            Keyword::Nand => Some(GateOp::Nand),
            Keyword::Nor => Some(GateOp::Nor),
            Keyword::Not => Some(GateOp::Not),
            _ => None,
        }
    }
}

impl std::fmt::Display for GateOp {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateOp::And => fmt.write_str("AND"),
            GateOp::Or => fmt.write_str("OR"),
            GateOp::Xor => fmt.write_str("XOR"),
            GateOp::Nand => fmt.write_str("NAND"),
            GateOp::Nor => fmt.write_str("NOR"),
            GateOp::Not => fmt.write_str("NOT"),
            GateOp::Buf => fmt.write_str("BUF"),
        }
    }
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Expected {0}, found {1} instead")]
    UnexpectedToken(Token, Token),

    #[error("Expected {0}, none was found instead")]
    MissingToken(Token),

    #[error("Expected identifier, found {0} instead")]
    ExpectedId(Token),

    #[error(
        "Nested gate expressions are not supported: found gate operator `{0}` \
         where an identifier was expected; introduce an intermediate WIRE instead"
    )]
    NestedGate(Keyword),

    #[error("Expected a gate operator after `=`, found {0} instead")]
    ExpectedGateOp(Token),

    #[error("Abrupt end of program")]
    UnexpectedEof,
}

/// Dispone una secuencia de tokens en un árbol de sintaxis.
pub fn parse(tokens: Vec<Located<Token>>) -> Result<Program, Located<ParserError>> {
    let mut parser = Parser {
        tokens: tokens.into_iter().peekable(),
        last_known: Position::default(),
    };

    parser.program()
}

type Parse<T> = Result<T, Located<ParserError>>;

struct Parser {
    tokens: Peekable<vec::IntoIter<Located<Token>>>,
    last_known: Position,
}

impl Parser {
    fn program(&mut self) -> Parse<Program> {
        self.keyword(Keyword::Circuit)?;
        let name = self.id()?;
        self.expect(Token::OpenCurly)?;

        let declarations = self.declarations()?;
        let gates = self.gates()?;

        self.expect(Token::CloseCurly)?;

        Ok(Program {
            name,
            declarations,
            gates,
        })
    }

    fn declarations(&mut self) -> Parse<Vec<Declaration>> {
        let mut declarations = Vec::new();
        while let Some(category) = self.peek_category() {
            self.next()?;

            let identifiers = self.ident_list()?;
            self.expect(Token::Semicolon)?;

            declarations.push(Declaration {
                category,
                identifiers,
            });
        }

        Ok(declarations)
    }

    fn peek_category(&mut self) -> Option<Category> {
        match self.tokens.peek().map(Located::as_ref) {
            Some(Token::Keyword(Keyword::Input)) => Some(Category::Input),
            Some(Token::Keyword(Keyword::Output)) => Some(Category::Output),
            Some(Token::Keyword(Keyword::Wire)) => Some(Category::Wire),
            _ => None,
        }
    }

    fn gates(&mut self) -> Parse<Vec<Gate>> {
        let mut gates = Vec::new();
        while matches!(self.tokens.peek().map(Located::as_ref), Some(Token::Id(_))) {
            gates.push(self.gate()?);
        }

        Ok(gates)
    }

    fn gate(&mut self) -> Parse<Gate> {
        let output = self.id()?;
        self.expect(Token::Assign)?;

        let (op, inputs) = match self.next()?.into_inner() {
            Token::Keyword(keyword) => match GateOp::from_keyword(keyword) {
                Some(op) => {
                    self.expect(Token::OpenParen)?;
                    let inputs = self.ident_list()?;
                    self.expect(Token::CloseParen)?;

                    (op, inputs)
                }

                None => return self.fail(ParserError::ExpectedGateOp(Token::Keyword(keyword))),
            },

            // Forma de copia directa: `salida = señal;`
            Token::Id(id) => (GateOp::Buf, vec![id]),
            Token::Constant(constant) => (GateOp::Buf, vec![Identifier::from(constant.name())]),

            token => return self.fail(ParserError::ExpectedGateOp(token)),
        };

        self.expect(Token::Semicolon)?;

        Ok(Gate { output, op, inputs })
    }

    fn ident_list(&mut self) -> Parse<Vec<Identifier>> {
        let mut identifiers = vec![self.element()?];
        while matches!(self.tokens.peek().map(Located::as_ref), Some(Token::Comma)) {
            self.next()?;
            identifiers.push(self.element()?);
        }

        Ok(identifiers)
    }

    /// Elemento de una lista: identificador o literal constante.
    ///
    /// Encontrar un operador de compuerta aquí amerita un diagnóstico
    /// específico: el lenguaje no admite anidar compuertas.
    fn element(&mut self) -> Parse<Identifier> {
        match self.next()?.into_inner() {
            Token::Id(id) => Ok(id),
            Token::Constant(constant) => Ok(Identifier::from(constant.name())),

            Token::Keyword(keyword) if GateOp::from_keyword(keyword).is_some() => {
                self.fail(ParserError::NestedGate(keyword))
            }

            token => self.fail(ParserError::ExpectedId(token)),
        }
    }

    fn id(&mut self) -> Parse<Identifier> {
        match self.next()?.into_inner() {
            Token::Id(id) => Ok(id),
            token => self.fail(ParserError::ExpectedId(token)),
        }
    }

    fn keyword(&mut self, keyword: Keyword) -> Parse<()> {
        self.expect(Token::Keyword(keyword))
    }

    fn expect(&mut self, token: Token) -> Parse<()> {
        match self.next().map(Located::into_inner) {
            Ok(found) if found == token => Ok(()),
            Ok(found) => self.fail(ParserError::UnexpectedToken(token, found)),
            Err(_) => self.fail(ParserError::MissingToken(token)),
        }
    }

    fn next(&mut self) -> Parse<Located<Token>> {
        match self.tokens.next() {
            Some(token) => {
                self.last_known = token.position();
                Ok(token)
            }

            None => self.fail(ParserError::UnexpectedEof),
        }
    }

    fn fail<T>(&self, error: ParserError) -> Parse<T> {
        Err(Located::at(error, self.last_known))
    }
}
