use std::{
    error::Error,
    fmt::{self, Display},
};

use crate::{lex::LexerError, parse::ParserError, semantic::SemanticError, source::Located};

/// Un diagnóstico de cualquier fase del compilador.
#[derive(Debug)]
pub enum Diagnostic {
    Lexical(Located<LexerError>),
    Syntax(Located<ParserError>),
    Semantic(SemanticError),
}

impl Diagnostic {
    fn kind(&self) -> &'static str {
        match self {
            Diagnostic::Lexical(_) => "lexical error",
            Diagnostic::Syntax(_) => "syntax error",
            Diagnostic::Semantic(_) => "semantic error",
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Lexical(error) => {
                writeln!(fmt, "{}: {}", self.kind(), error.as_ref())?;
                let position = error.position();
                write!(fmt, " --> line {}, column {}", position.line(), position.column())
            }

            Diagnostic::Syntax(error) => {
                writeln!(fmt, "{}: {}", self.kind(), error.as_ref())?;
                let position = error.position();
                write!(fmt, " --> line {}, column {}", position.line(), position.column())
            }

            // Los diagnósticos semánticos no señalan una posición
            Diagnostic::Semantic(error) => write!(fmt, "{}: {}", self.kind(), error),
        }
    }
}

/// Lista ordenada de diagnósticos de un intento de compilación.
#[derive(Debug, Default)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Located<LexerError>> for Diagnostics {
    fn from(error: Located<LexerError>) -> Self {
        Diagnostics(vec![Diagnostic::Lexical(error)])
    }
}

impl From<Located<ParserError>> for Diagnostics {
    fn from(error: Located<ParserError>) -> Self {
        Diagnostics(vec![Diagnostic::Syntax(error)])
    }
}

impl From<Vec<SemanticError>> for Diagnostics {
    fn from(errors: Vec<SemanticError>) -> Self {
        Diagnostics(errors.into_iter().map(Diagnostic::Semantic).collect())
    }
}

impl Display for Diagnostics {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Diagnostics(diagnostics) = self;

        if diagnostics.is_empty() {
            return writeln!(fmt, "No errors were reported");
        }

        for diagnostic in diagnostics {
            writeln!(fmt, "{}", diagnostic)?;
        }

        let error_or_errors = if diagnostics.len() == 1 { "error" } else { "errors" };
        writeln!(
            fmt,
            "Build failed with {} {}",
            diagnostics.len(),
            error_or_errors
        )
    }
}

impl Error for Diagnostics {}
