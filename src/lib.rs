//! Compilador para un lenguaje declarativo de circuitos combinacionales.
//!
//! # Front end
//! Cada circuito deriva de un único programa fuente. El texto se somete
//! primero a análisis léxico en [`lex`], de lo cual se obtiene una
//! secuencia de tokens. Los tokens se disponen en un AST por medio de
//! análisis sintáctico en [`parse`]. El árbol es verificado por
//! análisis semántico en [`semantic`], que construye la tabla de
//! símbolos y rechaza los lazos combinacionales.
//!
//! # Middle y back end
//! Un árbol validado se rebaja a cuádruplas en [`ir`], las cuales se
//! reescriben y podan en [`optimize`]. Finalmente [`emit`] traduce las
//! cuádruplas optimizadas a un programa ejecutable que simula el
//! circuito.
//!
//! Cada fase consume por completo la salida de la anterior; no hay
//! procesamiento incremental ni estado compartido entre compilaciones.

pub mod emit;
pub mod error;
pub mod ir;
pub mod lex;
pub mod optimize;
pub mod parse;
pub mod semantic;
pub mod source;

use error::Diagnostics;
use ir::Quadruple;
use lex::Identifier;
use semantic::SymbolTable;

/// Producto de una compilación exitosa.
///
/// Las listas de cuádruplas previa y posterior a la optimización se
/// conservan ambas para que puedan inspeccionarse.
#[derive(Debug)]
pub struct Compilation {
    pub name: Identifier,
    pub symbols: SymbolTable,
    pub ir: Vec<Quadruple>,
    pub optimized: Vec<Quadruple>,
}

/// Ejecuta la pipeline completa sobre un programa fuente.
///
/// Retorna exactamente uno de dos resultados: el producto de la
/// compilación, o la lista de diagnósticos que la impidió.
pub fn compile(source: &str) -> Result<Compilation, Diagnostics> {
    let tokens = lex::tokenize(source)?;
    let ast = parse::parse(tokens)?;
    let symbols = semantic::analyze(&ast)?;

    let ir = ir::generate(&ast);
    let optimized = optimize::optimize(&ir, &symbols);

    Ok(Compilation {
        name: ast.name.clone(),
        symbols,
        ir,
        optimized,
    })
}
