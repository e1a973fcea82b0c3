use std::fmt::{self, Display};

use crate::{
    lex::Identifier,
    parse::{GateOp, Program},
};

/// Operador de una cuádrupla.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Op {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Not,

    /// Copia de un único operando. Proviene de compuertas de copia
    /// directa o de reescrituras del optimizador.
    Assign,
}

impl From<GateOp> for Op {
    fn from(op: GateOp) -> Self {
        match op {
            GateOp::And => Op::And,
            GateOp::Or => Op::Or,
            GateOp::Xor => Op::Xor,
            GateOp::Nand => Op::Nand,
            GateOp::Nor => Op::Nor,
            GateOp::Not => Op::Not,
            GateOp::Buf => Op::Assign,
        }
    }
}

impl Display for Op {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::And => fmt.write_str("AND"),
            Op::Or => fmt.write_str("OR"),
            Op::Xor => fmt.write_str("XOR"),
            Op::Nand => fmt.write_str("NAND"),
            Op::Nor => fmt.write_str("NOR"),
            Op::Not => fmt.write_str("NOT"),
            Op::Assign => fmt.write_str("ASSIGN"),
        }
    }
}

/// Una instrucción de tres direcciones.
///
/// `arg2` está ausente exactamente cuando el operador es unario. Las
/// cuádruplas son objetos de valor: el optimizador las copia y
/// reescribe libremente sin tocar la lista original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quadruple {
    pub op: Op,
    pub arg1: Identifier,
    pub arg2: Option<Identifier>,
    pub result: Identifier,
}

impl Display for Quadruple {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arg2 {
            Some(arg2) => write!(fmt, "({}, {}, {}, {})", self.op, self.arg1, arg2, self.result),
            None => write!(fmt, "({}, {}, -, {})", self.op, self.arg1, self.result),
        }
    }
}

/// Rebaja el árbol de sintaxis a una lista plana de cuádruplas.
///
/// Traducción estructural 1:1 en orden de fuente: una cuádrupla por
/// compuerta, sin reordenar, fusionar ni introducir temporales. Esta
/// fase no falla sobre un árbol semánticamente válido.
pub fn generate(ast: &Program) -> Vec<Quadruple> {
    ast.gates
        .iter()
        .map(|gate| Quadruple {
            op: Op::from(gate.op),
            arg1: gate.inputs[0].clone(),
            arg2: gate.inputs.get(1).cloned(),
            result: gate.output.clone(),
        })
        .collect()
}
