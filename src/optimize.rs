//! Optimización de cuádruplas.
//!
//! Dos pasadas ordenadas. La primera reescribe cada instrucción por
//! separado: primero se intenta plegado de constantes, luego
//! simplificación algebraica; una instrucción que no calza con ninguna
//! regla pasa sin cambios. La segunda pasada elimina código muerto por
//! vitalidad. La vitalidad se computa sobre la salida de la primera
//! pasada, nunca antes: reescribir puede dejar sin consumidores a una
//! señal que antes los tenía.

use std::collections::HashSet;

use crate::{
    ir::{Op, Quadruple},
    lex::Identifier,
    parse::Category,
    semantic::SymbolTable,
};

/// Reescribe y poda una lista de cuádruplas.
///
/// Preserva la función booleana del circuito bajo toda asignación de
/// valores a sus entradas. La lista de entrada nunca se modifica; el
/// resultado es una lista nueva.
pub fn optimize(quads: &[Quadruple], symbols: &SymbolTable) -> Vec<Quadruple> {
    let rewritten: Vec<Quadruple> = quads
        .iter()
        .map(|quad| {
            constant_folding(quad)
                .or_else(|| algebraic_simplification(quad))
                .unwrap_or_else(|| quad.clone())
        })
        .collect();

    eliminate_dead_code(rewritten, symbols)
}

/// Plegado de constantes sobre los nombres literales `0` y `1`:
/// leyes de identidad, aniquilación y absorción.
fn constant_folding(quad: &Quadruple) -> Option<Quadruple> {
    let arg1 = &quad.arg1;
    let arg2 = quad.arg2.as_ref()?;

    match quad.op {
        Op::And => {
            if is(arg1, "0") || is(arg2, "0") {
                return Some(assign(Identifier::from("0"), quad));
            }
            if is(arg1, "1") {
                return Some(assign(arg2.clone(), quad));
            }
            if is(arg2, "1") {
                return Some(assign(arg1.clone(), quad));
            }
        }

        Op::Or => {
            if is(arg1, "1") || is(arg2, "1") {
                return Some(assign(Identifier::from("1"), quad));
            }
            if is(arg1, "0") {
                return Some(assign(arg2.clone(), quad));
            }
            if is(arg2, "0") {
                return Some(assign(arg1.clone(), quad));
            }
        }

        Op::Xor => {
            if is(arg1, "0") {
                return Some(assign(arg2.clone(), quad));
            }
            if is(arg2, "0") {
                return Some(assign(arg1.clone(), quad));
            }
            if arg1 == arg2 {
                return Some(assign(Identifier::from("0"), quad));
            }
        }

        _ => {}
    }

    None
}

/// Simplificación de operadores binarios autorreferenciales,
/// independiente de operandos constantes.
fn algebraic_simplification(quad: &Quadruple) -> Option<Quadruple> {
    let arg2 = quad.arg2.as_ref()?;
    if &quad.arg1 != arg2 {
        return None;
    }

    match quad.op {
        // A AND A = A, A OR A = A
        Op::And | Op::Or => Some(assign(quad.arg1.clone(), quad)),

        // A XOR A = 0
        Op::Xor => Some(assign(Identifier::from("0"), quad)),

        _ => None,
    }
}

/// Retiene una cuádrupla si su resultado es una salida del circuito o
/// si alguna instrucción lo consume como operando. El orden relativo de
/// las instrucciones retenidas no cambia.
fn eliminate_dead_code(quads: Vec<Quadruple>, symbols: &SymbolTable) -> Vec<Quadruple> {
    let mut used: HashSet<&Identifier> = HashSet::new();
    for quad in &quads {
        used.insert(&quad.arg1);
        if let Some(arg2) = &quad.arg2 {
            used.insert(arg2);
        }
    }

    quads
        .iter()
        .filter(|quad| {
            let is_output = symbols
                .get(&quad.result)
                .map_or(false, |info| info.category == Category::Output);

            is_output || used.contains(&quad.result)
        })
        .cloned()
        .collect()
}

/// Cuádrupla sintética de copia con el mismo destino.
fn assign(source: Identifier, original: &Quadruple) -> Quadruple {
    Quadruple {
        op: Op::Assign,
        arg1: source,
        arg2: None,
        result: original.result.clone(),
    }
}

fn is(name: &Identifier, literal: &str) -> bool {
    name.as_ref() == literal
}
