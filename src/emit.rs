//! Emisión de código.
//!
//! Traducción dirigida por plantilla de las cuádruplas a un script de
//! Python ejecutable: una función `simulate` que computa cada
//! instrucción retenida en orden y una tabla de verdad exhaustiva sobre
//! las entradas del circuito. Las salidas del circuito, en orden de
//! declaración, son el valor de retorno de `simulate`.

use std::io::{self, Write};

use crate::{
    ir::{Op, Quadruple},
    lex::Identifier,
    parse::Category,
    semantic::SymbolTable,
};

/// Emite el artefacto ejecutable para un circuito compilado.
pub fn emit<W: Write>(
    output: &mut W,
    name: &Identifier,
    quads: &[Quadruple],
    symbols: &SymbolTable,
) -> io::Result<()> {
    let inputs: Vec<&str> = names_of(symbols, Category::Input);
    let outputs: Vec<&str> = names_of(symbols, Category::Output);

    writeln!(output, "# Generated by the gatec compiler")?;
    writeln!(output, "# Circuit: {}", name)?;
    writeln!(output)?;

    writeln!(output, "def simulate({}):", inputs.join(", "))?;
    for quad in quads {
        let result = &quad.result;
        let arg1 = &quad.arg1;

        match (quad.op, &quad.arg2) {
            (Op::Assign, _) => writeln!(output, "    {} = {}", result, arg1)?,
            (Op::Not, _) => writeln!(output, "    {} = int(not {})", result, arg1)?,
            (Op::And, Some(arg2)) => writeln!(output, "    {} = {} & {}", result, arg1, arg2)?,
            (Op::Or, Some(arg2)) => writeln!(output, "    {} = {} | {}", result, arg1, arg2)?,
            (Op::Xor, Some(arg2)) => writeln!(output, "    {} = {} ^ {}", result, arg1, arg2)?,
            (Op::Nand, Some(arg2)) => {
                writeln!(output, "    {} = int(not ({} & {}))", result, arg1, arg2)?
            }
            (Op::Nor, Some(arg2)) => {
                writeln!(output, "    {} = int(not ({} | {}))", result, arg1, arg2)?
            }

            // El análisis semántico garantiza la aridad
            (op, None) => unreachable!("binary {} without second operand", op),
        }
    }
    writeln!(output, "    return {}", outputs.join(", "))?;
    writeln!(output)?;

    writeln!(output, "# Truth table")?;
    writeln!(
        output,
        "print(\"{} || {}\")",
        inputs.join(" | "),
        outputs.join(" | ")
    )?;
    writeln!(output, "print(\"-\" * 40)")?;

    for row in 0..(1u64 << inputs.len()) {
        let values: Vec<String> = (0..inputs.len())
            .rev()
            .map(|bit| ((row >> bit) & 1).to_string())
            .collect();

        writeln!(
            output,
            "print(\"{} ||\", simulate({}))",
            values.join(" | "),
            values.join(", ")
        )?;
    }

    Ok(())
}

/// Señales de una categoría, en orden de declaración.
fn names_of(symbols: &SymbolTable, category: Category) -> Vec<&str> {
    symbols
        .iter()
        .filter(|(_, info)| info.category == category)
        .map(|(name, _)| name.as_ref())
        .collect()
}
