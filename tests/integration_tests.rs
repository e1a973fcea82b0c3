//! Pruebas de la pipeline completa, de texto fuente a cuádruplas
//! optimizadas y código emitido.

use std::collections::HashMap;

use gatec::{
    compile,
    error::{Diagnostic, Diagnostics},
    ir::{Op, Quadruple},
    lex::Identifier,
    optimize::optimize,
    semantic::SemanticError,
    Compilation,
};

/// Evalúa una lista de cuádruplas en orden sobre una asignación de
/// valores a las entradas. Los nombres `0`/`1` evalúan como constantes.
fn eval(quads: &[Quadruple], inputs: &[(&str, bool)]) -> HashMap<String, bool> {
    let mut env: HashMap<String, bool> = inputs
        .iter()
        .map(|&(name, value)| (name.to_string(), value))
        .collect();

    env.insert("0".to_string(), false);
    env.insert("1".to_string(), true);

    for quad in quads {
        let arg1 = env[quad.arg1.as_ref()];
        let arg2 = quad.arg2.as_ref().map(|name| env[name.as_ref()]);

        let value = match quad.op {
            Op::Assign => arg1,
            Op::Not => !arg1,
            Op::And => arg1 && arg2.unwrap(),
            Op::Or => arg1 || arg2.unwrap(),
            Op::Xor => arg1 ^ arg2.unwrap(),
            Op::Nand => !(arg1 && arg2.unwrap()),
            Op::Nor => !(arg1 || arg2.unwrap()),
        };

        env.insert(quad.result.as_ref().to_string(), value);
    }

    env
}

/// Todas las asignaciones posibles de valores a `inputs`.
fn assignments<'a>(inputs: &'a [&'a str]) -> Vec<Vec<(&'a str, bool)>> {
    (0..1u32 << inputs.len())
        .map(|row| {
            inputs
                .iter()
                .rev()
                .enumerate()
                .map(|(bit, &name)| (name, (row >> bit) & 1 == 1))
                .collect()
        })
        .collect()
}

fn semantic_errors(diagnostics: &Diagnostics) -> Vec<SemanticError> {
    diagnostics
        .iter()
        .filter_map(|diagnostic| match diagnostic {
            Diagnostic::Semantic(error) => Some(error.clone()),
            _ => None,
        })
        .collect()
}

const HALF_ADDER: &str = "CIRCUIT H {
    INPUT A, B;
    OUTPUT S, C;
    S = XOR(A, B);
    C = AND(A, B);
}";

const FULL_ADDER: &str = "CIRCUIT FullAdder {
    INPUT A, B, Cin;
    OUTPUT S, Cout;
    WIRE s1, c1, c2;
    s1 = XOR(A, B);
    c1 = AND(A, B);
    S = XOR(s1, Cin);
    c2 = AND(s1, Cin);
    Cout = OR(c1, c2);
}";

const CONSTANT_CHAIN: &str = "CIRCUIT T {
    INPUT A;
    OUTPUT Z;
    WIRE t1, t2;
    t1 = AND(A, 0);
    t2 = OR(t1, 0);
    Z = t2;
}";

#[test]
fn half_adder_compiles_to_two_untouched_quadruples() {
    let compilation = compile(HALF_ADDER).unwrap();

    assert_eq!(compilation.name.as_ref(), "H");
    assert_eq!(compilation.ir.len(), 2);
    assert_eq!(compilation.optimized.len(), 2);
    assert_eq!(compilation.ir, compilation.optimized);

    let values = eval(&compilation.optimized, &[("A", true), ("B", true)]);
    assert_eq!(values["S"], false);
    assert_eq!(values["C"], true);
}

#[test]
fn constant_chain_folds_to_assignments() {
    let compilation = compile(CONSTANT_CHAIN).unwrap();

    let expected = vec![
        Quadruple {
            op: Op::Assign,
            arg1: Identifier::from("0"),
            arg2: None,
            result: Identifier::from("t1"),
        },
        Quadruple {
            op: Op::Assign,
            arg1: Identifier::from("t1"),
            arg2: None,
            result: Identifier::from("t2"),
        },
        Quadruple {
            op: Op::Assign,
            arg1: Identifier::from("t2"),
            arg2: None,
            result: Identifier::from("Z"),
        },
    ];

    assert_eq!(compilation.optimized, expected);

    // Funcionalmente, Z queda en 0 sin importar la entrada
    for assignment in assignments(&["A"]) {
        let values = eval(&compilation.optimized, &assignment);
        assert_eq!(values["Z"], false);
    }
}

#[test]
fn not_with_two_inputs_is_an_arity_error() {
    let diagnostics = compile(
        "CIRCUIT C {
            INPUT A, B;
            OUTPUT Z;
            Z = NOT(A, B);
        }",
    )
    .unwrap_err();

    let errors = semantic_errors(&diagnostics);
    match &errors[..] {
        [SemanticError::Arity {
            required, actual, ..
        }] => assert_eq!((*required, *actual), (1, 2)),

        other => panic!("expected an arity error, got {:?}", other),
    }

    let message = diagnostics.to_string();
    assert!(message.contains("requires 1"));
    assert!(message.contains("got 2"));
}

#[test]
fn unassigned_output_blocks_compilation() {
    let diagnostics = compile(
        "CIRCUIT C {
            INPUT A;
            OUTPUT Z;
        }",
    )
    .unwrap_err();

    let errors = semantic_errors(&diagnostics);
    assert!(matches!(&errors[..], [SemanticError::UnassignedOutput(_)]));
}

#[test]
fn combinational_cycles_are_rejected_with_a_path() {
    let diagnostics = compile(
        "CIRCUIT C {
            INPUT A;
            OUTPUT Z;
            WIRE X, Y;
            X = AND(Y, A);
            Y = AND(X, A);
            Z = OR(X, Y);
        }",
    )
    .unwrap_err();

    let errors = semantic_errors(&diagnostics);
    match &errors[..] {
        [SemanticError::Cycle(path)] => {
            assert!(path.len() >= 2);
            assert_eq!(path.first(), path.last());
        }

        other => panic!("expected a cycle error, got {:?}", other),
    }
}

#[test]
fn lexical_errors_carry_line_and_column() {
    let diagnostics = compile("CIRCUIT C { INPUT A$ }").unwrap_err();

    let message = diagnostics.to_string();
    assert!(message.contains("lexical error"));
    assert!(message.contains("'$'"));
    assert!(message.contains("line 1, column 20"));
    assert!(message.contains("Build failed with 1 error"));
}

#[test]
fn syntax_errors_point_at_the_offending_token() {
    let diagnostics = compile("CIRCUIT C {\n  INPUT A\n}").unwrap_err();

    let message = diagnostics.to_string();
    assert!(message.contains("syntax error"));
    assert!(message.contains("line 3, column 1"));
}

#[test]
fn nested_gates_suggest_an_intermediate_wire() {
    let diagnostics = compile(
        "CIRCUIT C {
            INPUT A, B;
            OUTPUT S;
            S = AND(NOT(A), B);
        }",
    )
    .unwrap_err();

    let message = diagnostics.to_string();
    assert!(message.contains("Nested gate expressions are not supported"));
    assert!(message.contains("WIRE"));
}

#[test]
fn optimization_preserves_circuit_semantics() {
    for source in &[HALF_ADDER, FULL_ADDER, CONSTANT_CHAIN] {
        let Compilation {
            symbols,
            ir,
            optimized,
            ..
        } = compile(source).unwrap();

        let inputs: Vec<&str> = symbols
            .iter()
            .filter(|(_, info)| info.category == gatec::parse::Category::Input)
            .map(|(name, _)| name.as_ref())
            .collect();

        let outputs: Vec<&str> = symbols
            .iter()
            .filter(|(_, info)| info.category == gatec::parse::Category::Output)
            .map(|(name, _)| name.as_ref())
            .collect();

        for assignment in assignments(&inputs) {
            let before = eval(&ir, &assignment);
            let after = eval(&optimized, &assignment);

            for output in &outputs {
                assert_eq!(
                    before[*output], after[*output],
                    "output {} diverged for {:?} in {}",
                    output, assignment, source
                );
            }
        }
    }
}

#[test]
fn optimization_never_prunes_outputs_and_never_invents_results() {
    for source in &[HALF_ADDER, FULL_ADDER, CONSTANT_CHAIN] {
        let compilation = compile(source).unwrap();

        let results = |quads: &[Quadruple]| -> Vec<Identifier> {
            quads.iter().map(|quad| quad.result.clone()).collect()
        };

        let before = results(&compilation.ir);
        let after = results(&compilation.optimized);

        // El conjunto de resultados solo puede encogerse
        for result in &after {
            assert!(before.contains(result));
        }

        // Las instrucciones que producen salidas sobreviven siempre
        for (name, info) in compilation.symbols.iter() {
            if info.category == gatec::parse::Category::Output {
                assert!(before.contains(name));
                assert!(after.contains(name));
            }
        }
    }
}

#[test]
fn optimization_is_idempotent_over_the_pipeline() {
    for source in &[HALF_ADDER, FULL_ADDER, CONSTANT_CHAIN] {
        let compilation = compile(source).unwrap();

        let again = optimize(&compilation.optimized, &compilation.symbols);
        assert_eq!(again, compilation.optimized);
    }
}

#[test]
fn rewriting_can_strand_earlier_temporaries() {
    // `t` alimenta únicamente a una compuerta que el plegado convierte
    // en copia de constante; la poda debe eliminarla después de
    // reescribir, no antes.
    let compilation = compile(
        "CIRCUIT C {
            INPUT A;
            OUTPUT Z;
            WIRE t, w;
            t = NOT(A);
            w = AND(t, 0);
            Z = w;
        }",
    )
    .unwrap();

    assert_eq!(compilation.ir.len(), 3);
    assert_eq!(compilation.optimized.len(), 2);
    assert!(!compilation
        .optimized
        .iter()
        .any(|quad| quad.result.as_ref() == "t"));
}

#[test]
fn declared_literal_names_still_fold() {
    // Una señal declarada con el nombre literal `0` participa del
    // plegado igual que la constante implícita
    let compilation = compile(
        "CIRCUIT C {
            INPUT A, 0;
            OUTPUT Z;
            Z = AND(A, 0);
        }",
    )
    .unwrap();

    assert_eq!(
        compilation.optimized,
        vec![Quadruple {
            op: Op::Assign,
            arg1: Identifier::from("0"),
            arg2: None,
            result: Identifier::from("Z"),
        }]
    );
}
