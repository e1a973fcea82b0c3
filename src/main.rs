//! Punto de entrada ("driver").
//!
//! Este módulo orquesta las diferentes fases del proceso de
//! compilación y expone una CLI. Las fases se invocan por separado, en
//! vez de usar [`gatec::compile`], para poder volcar los productos
//! intermedios que se soliciten.

use anyhow::Context;
use bitflags::bitflags;
use clap::{crate_version, Arg, Command};

use gatec::{emit, error::Diagnostics, ir, lex, optimize, parse, semantic};

use std::{fs, fs::File, io, process};

bitflags! {
    /// Volcados intermedios solicitados en la línea de comandos.
    struct DumpOptions: u32 {
        const TOKENS = 0x01;
        const AST = 0x02;
        const SYMBOLS = 0x04;
        const QUADS = 0x08;
    }
}

fn main() -> anyhow::Result<()> {
    // Parsing de CLI
    let args = Command::new("gatec")
        .version(crate_version!())
        .about("Combinational circuit compiler")
        .arg(
            Arg::new("input")
                .value_name("FILE")
                .required(true)
                .help("Input circuit source file"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .takes_value(true)
                .help("Write the generated program to FILE instead of stdout"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Report the progress of each phase"),
        )
        .arg(
            Arg::new("tokens")
                .short('t')
                .long("tokens")
                .help("Print the token stream"),
        )
        .arg(
            Arg::new("ast")
                .short('a')
                .long("ast")
                .help("Print the syntax tree"),
        )
        .arg(
            Arg::new("symbols")
                .short('s')
                .long("symbols")
                .help("Print the symbol table"),
        )
        .arg(
            Arg::new("quads")
                .short('q')
                .long("quads")
                .help("Print quadruples before and after optimization"),
        )
        .arg(
            Arg::new("no-optimize")
                .long("no-optimize")
                .help("Skip the optimization phase"),
        )
        .get_matches();

    let input = args.value_of("input").unwrap();
    let verbose = args.is_present("verbose");

    let mut dumps = DumpOptions::empty();
    if args.is_present("tokens") {
        dumps |= DumpOptions::TOKENS;
    }
    if args.is_present("ast") {
        dumps |= DumpOptions::AST;
    }
    if args.is_present("symbols") {
        dumps |= DumpOptions::SYMBOLS;
    }
    if args.is_present("quads") {
        dumps |= DumpOptions::QUADS;
    }

    let source = fs::read_to_string(input)
        .with_context(|| format!("Failed to read source file: {}", input))?;

    let tokens = match lex::tokenize(&source) {
        Ok(tokens) => tokens,
        Err(error) => abort(Diagnostics::from(error)),
    };

    if verbose {
        println!("Phase 1: lexical analysis complete ({} tokens)", tokens.len());
    }

    if dumps.contains(DumpOptions::TOKENS) {
        for token in &tokens {
            println!("{} at {}", token.as_ref(), token.position());
        }
    }

    let ast = match parse::parse(tokens) {
        Ok(ast) => ast,
        Err(error) => abort(Diagnostics::from(error)),
    };

    if verbose {
        println!(
            "Phase 2: syntax analysis complete (circuit `{}`, {} declarations, {} gates)",
            ast.name,
            ast.declarations.len(),
            ast.gates.len()
        );
    }

    if dumps.contains(DumpOptions::AST) {
        println!("{:#?}", ast);
    }

    let symbols = match semantic::analyze(&ast) {
        Ok(symbols) => symbols,
        Err(errors) => abort(Diagnostics::from(errors)),
    };

    if verbose {
        println!("Phase 3: semantic analysis complete ({} symbols)", symbols.len());
    }

    if dumps.contains(DumpOptions::SYMBOLS) {
        for (name, info) in symbols.iter() {
            let used_by: Vec<&str> = info.used_by.iter().map(AsRef::as_ref).collect();
            println!(
                "{}: category={}, defined={}, used_by=[{}]",
                name,
                info.category,
                info.defined,
                used_by.join(", ")
            );
        }
    }

    let quads = ir::generate(&ast);

    if verbose {
        println!(
            "Phase 4: intermediate code generated ({} quadruples)",
            quads.len()
        );
    }

    if dumps.contains(DumpOptions::QUADS) {
        println!("Quadruples (before optimization):");
        for (index, quad) in quads.iter().enumerate() {
            println!("{}: {}", index + 1, quad);
        }
    }

    let quads = if args.is_present("no-optimize") {
        quads
    } else {
        let optimized = optimize::optimize(&quads, &symbols);

        if verbose {
            println!(
                "Phase 5: optimization complete ({} instructions removed)",
                quads.len() - optimized.len()
            );
        }

        if dumps.contains(DumpOptions::QUADS) {
            println!("Quadruples (after optimization):");
            for (index, quad) in optimized.iter().enumerate() {
                println!("{}: {}", index + 1, quad);
            }
        }

        optimized
    };

    match args.value_of("output") {
        None => {
            let stdout = io::stdout();
            emit::emit(&mut stdout.lock(), &ast.name, &quads, &symbols)
                .context("Failed to emit program to stdout")?;
        }

        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to open for writing: {}", path))?;

            emit::emit(&mut file, &ast.name, &quads, &symbols)
                .with_context(|| format!("Failed to emit to file: {}", path))?;

            if verbose {
                println!("Code saved to: {}", path);
            }
        }
    }

    Ok(())
}

/// Reporta los diagnósticos y termina con estado de fallo.
///
/// Los diagnósticos no viajan por `anyhow`: se imprimen directamente
/// con su formato propio.
fn abort(diagnostics: Diagnostics) -> ! {
    eprint!("{}", diagnostics);
    process::exit(1)
}
