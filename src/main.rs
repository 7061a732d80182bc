use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use zpc::Compiler;

/// Compile a zpc program to stack machine instructions
#[derive(Parser, Debug)]
#[command(name = "zpc", version, about)]
struct Cli {
    /// Source file to compile
    input: PathBuf,

    /// Where to write the generated instructions
    output: PathBuf,

    /// Print the parsed program before generating code
    #[arg(long)]
    print_ast: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    let compiler = Compiler::new();
    if cli.print_ast {
        let program = compiler.parse(&source)?;
        println!("{program}");
    }

    let code = compiler.compile(&source)?;
    fs::write(&cli.output, code)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    info!(output = %cli.output.display(), "compiled");
    Ok(())
}
