//! mojom-bindgen
//!
//! Command-line frontend: `generate` emits bindings for mojom files,
//! `precompile` compiles the backend templates ahead of time.

mod commands;

use clap::{Parser, Subcommand};
use mojom_engine::BackendRegistry;

use commands::generate::GenerateArgs;
use commands::precompile::PrecompileArgs;

#[derive(Parser)]
#[command(name = "mojom-bindgen")]
#[command(about = "Generate language bindings from mojom IDL files", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate bindings for mojom files
    ///
    /// Backend flags of the form --<prefix>_name=value are passed through
    /// to the backend that declares <prefix>.
    Generate(GenerateArgs),

    /// Compile backend templates into an output directory
    Precompile(PrecompileArgs),
}

/// Split `--<prefix>_...` backend flags from the arguments clap handles.
fn split_backend_flags<I>(args: I, prefixes: &[String]) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = String>,
{
    let prefixes: Vec<String> = prefixes.iter().map(|p| format!("--{}_", p)).collect();
    args.into_iter()
        .partition(|arg| prefixes.iter().any(|prefix| arg.starts_with(prefix)))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let prefixes = BackendRegistry::builtin().flag_prefixes();
    let (backend_flags, args) = split_backend_flags(std::env::args(), &prefixes);
    let cli = Cli::parse_from(args);

    let result = match cli.command {
        Commands::Generate(args) => commands::generate::execute(args, backend_flags),
        Commands::Precompile(args) => commands::precompile::execute(args),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
