//! `mojom-bindgen generate`: emit bindings for mojom files.

use std::path::PathBuf;

use clap::Args;
use mojom_engine::{BackendRegistry, GenerateOptions, DEFAULT_GENERATORS};

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Mojom files to generate bindings for
    #[arg(required = true)]
    pub filenames: Vec<PathBuf>,

    /// Source root the input files are relative to
    #[arg(short = 'd', long = "depth", default_value = ".")]
    pub depth: PathBuf,

    /// Output directory for generated files
    #[arg(short = 'o', long = "output_dir", default_value = ".")]
    pub output_dir: PathBuf,

    /// Comma-separated list of generators
    #[arg(short = 'g', long = "generators", default_value = DEFAULT_GENERATORS)]
    pub generators: String,

    /// Additional import directory, optionally with its own source root
    #[arg(short = 'I', value_name = "DIR[:ROOT]")]
    pub import_directories: Vec<String>,

    /// Type map file; may be repeated
    #[arg(long = "typemap")]
    pub typemaps: Vec<PathBuf>,

    /// Output variant ("none" for the default bindings)
    #[arg(long = "variant")]
    pub variant: Option<String>,

    /// Directory holding precompiled templates
    #[arg(long = "bytecode_path", required = true)]
    pub bytecode_path: PathBuf,

    /// Generate bindings for use inside Blink
    #[arg(long = "for_blink")]
    pub for_blink: bool,

    /// Map strings, arrays and maps to standard library types
    #[arg(long = "use_new_wrapper_types")]
    pub use_new_wrapper_types: bool,

    /// Print the intermediate form of each translated file
    #[arg(long = "debug_print_intermediate")]
    pub debug_print_intermediate: bool,
}

impl GenerateArgs {
    pub fn into_options(self, backend_flags: Vec<String>) -> GenerateOptions {
        GenerateOptions {
            filenames: self.filenames,
            depth: self.depth,
            output_dir: self.output_dir,
            generators: self.generators,
            import_directories: self.import_directories,
            typemaps: self.typemaps,
            variant: self.variant,
            bytecode_path: self.bytecode_path,
            for_blink: self.for_blink,
            use_new_wrapper_types: self.use_new_wrapper_types,
            debug_print_intermediate: self.debug_print_intermediate,
            backend_flags,
        }
    }
}

pub fn execute(args: GenerateArgs, backend_flags: Vec<String>) -> anyhow::Result<()> {
    let options = args.into_options(backend_flags);
    let summary = mojom_engine::generate(&options, &BackendRegistry::builtin())?;
    for output in &summary.outputs {
        tracing::debug!("output {}", output.display());
    }
    tracing::info!(
        "{} files parsed, {} modules built, {} files written",
        summary.files_parsed,
        summary.modules_built,
        summary.outputs.len()
    );
    Ok(())
}
