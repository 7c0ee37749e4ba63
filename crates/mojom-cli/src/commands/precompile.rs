//! `mojom-bindgen precompile`: compile backend templates ahead of time.

use std::path::PathBuf;

use clap::Args;
use mojom_engine::BackendRegistry;

#[derive(Debug, Args)]
pub struct PrecompileArgs {
    /// Directory to write the compiled templates to
    #[arg(short = 'o', long = "output_dir", default_value = ".")]
    pub output_dir: PathBuf,
}

pub fn execute(args: PrecompileArgs) -> anyhow::Result<()> {
    let written = mojom_engine::precompile(&args.output_dir, &BackendRegistry::builtin())?;
    tracing::info!("wrote {} template artifacts", written.len());
    Ok(())
}
