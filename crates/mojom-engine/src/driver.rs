//! Top-level operations: `generate` and `precompile`.

use std::path::{Path, PathBuf};

use crate::compiler::module::{CacheStats, ModuleProcessor, SourceLocation};
use crate::error::{BindgenError, Result};
use crate::generator::template::precompile_templates;
use crate::generator::{BackendRegistry, Dispatcher, GenerationConfig, TypeMapRegistry};

/// Default backend list when none is given.
pub const DEFAULT_GENERATORS: &str = "c++,javascript,java";

/// Settings for one `generate` run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Files to generate bindings for
    pub filenames: Vec<PathBuf>,
    /// Source root the requested files are relative to
    pub depth: PathBuf,
    pub output_dir: PathBuf,
    /// Comma-separated backend names
    pub generators: String,
    /// Import directory specs: `path` or `path:root`
    pub import_directories: Vec<String>,
    pub typemaps: Vec<PathBuf>,
    /// Output variant; `"none"` means no variant
    pub variant: Option<String>,
    /// Directory holding precompiled templates
    pub bytecode_path: PathBuf,
    pub for_blink: bool,
    pub use_new_wrapper_types: bool,
    pub debug_print_intermediate: bool,
    /// `--<prefix>_...` flags forwarded to the backends
    pub backend_flags: Vec<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            filenames: Vec::new(),
            depth: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            generators: DEFAULT_GENERATORS.to_string(),
            import_directories: Vec::new(),
            typemaps: Vec::new(),
            variant: None,
            bytecode_path: PathBuf::new(),
            for_blink: false,
            use_new_wrapper_types: false,
            debug_print_intermediate: false,
            backend_flags: Vec::new(),
        }
    }
}

/// What a `generate` run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    pub files_parsed: usize,
    pub modules_built: usize,
    /// Module cache lookups over the whole run
    pub cache: CacheStats,
    pub outputs: Vec<PathBuf>,
}

/// Generate bindings for every requested file with the requested backends.
///
/// Backend names are checked before any file is read. The first error
/// aborts the run; outputs already written are left in place.
pub fn generate(options: &GenerateOptions, registry: &BackendRegistry) -> Result<GenerateSummary> {
    let backends = registry.load(&options.generators)?;

    let import_directories: Vec<SourceLocation> = options
        .import_directories
        .iter()
        .map(|spec| SourceLocation::parse_import_directory(spec, &options.depth))
        .collect();
    let variant = options
        .variant
        .clone()
        .filter(|variant| variant != "none");

    std::fs::create_dir_all(&options.output_dir).map_err(|source| BindgenError::Io {
        path: options.output_dir.clone(),
        source,
    })?;

    let mut typemaps = TypeMapRegistry::new();
    typemaps.load(&options.typemaps)?;

    let dispatcher = Dispatcher::new(
        backends,
        GenerationConfig {
            output_dir: options.output_dir.clone(),
            variant,
            bytecode_path: options.bytecode_path.clone(),
            for_blink: options.for_blink,
            use_new_wrapper_types: options.use_new_wrapper_types,
        },
        typemaps,
        options.backend_flags.clone(),
    );

    let mut processor = ModuleProcessor::new(
        &options.depth,
        import_directories,
        &options.filenames,
        dispatcher,
        options.debug_print_intermediate,
    );
    for filename in &options.filenames {
        processor.process_file(filename)?;
    }

    let summary = GenerateSummary {
        files_parsed: processor.files_parsed(),
        modules_built: processor.modules_built(),
        cache: processor.cache_stats(),
        outputs: processor.into_written(),
    };
    tracing::info!(
        "parsed {} files, built {} modules, wrote {} outputs",
        summary.files_parsed,
        summary.modules_built,
        summary.outputs.len()
    );
    tracing::debug!(
        "module cache: {} hits, {} misses ({:.0}% hit ratio)",
        summary.cache.hits,
        summary.cache.misses,
        summary.cache.hit_ratio() * 100.0
    );
    Ok(summary)
}

/// Compile every backend's templates into `output_dir/<template prefix>/`.
pub fn precompile(output_dir: &Path, registry: &BackendRegistry) -> Result<Vec<PathBuf>> {
    let written = precompile_templates(registry.all(), output_dir).map_err(|source| {
        BindgenError::Generate {
            backend: "precompile".to_string(),
            source,
        }
    })?;
    tracing::info!("precompiled {} templates into {}", written.len(), output_dir.display());
    Ok(written)
}
