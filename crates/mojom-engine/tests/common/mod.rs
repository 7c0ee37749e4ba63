//! Shared fixtures: a source tree in a temp dir and a recording backend.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use mojom_engine::compiler::Module;
use mojom_engine::generator::TypeMap;
use mojom_engine::{Backend, BackendRegistry, GenerateError, Generator, GeneratorContext};
use tempfile::TempDir;

/// Write `content` to `root/name`, creating directories.
pub fn write(root: &Path, name: &str, content: &str) -> PathBuf {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

pub fn temp_tree(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for (name, content) in files {
        write(temp_dir.path(), name, content);
    }
    temp_dir
}

/// One `generate_files` call seen by a recording backend.
#[derive(Clone)]
pub struct Call {
    pub backend: String,
    pub module: Arc<Module>,
    pub typemap: TypeMap,
    pub variant: Option<String>,
    pub args: Vec<String>,
}

#[derive(Default)]
pub struct Recorder {
    calls: Mutex<Vec<Call>>,
}

impl Recorder {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, backend: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.backend == backend)
            .collect()
    }
}

pub struct RecordingBackend {
    pub name: &'static str,
    pub prefix: Option<&'static str>,
    pub recorder: Arc<Recorder>,
}

impl Backend for RecordingBackend {
    fn name(&self) -> &str {
        self.name
    }

    fn flag_prefix(&self) -> Option<&str> {
        self.prefix
    }

    fn create(&self, context: GeneratorContext) -> Box<dyn Generator> {
        Box::new(RecordingGenerator {
            backend: self.name.to_string(),
            context,
            recorder: Arc::clone(&self.recorder),
        })
    }
}

struct RecordingGenerator {
    backend: String,
    context: GeneratorContext,
    recorder: Arc<Recorder>,
}

impl Generator for RecordingGenerator {
    fn generate_files(&mut self, args: &[String]) -> Result<Vec<PathBuf>, GenerateError> {
        self.recorder.calls.lock().unwrap().push(Call {
            backend: self.backend.clone(),
            module: Arc::clone(&self.context.module),
            typemap: self.context.typemap.clone(),
            variant: self.context.variant.clone(),
            args: args.to_vec(),
        });
        Ok(Vec::new())
    }
}

/// Registry with recording backends `x` (flag prefix `x`) and `y` (none).
pub fn recording_registry() -> (BackendRegistry, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let mut registry = BackendRegistry::new();
    registry.register(Arc::new(RecordingBackend {
        name: "x",
        prefix: Some("x"),
        recorder: Arc::clone(&recorder),
    }));
    registry.register(Arc::new(RecordingBackend {
        name: "y",
        prefix: None,
        recorder: Arc::clone(&recorder),
    }));
    (registry, recorder)
}
