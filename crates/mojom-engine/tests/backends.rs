//! Integration tests for the built-in backends
//!
//! Runs `generate` and `precompile` end to end with the c++, javascript
//! and java backends.

mod common;

use std::fs;

use common::temp_tree;
use mojom_engine::generator::template::CompiledTemplate;
use mojom_engine::{generate, precompile, BackendRegistry, BindgenError, GenerateOptions};

const NET: &str = r#"
    [JavaPackage="org.chromium.net"]
    module net.mojom;
    import "url/url.mojom";

    enum Priority { LOW, MEDIUM, HIGHEST = 10 };

    struct Request {
      url.mojom.Url url;
      Priority priority;
      array<string>? headers;
    };

    interface Loader {
      Start(Request request) => (int32 status);
    };
"#;

const URL: &str = r#"
    [JavaPackage="org.chromium.url"]
    module url.mojom;
    struct Url { string spec; };
"#;

fn options(root: &std::path::Path) -> GenerateOptions {
    GenerateOptions {
        filenames: vec![root.join("net/loader.mojom")],
        depth: root.to_path_buf(),
        output_dir: root.join("gen"),
        import_directories: vec![root.display().to_string()],
        bytecode_path: root.join("templates"),
        ..GenerateOptions::default()
    }
}

#[test]
fn test_all_builtin_backends() {
    let temp_dir = temp_tree(&[("net/loader.mojom", NET), ("url/url.mojom", URL)]);
    let root = temp_dir.path();

    let summary = generate(&options(root), &BackendRegistry::builtin()).unwrap();
    let gen = root.join("gen");
    assert_eq!(
        summary.outputs,
        vec![
            gen.join("net/loader.mojom.h"),
            gen.join("net/loader.mojom.js"),
            gen.join("net/loader.mojom.srcjar"),
        ]
    );
    // Imports are built but not emitted
    assert!(!gen.join("url/url.mojom.h").exists());

    let header = fs::read_to_string(gen.join("net/loader.mojom.h")).unwrap();
    assert!(header.contains("#include \"url/url.mojom.h\""));
    assert!(header.contains("  url::mojom::UrlPtr url;"));
    assert!(header.contains("  HIGHEST = 10,"));
    assert!(header.contains("  mojo::Array<mojo::String> headers;"));

    let js = fs::read_to_string(gen.join("net/loader.mojom.js")).unwrap();
    assert!(js.contains("\"url/url.mojom\","));
    assert!(js.contains("name: 'net.mojom.Loader',"));
}

#[test]
fn test_typemap_and_new_wrapper_types() {
    let temp_dir = temp_tree(&[
        ("net/loader.mojom", NET),
        ("url/url.mojom", URL),
        (
            "url.typemap",
            "// url types\n{\"c++\": {\"url.mojom.Url\": \"GURL\"}}\n",
        ),
    ]);
    let root = temp_dir.path();
    let mut opts = options(root);
    opts.generators = "c++".to_string();
    opts.typemaps = vec![root.join("url.typemap")];
    opts.use_new_wrapper_types = true;
    generate(&opts, &BackendRegistry::builtin()).unwrap();

    let header = fs::read_to_string(root.join("gen/net/loader.mojom.h")).unwrap();
    assert!(header.contains("  GURL url;"));
    assert!(header.contains("  base::Optional<std::vector<std::string>> headers;"));
    assert!(header.contains("#include <vector>"));
}

#[test]
fn test_blink_variant() {
    let temp_dir = temp_tree(&[("net/loader.mojom", NET), ("url/url.mojom", URL)]);
    let root = temp_dir.path();
    let mut opts = options(root);
    opts.generators = "c++".to_string();
    opts.variant = Some("blink".to_string());
    opts.for_blink = true;
    opts.use_new_wrapper_types = true;
    let summary = generate(&opts, &BackendRegistry::builtin()).unwrap();

    assert_eq!(summary.outputs, vec![root.join("gen/net/loader.mojom-blink.h")]);
    let header = fs::read_to_string(&summary.outputs[0]).unwrap();
    assert!(header.contains("#include \"url/url.mojom-blink.h\""));
    assert!(header.contains("base::Optional<WTF::Vector<WTF::String>> headers;"));
    assert!(header.contains("  url::mojom::blink::UrlPtr url;"));
}

#[test]
fn test_java_rejects_variant() {
    let temp_dir = temp_tree(&[("net/loader.mojom", NET), ("url/url.mojom", URL)]);
    let root = temp_dir.path();
    let mut opts = options(root);
    opts.generators = "java".to_string();
    opts.variant = Some("blink".to_string());

    let err = generate(&opts, &BackendRegistry::builtin()).unwrap_err();
    match err {
        BindgenError::Generate { backend, .. } => assert_eq!(backend, "java"),
        other => panic!("expected generate error, got {:?}", other),
    }
}

#[test]
fn test_java_output_directory_flag() {
    let temp_dir = temp_tree(&[("net/loader.mojom", NET), ("url/url.mojom", URL)]);
    let root = temp_dir.path();
    let mut opts = options(root);
    opts.generators = "java".to_string();
    opts.backend_flags = vec![
        format!("--java_output_directory={}", root.join("java").display()),
        "--cpp_ignored=1".to_string(),
    ];
    generate(&opts, &BackendRegistry::builtin()).unwrap();

    let request =
        fs::read_to_string(root.join("java/org/chromium/net/Request.java")).unwrap();
    assert!(request.contains("package org.chromium.net;"));
    assert!(request.contains("    public org.chromium.url.Url url;"));
    assert!(request.contains("    public int priority;"));
    assert!(request.contains("    public String[] headers;"));
}

#[test]
fn test_precompile_writes_artifacts_used_by_generate() {
    let temp_dir = temp_tree(&[("net/loader.mojom", NET), ("url/url.mojom", URL)]);
    let root = temp_dir.path();
    let registry = BackendRegistry::builtin();

    let written = precompile(&root.join("templates"), &registry).unwrap();
    assert_eq!(written.len(), 1 + 1 + 6);
    let artifact = root.join("templates/cpp_templates/module.h.tmpl.json");
    assert!(written.contains(&artifact));
    let compiled: CompiledTemplate =
        serde_json::from_str(&fs::read_to_string(&artifact).unwrap()).unwrap();
    assert_eq!(compiled.name, "module.h.tmpl");

    // Deterministic across runs
    let again = precompile(&root.join("templates_again"), &registry).unwrap();
    assert_eq!(
        fs::read(&artifact).unwrap(),
        fs::read(&again[0]).unwrap()
    );

    let with_artifacts = generate(&options(root), &registry).unwrap();
    let header = fs::read_to_string(&with_artifacts.outputs[0]).unwrap();

    let mut opts = options(root);
    opts.bytecode_path = root.join("nothing_here");
    opts.output_dir = root.join("gen_plain");
    let plain = generate(&opts, &registry).unwrap();
    assert_eq!(header, fs::read_to_string(&plain.outputs[0]).unwrap());
}
