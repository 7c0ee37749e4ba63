//! Module construction from the intermediate form.
//!
//! Resolves type names against the module's own declarations and then
//! against its directly imported modules. Unresolvable names are kept
//! as-is; type checking is left to the generators.

use std::collections::HashMap;

use crate::compiler::ir::*;
use crate::compiler::mojom::*;
use crate::parser::ast::TypeRef;

/// Build a [`Module`] from translated data whose imports are already linked.
///
/// Import entries without a built module are left out of the result; the
/// module processor always links every import before calling this.
pub fn build_ordered_module(data: MojomData) -> Module {
    let imports: Vec<Import> = data
        .imports
        .iter()
        .filter_map(|import| {
            import.module.clone().map(|module| Import {
                filename: import.filename.clone(),
                module,
            })
        })
        .collect();

    let scope = Scope::new(&data, &imports);

    let structs = data
        .structs
        .iter()
        .map(|s| Struct {
            name: s.name.clone(),
            fields: s.fields.iter().map(|f| scope.field(f, Some(&s.name))).collect(),
            enums: s.enums.iter().map(build_enum).collect(),
            constants: s
                .constants
                .iter()
                .map(|c| scope.constant(c, Some(&s.name)))
                .collect(),
            attributes: s.attributes.clone(),
        })
        .collect();

    let unions = data
        .unions
        .iter()
        .map(|u| Union {
            name: u.name.clone(),
            fields: u.fields.iter().map(|f| scope.field(f, None)).collect(),
            attributes: u.attributes.clone(),
        })
        .collect();

    let interfaces = data
        .interfaces
        .iter()
        .map(|i| Interface {
            name: i.name.clone(),
            methods: scope.methods(&i.methods, &i.name),
            enums: i.enums.iter().map(build_enum).collect(),
            constants: i
                .constants
                .iter()
                .map(|c| scope.constant(c, Some(&i.name)))
                .collect(),
            attributes: i.attributes.clone(),
        })
        .collect();

    let enums = data.enums.iter().map(build_enum).collect();
    let constants = data.constants.iter().map(|c| scope.constant(c, None)).collect();

    Module {
        path: data.name.clone(),
        name: data.name,
        namespace: data.namespace,
        attributes: data.attributes,
        imports,
        structs,
        unions,
        enums,
        interfaces,
        constants,
    }
}

fn build_enum(data: &EnumData) -> Enum {
    let mut computed: HashMap<&str, i64> = HashMap::new();
    let mut previous: Option<Option<i64>> = None;
    let mut fields = Vec::with_capacity(data.values.len());

    for value in &data.values {
        let numeric_value = match &value.value {
            Some(EnumValue::Number(n)) => Some(*n),
            Some(EnumValue::Name(name)) => {
                let short = name.rsplit('.').next().unwrap_or(name);
                computed.get(short).copied()
            }
            None => match previous {
                None => Some(0),
                Some(prev) => prev.and_then(|n| n.checked_add(1)),
            },
        };
        if let Some(n) = numeric_value {
            computed.insert(&value.name, n);
        }
        previous = Some(numeric_value);

        fields.push(EnumField {
            name: value.name.clone(),
            value: value.value.as_ref().map(|v| match v {
                EnumValue::Number(n) => n.to_string(),
                EnumValue::Name(name) => name.clone(),
            }),
            numeric_value,
            attributes: value.attributes.clone(),
        });
    }

    Enum {
        name: data.name.clone(),
        fields,
        attributes: data.attributes.clone(),
    }
}

/// Name lookup context for one module.
struct Scope<'a> {
    namespace: &'a str,
    local: HashMap<String, DeclKind>,
    imports: &'a [Import],
}

impl<'a> Scope<'a> {
    fn new(data: &'a MojomData, imports: &'a [Import]) -> Self {
        let mut local = HashMap::new();
        for s in &data.structs {
            local.insert(s.name.clone(), DeclKind::Struct);
            for e in &s.enums {
                local.insert(format!("{}.{}", s.name, e.name), DeclKind::Enum);
            }
        }
        for u in &data.unions {
            local.insert(u.name.clone(), DeclKind::Union);
        }
        for e in &data.enums {
            local.insert(e.name.clone(), DeclKind::Enum);
        }
        for i in &data.interfaces {
            local.insert(i.name.clone(), DeclKind::Interface);
            for e in &i.enums {
                local.insert(format!("{}.{}", i.name, e.name), DeclKind::Enum);
            }
        }

        Self {
            namespace: &data.namespace,
            local,
            imports,
        }
    }

    fn resolve_name(&self, name: &str, enclosing: Option<&str>) -> NamedKind {
        if let Some(outer) = enclosing {
            let nested = format!("{}.{}", outer, name);
            if let Some(&category) = self.local.get(&nested) {
                return self.local_kind(nested, category);
            }
        }
        if let Some(&category) = self.local.get(name) {
            return self.local_kind(name.to_string(), category);
        }
        if !self.namespace.is_empty() {
            if let Some(rest) = name.strip_prefix(self.namespace).and_then(|r| r.strip_prefix('.')) {
                if let Some(&category) = self.local.get(rest) {
                    return self.local_kind(rest.to_string(), category);
                }
            }
        }

        for import in self.imports {
            let module = &import.module;
            let short = if module.namespace.is_empty() {
                name
            } else {
                name.strip_prefix(module.namespace.as_str())
                    .and_then(|r| r.strip_prefix('.'))
                    .unwrap_or(name)
            };
            if let Some(category) = module.declared_kind(short) {
                return NamedKind {
                    name: short.to_string(),
                    namespace: Some(module.namespace.clone()),
                    category: Some(category),
                };
            }
        }

        tracing::debug!("unresolved type name '{}' in namespace '{}'", name, self.namespace);
        NamedKind {
            name: name.to_string(),
            namespace: None,
            category: None,
        }
    }

    fn local_kind(&self, name: String, category: DeclKind) -> NamedKind {
        NamedKind {
            name,
            namespace: Some(self.namespace.to_string()),
            category: Some(category),
        }
    }

    fn kind(&self, ty: &TypeRef, enclosing: Option<&str>) -> Kind {
        match ty {
            TypeRef::Named(name) => Kind::builtin(name)
                .unwrap_or_else(|| Kind::Reference(self.resolve_name(name, enclosing))),
            TypeRef::Array {
                element,
                fixed_size,
            } => Kind::Array {
                element: Box::new(self.kind(element, enclosing)),
                length: *fixed_size,
            },
            TypeRef::Map { key, value } => Kind::Map {
                key: Box::new(self.kind(key, enclosing)),
                value: Box::new(self.kind(value, enclosing)),
            },
            TypeRef::Handle(kind) => Kind::Handle(kind.clone()),
            TypeRef::InterfaceRequest(name) => {
                Kind::InterfaceRequest(self.resolve_name(name, enclosing))
            }
            TypeRef::Associated(inner) => Kind::Associated(Box::new(self.kind(inner, enclosing))),
            TypeRef::Nullable(inner) => Kind::Nullable(Box::new(self.kind(inner, enclosing))),
        }
    }

    fn field(&self, data: &FieldData, enclosing: Option<&str>) -> Field {
        Field {
            name: data.name.clone(),
            kind: self.kind(&data.kind, enclosing),
            ordinal: data.ordinal,
            default: data.default.clone(),
            attributes: data.attributes.clone(),
        }
    }

    fn parameter(&self, data: &ParameterData, enclosing: &str) -> Parameter {
        Parameter {
            name: data.name.clone(),
            kind: self.kind(&data.kind, Some(enclosing)),
            ordinal: data.ordinal,
        }
    }

    fn methods(&self, methods: &[MethodData], interface: &str) -> Vec<Method> {
        let mut next_ordinal = 0u32;
        methods
            .iter()
            .map(|m| {
                let ordinal = m.ordinal.unwrap_or(next_ordinal);
                next_ordinal = ordinal + 1;
                Method {
                    name: m.name.clone(),
                    ordinal,
                    parameters: m
                        .parameters
                        .iter()
                        .map(|p| self.parameter(p, interface))
                        .collect(),
                    response_parameters: m.response_parameters.as_ref().map(|params| {
                        params.iter().map(|p| self.parameter(p, interface)).collect()
                    }),
                    attributes: m.attributes.clone(),
                }
            })
            .collect()
    }

    fn constant(&self, data: &ConstantData, enclosing: Option<&str>) -> Constant {
        Constant {
            name: data.name.clone(),
            kind: self.kind(&data.kind, enclosing),
            value: data.value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::translate::translate;
    use crate::parser::parse;
    use std::sync::Arc;

    fn build(source: &str, name: &str, imports: Vec<Arc<Module>>) -> Module {
        let tree = parse(source, name).unwrap();
        let mut data = translate(&tree, name);
        for (entry, module) in data.imports.iter_mut().zip(imports) {
            entry.module = Some(module);
        }
        build_ordered_module(data)
    }

    #[test]
    fn test_local_and_nested_resolution() {
        let module = build(
            r#"
            module demo;
            struct Node {
                enum State { IDLE, BUSY };
                State state;
                array<Node>? children;
            };
            "#,
            "node.mojom",
            Vec::new(),
        );

        let fields = &module.structs[0].fields;
        match &fields[0].kind {
            Kind::Reference(named) => {
                assert_eq!(named.name, "Node.State");
                assert_eq!(named.category, Some(DeclKind::Enum));
                assert_eq!(named.namespace.as_deref(), Some("demo"));
            }
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(fields[1].kind.to_string(), "array<demo.Node>?");
    }

    #[test]
    fn test_imported_resolution_shares_module() {
        let base = Arc::new(build(
            "module base; struct Color { uint8 r; }; interface Sink {};",
            "base.mojom",
            Vec::new(),
        ));
        let module = build(
            r#"
            module paint;
            import "base.mojom";
            struct Brush { base.Color color; Color shade; Sink& sink; Unknown other; };
            "#,
            "brush.mojom",
            vec![Arc::clone(&base)],
        );

        assert!(Arc::ptr_eq(&module.imports[0].module, &base));
        let fields = &module.structs[0].fields;
        assert_eq!(fields[0].kind.to_string(), "base.Color");
        assert_eq!(fields[1].kind.to_string(), "base.Color");
        assert!(matches!(
            &fields[2].kind,
            Kind::InterfaceRequest(NamedKind { category: Some(DeclKind::Interface), .. })
        ));
        match &fields[3].kind {
            Kind::Reference(named) => assert_eq!(named.category, None),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_enum_values() {
        let module = build(
            "enum E { A, B = 5, C, D = A, E2, F = Other.X, G };",
            "e.mojom",
            Vec::new(),
        );
        let values: Vec<_> = module.enums[0].fields.iter().map(|f| f.numeric_value).collect();
        assert_eq!(
            values,
            vec![Some(0), Some(5), Some(6), Some(0), Some(1), None, None]
        );
    }

    #[test]
    fn test_enum_value_after_max_is_unresolved() {
        let module = build(
            "enum E { A = 0x7fffffffffffffff, B, C = 1, D };",
            "e.mojom",
            Vec::new(),
        );
        let values: Vec<_> = module.enums[0].fields.iter().map(|f| f.numeric_value).collect();
        assert_eq!(values, vec![Some(i64::MAX), None, Some(1), Some(2)]);
    }

    #[test]
    fn test_method_ordinals() {
        let module = build(
            "interface I { A(); B@5(); C(); };",
            "i.mojom",
            Vec::new(),
        );
        let ordinals: Vec<_> = module.interfaces[0].methods.iter().map(|m| m.ordinal).collect();
        assert_eq!(ordinals, vec![0, 5, 6]);
    }

    #[test]
    fn test_path_defaults_to_name() {
        let module = build("", "empty.mojom", Vec::new());
        assert_eq!(module.path, "empty.mojom");
        assert_eq!(module.namespace, "");
    }
}
