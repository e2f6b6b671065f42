//! Top-down assignment of names, paths and scopes.
//!
//! A node learns its name from its parent: record fields and variant cases
//! take their label, the element of a container is named `<name>_default`.
//! Paths join ancestor names with `/`; the document root has the empty
//! path. Scopes follow the module layout described in [`crate::scope`].

use log::trace;
use pdl_core::path::join_path;

use crate::{
    generator::{Generator, GeneratorKind},
    scope::Scope,
};

/// Suffix of the name given to the element of an array or labeled array.
pub const ELEMENT_SUFFIX: &str = "_default";

/// Names the document root `name` and assigns every descendant its name,
/// path and scope.
pub fn assign_document(root: &mut Generator, name: &str) {
    root.assign_name(name);
    root.meta.path = String::new();
    root.meta.scope = Scope::root();
    let (path, scope) = (root.meta.path.clone(), root.meta.scope.clone());
    root.assign_children(&path, &scope);
}

impl Generator {
    /// Stores `name` and propagates derived names to container elements.
    pub fn assign_name(&mut self, name: &str) {
        self.meta.name = name.to_string();
        match &mut self.kind {
            GeneratorKind::Array { element, .. } | GeneratorKind::LabeledArray { element, .. } => {
                element.assign_name(&format!("{name}{ELEMENT_SUFFIX}"));
            }
            GeneratorKind::Record(record) => {
                for field in &mut record.fields {
                    field.generator.assign_name(field.label.inner());
                }
            }
            GeneratorKind::Variant { cases, .. } => {
                for case in cases {
                    case.generator.assign_name(case.label.inner());
                }
            }
            GeneratorKind::Primitive(_) | GeneratorKind::Included { .. } => {}
        }
    }

    /// Computes the path below `container` and propagates it to children.
    pub fn assign_path(&mut self, container: &str) {
        self.meta.path = join_path(container, &self.meta.name);
        let path = self.meta.path.clone();
        for child in self.children_mut() {
            child.assign_path(&path);
        }
    }

    /// Stores the scope this node's type is declared in and propagates the
    /// scope of its own module to its children.
    pub fn assign_scope(&mut self, scope: &Scope) {
        self.meta.scope = scope.clone();
        let inner = scope.child(&self.meta.name);
        for child in self.children_mut() {
            child.assign_scope(&inner);
        }
    }

    fn assign_children(&mut self, path: &str, scope: &Scope) {
        let inner = scope.child(&self.meta.name);
        for child in self.children_mut() {
            child.assign_path(path);
            child.assign_scope(&inner);
            trace!(path = child.meta.path.as_str(), scope:% = child.meta.scope; "Assigned");
        }
    }

    fn children_mut(&mut self) -> Vec<&mut Generator> {
        match &mut self.kind {
            GeneratorKind::Array { element, .. } | GeneratorKind::LabeledArray { element, .. } => {
                vec![element.as_mut()]
            }
            GeneratorKind::Record(record) => {
                record.fields.iter_mut().map(|f| &mut f.generator).collect()
            }
            GeneratorKind::Variant { cases, .. } => {
                cases.iter_mut().map(|c| &mut c.generator).collect()
            }
            GeneratorKind::Primitive(_) | GeneratorKind::Included { .. } => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        generator::{Field, Primitive, Record},
        span::{Span, Spanned},
    };

    fn leaf(primitive: Primitive) -> Generator {
        Generator::new(GeneratorKind::Primitive(primitive), Span::default())
    }

    fn field(label: &str, generator: Generator) -> Field {
        Field {
            label: Spanned::new(label.to_string(), Span::default()),
            generator,
        }
    }

    fn record(fields: Vec<Field>) -> Generator {
        Generator::new(
            GeneratorKind::Record(Record {
                fields,
                ..Record::default()
            }),
            Span::default(),
        )
    }

    fn sample() -> Generator {
        let points = Generator::new(
            GeneratorKind::Array {
                element: Box::new(record(vec![field("x", leaf(Primitive::Double(0.0)))])),
                count: 3,
            },
            Span::default(),
        );
        record(vec![
            field("count", leaf(Primitive::Int(5))),
            field("mesh", record(vec![field("points", points)])),
        ])
    }

    #[test]
    fn test_paths() {
        let mut root = sample();
        assign_document(&mut root, "solver");

        let mut paths = Vec::new();
        root.walk(&mut |g| paths.push(g.path().to_string()));
        assert_eq!(
            paths,
            vec![
                "",
                "count",
                "mesh",
                "mesh/points",
                "mesh/points/points_default",
                "mesh/points/points_default/x",
            ]
        );
    }

    #[test]
    fn test_names_and_scopes() {
        let mut root = sample();
        assign_document(&mut root, "solver");

        let mut seen = Vec::new();
        root.walk(&mut |g| seen.push((g.name().to_string(), g.scope().to_string())));
        assert_eq!(
            seen,
            vec![
                ("solver".to_string(), "crate".to_string()),
                ("count".to_string(), "crate::solver".to_string()),
                ("mesh".to_string(), "crate::solver".to_string()),
                ("points".to_string(), "crate::solver::mesh".to_string()),
                (
                    "points_default".to_string(),
                    "crate::solver::mesh::points".to_string()
                ),
                (
                    "x".to_string(),
                    "crate::solver::mesh::points::points_default".to_string()
                ),
            ]
        );
    }
}
