//! Module scopes of generated types and the names used inside them.
//!
//! Every composite node declares its static type in the module of its
//! parent and opens a child module, named after itself, for the types of
//! its own children. A [`Scope`] is the module path of such a declaration.
//! [`Scope::qualify`] turns a declaration site into a path that resolves
//! from any other module of the same artifact.

use std::fmt;

/// Words that cannot be used as plain identifiers in generated code.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe",
    "unsized", "use", "virtual", "where", "while", "yield",
];

/// Keywords that are not accepted as raw identifiers either.
const PATH_KEYWORDS: &[&str] = &["crate", "self", "Self", "super"];

/// A module path relative to the root of the generated artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Scope {
    segments: Vec<String>,
}

impl Scope {
    /// The artifact root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Returns the scope of the module opened by a composite named `name`.
    pub fn child(&self, name: &str) -> Scope {
        let mut segments = self.segments.clone();
        segments.push(module_name(name));
        Scope { segments }
    }

    /// Returns the path of `ident`, declared in `self`, as written from
    /// inside the module `at`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdl_parser::scope::Scope;
    ///
    /// let solver = Scope::root().child("solver");
    /// let mesh = solver.child("mesh");
    ///
    /// assert_eq!(mesh.qualify(&solver, "Cell"), "mesh::Cell");
    /// assert_eq!(solver.qualify(&mesh, "Mesh"), "super::Mesh");
    /// assert_eq!(Scope::root().qualify(&mesh, "Solver"), "super::super::Solver");
    /// ```
    pub fn qualify(&self, at: &Scope, ident: &str) -> String {
        let common = self
            .segments
            .iter()
            .zip(&at.segments)
            .take_while(|(a, b)| a == b)
            .count();

        let mut parts: Vec<&str> = Vec::new();
        parts.extend(std::iter::repeat_n("super", at.segments.len() - common));
        parts.extend(self.segments[common..].iter().map(String::as_str));
        parts.push(ident);
        parts.join("::")
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "crate")
        } else {
            write!(f, "crate::{}", self.segments.join("::"))
        }
    }
}

fn words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for c in name.chars() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev = None;
            continue;
        }
        let boundary = c.is_ascii_uppercase()
            && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit());
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
        prev = Some(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn escape(ident: String) -> String {
    if PATH_KEYWORDS.contains(&ident.as_str()) {
        format!("{ident}_")
    } else if KEYWORDS.contains(&ident.as_str()) {
        format!("r#{ident}")
    } else if ident.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{ident}")
    } else {
        ident
    }
}

/// Converts a schema name to the name of a generated type or enum variant.
///
/// ```
/// use pdl_parser::scope::type_name;
///
/// assert_eq!(type_name("meshSize"), "MeshSize");
/// assert_eq!(type_name("pts_default"), "PtsDefault");
/// assert_eq!(type_name("self"), "Self_");
/// ```
pub fn type_name(name: &str) -> String {
    let camel: String = words(name)
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    if camel.is_empty() {
        return "Unnamed".to_string();
    }
    escape(camel)
}

/// Converts a schema name to a module, field or function name.
///
/// ```
/// use pdl_parser::scope::module_name;
///
/// assert_eq!(module_name("meshSize"), "mesh_size");
/// assert_eq!(module_name("Solver"), "solver");
/// assert_eq!(module_name("type"), "r#type");
/// ```
pub fn module_name(name: &str) -> String {
    let snake = words(name)
        .iter()
        .map(|word| word.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("_");
    if snake.is_empty() {
        return "unnamed".to_string();
    }
    escape(snake)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn scope(segments: &[&str]) -> Scope {
        segments.iter().fold(Scope::root(), |s, seg| s.child(seg))
    }

    /// Resolves a relative path the way the compiler would, starting in `at`.
    fn resolve(at: &Scope, path: &str) -> Vec<String> {
        let mut current = at.segments().to_vec();
        for part in path.split("::") {
            if part == "super" {
                current.pop();
            } else {
                current.push(part.to_string());
            }
        }
        current
    }

    #[test]
    fn test_qualify_same_module() {
        let s = scope(&["solver"]);
        assert_eq!(s.qualify(&s, "Mesh"), "Mesh");
    }

    #[test]
    fn test_qualify_sibling_branch() {
        let declared = scope(&["solver", "mesh"]);
        let at = scope(&["solver", "output", "fields"]);
        assert_eq!(declared.qualify(&at, "Cell"), "super::super::mesh::Cell");
    }

    #[test]
    fn test_case_conversion() {
        assert_eq!(type_name("x"), "X");
        assert_eq!(type_name("max_iter2d"), "MaxIter2d");
        assert_eq!(type_name("HTTPServer"), "HTTPServer");
        assert_eq!(module_name("HTTPServer"), "httpserver");
        assert_eq!(module_name("maxIter"), "max_iter");
        assert_eq!(module_name("super"), "super_");
        assert_eq!(module_name("_"), "unnamed");
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(Scope::root().to_string(), "crate");
        assert_eq!(scope(&["solverConfig", "mesh"]).to_string(), "crate::solver_config::mesh");
    }

    fn segments() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-c]{1,2}", 0..5)
    }

    proptest! {
        #[test]
        fn prop_qualified_path_resolves_to_declaration(
            declared in segments(),
            at in segments(),
        ) {
            let declared = declared.iter().fold(Scope::root(), |s, seg| s.child(seg));
            let at = at.iter().fold(Scope::root(), |s, seg| s.child(seg));

            let path = declared.qualify(&at, "Target");
            let mut expected = declared.segments().to_vec();
            expected.push("Target".to_string());

            prop_assert_eq!(resolve(&at, &path), expected);
        }

        #[test]
        fn prop_qualified_path_never_leaves_root(
            declared in segments(),
            at in segments(),
        ) {
            let declared = declared.iter().fold(Scope::root(), |s, seg| s.child(seg));
            let at = at.iter().fold(Scope::root(), |s, seg| s.child(seg));

            let path = declared.qualify(&at, "Target");
            let supers = path.split("::").filter(|p| *p == "super").count();
            prop_assert!(supers <= at.depth());
        }
    }
}
