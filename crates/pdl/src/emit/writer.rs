//! Indented text output and the module tree of the generated artifact.

use indexmap::IndexMap;
use pdl_parser::scope::Scope;

const INDENT: &str = "    ";

/// Line oriented writer that tracks the current indentation level.
#[derive(Debug, Default)]
pub(crate) struct CodeWriter {
    output: String,
    indent_level: usize,
}

impl CodeWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Writes one line at the current indentation.
    pub(crate) fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            self.output.push_str(&INDENT.repeat(self.indent_level));
            self.output.push_str(text);
        }
        self.output.push('\n');
    }

    /// Writes every line of `text`, each at the current indentation.
    pub(crate) fn lines(&mut self, text: &str) {
        for line in text.lines() {
            self.line(line);
        }
    }

    pub(crate) fn blank(&mut self) {
        self.output.push('\n');
    }

    /// Writes `header {` and indents.
    pub(crate) fn open(&mut self, header: impl AsRef<str>) {
        let header = header.as_ref();
        if header.is_empty() {
            self.line("{");
        } else {
            self.line(format!("{header} {{"));
        }
        self.indent_level += 1;
    }

    /// Dedents and writes `}` followed by `suffix`.
    pub(crate) fn close_with(&mut self, suffix: &str) {
        self.indent_level = self.indent_level.saturating_sub(1);
        self.line(format!("}}{suffix}"));
    }

    pub(crate) fn close(&mut self) {
        self.close_with("");
    }

    pub(crate) fn finish(self) -> String {
        self.output
    }
}

/// A top level item of one module.
#[derive(Debug)]
pub(crate) enum Item {
    /// Finished source text.
    Code(String),
    /// Index of an impl block whose functions are contributed by several passes.
    Impl(usize),
}

/// Items and nested modules of the artifact, keyed by module name.
///
/// Passes add items in any order; nothing is rendered until every pass
/// has succeeded.
#[derive(Debug, Default)]
pub(crate) struct ModuleTree {
    items: Vec<Item>,
    impls: Vec<(String, Vec<String>)>,
    modules: IndexMap<String, ModuleTree>,
}

impl ModuleTree {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the module at `scope`, creating it and its parents on demand.
    pub(crate) fn module_mut(&mut self, scope: &Scope) -> &mut ModuleTree {
        let mut module = self;
        for segment in scope.segments() {
            module = module.modules.entry(segment.clone()).or_default();
        }
        module
    }

    /// Appends source text to the module at `scope`.
    pub(crate) fn push(&mut self, scope: &Scope, code: String) {
        self.module_mut(scope).items.push(Item::Code(code));
    }

    /// Returns the member list of the impl block `header` at `scope`.
    pub(crate) fn impl_members(&mut self, scope: &Scope, header: &str) -> &mut Vec<String> {
        let module = self.module_mut(scope);
        let index = match module.impls.iter().position(|(h, _)| h == header) {
            Some(index) => index,
            None => {
                module.impls.push((header.to_string(), Vec::new()));
                let index = module.impls.len() - 1;
                module.items.push(Item::Impl(index));
                index
            }
        };
        &mut module.impls[index].1
    }

    /// Renders all items, then all nested modules, depth first.
    pub(crate) fn render(&self, writer: &mut CodeWriter) {
        let mut first = true;
        for item in &self.items {
            if !first {
                writer.blank();
            }
            first = false;
            match item {
                Item::Code(code) => writer.lines(code),
                Item::Impl(index) => {
                    let (header, members) = &self.impls[*index];
                    writer.open(header);
                    for (i, member) in members.iter().enumerate() {
                        if i > 0 {
                            writer.blank();
                        }
                        writer.lines(member);
                    }
                    writer.close();
                }
            }
        }
        for (name, module) in &self.modules {
            if !first {
                writer.blank();
            }
            first = false;
            writer.open(format!("pub mod {name}"));
            module.render(writer);
            writer.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_indents_blocks() {
        let mut w = CodeWriter::new();
        w.open("fn f()");
        w.line("let x = 1;");
        w.open("");
        w.lines("a();\nb();");
        w.close_with(";");
        w.close();
        assert_eq!(
            w.finish(),
            "fn f() {\n    let x = 1;\n    {\n        a();\n        b();\n    };\n}\n"
        );
    }

    #[test]
    fn test_impl_members_are_shared() {
        let scope = Scope::root().child("case");
        let mut tree = ModuleTree::new();
        tree.impl_members(&scope, "impl A").push("fn a() {}".to_string());
        tree.push(&scope, "struct B;".to_string());
        tree.impl_members(&scope, "impl A").push("fn b() {}".to_string());

        let mut w = CodeWriter::new();
        tree.render(&mut w);
        assert_eq!(
            w.finish(),
            "pub mod case {\n    impl A {\n        fn a() {}\n\n        fn b() {}\n    }\n\n    struct B;\n}\n"
        );
    }
}
