//! Plain-text view of a dynamic parameter tree.

use std::fmt;

use pdl_core::{Meta, Parameter, ParameterSet};

const INDENT: &str = "  ";

/// Displays a [`ParameterSet`] one node per line, children indented.
///
/// Leaves show their kind and value; only the active case of a
/// selectable subset is expanded.
///
/// ```
/// use pdl::tree::TreeView;
/// use pdl_core::{IntParameter, Meta, ParameterSet};
///
/// let mut set = ParameterSet::new(Meta::default());
/// set.insert("cells", IntParameter::new(10, Meta::new("cells")));
///
/// let text = TreeView::new("Mesh", &set).to_string();
/// assert_eq!(text, "Mesh (set)\n  cells: int = 10\n");
/// ```
pub struct TreeView<'a> {
    name: &'a str,
    set: &'a ParameterSet,
}

impl<'a> TreeView<'a> {
    pub fn new(name: &'a str, set: &'a ParameterSet) -> Self {
        Self { name, set }
    }
}

impl fmt::Display for TreeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} (set){}", self.name, flags(self.set.meta()))?;
        write_set(f, self.set, 1)
    }
}

fn write_set(f: &mut fmt::Formatter<'_>, set: &ParameterSet, depth: usize) -> fmt::Result {
    for (name, parameter) in set.iter() {
        write_node(f, name, parameter, depth)?;
    }
    Ok(())
}

fn write_node(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    parameter: &Parameter,
    depth: usize,
) -> fmt::Result {
    let indent = INDENT.repeat(depth);
    let flags = flags(parameter.meta());
    match parameter {
        Parameter::Set(set) => {
            writeln!(f, "{indent}{name} (set){flags}")?;
            write_set(f, set, depth + 1)
        }
        Parameter::Array(array) => {
            writeln!(f, "{indent}{name} (array, {}){flags}", array.len())?;
            for (i, element) in array.iter().enumerate() {
                write_node(f, &format!("[{i}]"), element, depth + 1)?;
            }
            Ok(())
        }
        Parameter::LabeledArray(array) => {
            writeln!(f, "{indent}{name} (labeledarray, {}){flags}", array.len())?;
            for (key, element) in array.iter() {
                write_node(f, &format!("[{key}]"), element, depth + 1)?;
            }
            Ok(())
        }
        Parameter::SelectableSubset(subset) => {
            writeln!(
                f,
                "{indent}{name} (selectablesubset = {}){flags}",
                subset.selection()
            )?;
            match subset.active() {
                Ok(active) => write_set(f, active, depth + 1),
                Err(_) => Ok(()),
            }
        }
        leaf => writeln!(f, "{indent}{name}: {} = {}{flags}", leaf.kind(), LeafValue(leaf)),
    }
}

struct LeafValue<'a>(&'a Parameter);

impl fmt::Display for LeafValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Parameter::Bool(p) => write!(f, "{}", p.value()),
            Parameter::Int(p) => write!(f, "{}", p.value()),
            Parameter::Double(p) => write!(f, "{}", p.value()),
            Parameter::String(p) => write!(f, "{:?}", p.value()),
            Parameter::Path(p) => write!(f, "{:?}", p.value().display().to_string()),
            Parameter::Date(p) => write!(f, "{}", p.value()),
            Parameter::DateTime(p) => write!(f, "{}", p.value()),
            Parameter::Vector(p) => write!(f, "{:?}", p.value()),
            Parameter::DoubleRange(p) => write!(f, "{:?}", p.value()),
            Parameter::Matrix(p) => write!(f, "{}", p.value()),
            Parameter::Selection(p) => write!(f, "{}", p.selection()),
            Parameter::Dimensioned(p) => write!(f, "{} ({}, SI)", p.value(), p.quantity()),
            Parameter::Opaque(p) => write!(f, "{:?} ({})", p.value(), p.type_key()),
            other => write!(f, "<{}>", other.kind()),
        }
    }
}

fn flags(meta: &Meta) -> String {
    let mut flags = String::new();
    if meta.is_necessary() {
        flags.push_str(" *necessary");
    }
    if meta.is_expert() {
        flags.push_str(" *expert");
    }
    if meta.is_hidden() {
        flags.push_str(" *hidden");
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdl_core::{
        ArrayParameter, DimensionedParameter, SelectableSubsetParameter, StringParameter,
    };

    #[test]
    fn test_nested_view() {
        let mut layer = ParameterSet::new(Meta::default());
        layer.insert("name", StringParameter::new("steel".to_string(), Meta::default()));
        let mut layers = ArrayParameter::new(Into::<Parameter>::into(layer), Meta::new("layers"));
        layers.resize(1);

        let mut subset = SelectableSubsetParameter::new(Meta::default().with_expert(true));
        subset.add_case("simple", ParameterSet::new(Meta::default()));

        let mut root = ParameterSet::new(Meta::default());
        root.insert(
            "h",
            DimensionedParameter::new("length", 2.0, "m", Meta::default()).unwrap(),
        );
        root.insert("layers", layers);
        root.insert("solver", subset);

        let text = TreeView::new("Case", &root).to_string();
        assert_eq!(
            text,
            "Case (set)\n\
             \x20 h: dimensioned = 2 (length, SI)\n\
             \x20 layers (array, 1)\n\
             \x20   [0] (set)\n\
             \x20     name: string = \"steel\"\n\
             \x20 solver (selectablesubset = simple) *expert\n"
        );
    }
}
