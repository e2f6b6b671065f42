//! Pass 4: `set` and `get`, copying between a static value and its
//! dynamic tree, and the conversions built on them.
//!
//! Record fields are marshalled inline, so the statements for container
//! elements are written in the module of the record and every type they
//! name is qualified from there. Nested containers use depth-indexed
//! variables (`a0`, `e0`, `d1`, ...).

use pdl_parser::{
    generator::{Field, Generator, GeneratorKind, Primitive, Record},
    scope::{Scope, type_name},
};

use super::{
    Context, build::build_expr, impl_header, module_ident,
    writer::{CodeWriter, ModuleTree},
};
use crate::error::PdlError;

pub(super) fn marshal_impls(
    ctx: &Context<'_>,
    generator: &Generator,
    tree: &mut ModuleTree,
) -> Result<(), PdlError> {
    let scope = generator.scope();
    let static_parameters = format!("{}::StaticParameters", ctx.rt);
    match &generator.kind {
        GeneratorKind::Record(record) => {
            let header = impl_header(
                generator,
                Some(record),
                Some(&static_parameters),
                &static_parameters,
            );
            let set = record_set(ctx, generator, record)?;
            let get = record_get(ctx, generator, record);
            let members = tree.impl_members(scope, &header);
            members.push(set);
            members.push(get);

            let header = impl_header(generator, Some(record), None, &static_parameters);
            let members = tree.impl_members(scope, &header);
            members.extend(record_setters(ctx, generator, record));
            members.push(to_parameters_fn(ctx));

            let try_from = format!("::std::convert::TryFrom<&{}::ParameterSet>", ctx.rt);
            let header = impl_header(generator, Some(record), Some(&try_from), &static_parameters);
            tree.impl_members(scope, &header).push(try_from_fn(ctx));
        }
        GeneratorKind::Variant { cases, .. } => {
            let header = impl_header(generator, None, None, "");
            let members = tree.impl_members(scope, &header);
            members.push(variant_label(cases));
            members.push(variant_set(ctx, cases));
            members.push(variant_get(ctx, generator, cases));
        }
        GeneratorKind::Primitive(_)
        | GeneratorKind::Array { .. }
        | GeneratorKind::LabeledArray { .. }
        | GeneratorKind::Included { .. } => {}
    }

    for child in generator.children() {
        marshal_impls(ctx, child, tree)?;
    }
    Ok(())
}

fn record_set(
    ctx: &Context<'_>,
    generator: &Generator,
    record: &Record,
) -> Result<String, PdlError> {
    let rt = ctx.rt;
    let at = generator.scope();
    let used = record.base.is_some() || !record.fields.is_empty();

    let mut w = CodeWriter::new();
    w.open(format!(
        "fn set(&self, {}: &mut {rt}::ParameterSet) -> {rt}::Result<()>",
        if used { "p" } else { "_p" }
    ));
    if record.base.is_some() {
        w.line(format!("{rt}::StaticParameters::set(&self.base, p)?;"));
    }
    for field in &record.fields {
        w.line(format!(
            "let d0 = p.get_or_try_insert_with({:?}, || Ok({rt}::Parameter::from({})))?;",
            field.label.inner(),
            build_expr(ctx, &field.generator, at)?
        ));
        let value = Place::field(field.label.inner());
        set_value(ctx, &mut w, &field.generator, &value, "d0", at, 0);
    }
    w.line("Ok(())");
    w.close();
    Ok(w.finish())
}

fn record_get(ctx: &Context<'_>, generator: &Generator, record: &Record) -> String {
    let rt = ctx.rt;
    let at = generator.scope();
    let used = record.base.is_some() || !record.fields.is_empty();

    let mut w = CodeWriter::new();
    w.open(format!(
        "fn get(&mut self, {}: &{rt}::ParameterSet) -> {rt}::Result<()>",
        if used { "p" } else { "_p" }
    ));
    if record.base.is_some() {
        w.line(format!("{rt}::StaticParameters::get(&mut self.base, p)?;"));
    }
    for field in &record.fields {
        w.line(format!("let d0 = p.get({:?})?;", field.label.inner()));
        let value = Place::field(field.label.inner());
        get_value(ctx, &mut w, &field.generator, &value, "d0", at, 0);
    }
    w.line("Ok(())");
    w.close();
    w.finish()
}

/// One chainable `set_<field>` method per field of `record`.
fn record_setters(ctx: &Context<'_>, generator: &Generator, record: &Record) -> Vec<String> {
    let at = generator.scope();
    record
        .fields
        .iter()
        .map(|field| {
            let ident = module_ident(field.label.inner());
            let mut w = CodeWriter::new();
            w.open(format!(
                "pub fn set_{}(&mut self, v: {}) -> &mut Self",
                ident.trim_start_matches("r#"),
                ctx.static_type(&field.generator, at)
            ));
            w.line(format!("self.{ident} = v;"));
            w.line("self");
            w.close();
            w.finish()
        })
        .collect()
}

fn to_parameters_fn(ctx: &Context<'_>) -> String {
    let rt = ctx.rt;
    let mut w = CodeWriter::new();
    w.line("/// Builds the default dynamic tree and copies this value into it.");
    w.open(format!(
        "pub fn to_parameters(&self) -> {rt}::Result<{rt}::ParameterSet>"
    ));
    w.line(format!(
        "let mut p = <Self as {rt}::StaticParameters>::make_default()?;"
    ));
    w.line(format!("{rt}::StaticParameters::set(self, &mut p)?;"));
    w.line("Ok(p)");
    w.close();
    w.finish()
}

/// `try_from`, reading a value over the defaults.
fn try_from_fn(ctx: &Context<'_>) -> String {
    let rt = ctx.rt;
    let mut w = CodeWriter::new();
    w.line(format!("type Error = {rt}::ParameterError;"));
    w.blank();
    w.open(format!(
        "fn try_from(p: &{rt}::ParameterSet) -> ::std::result::Result<Self, Self::Error>"
    ));
    w.line("let mut v = <Self as ::std::default::Default>::default();");
    w.line(format!("{rt}::StaticParameters::get(&mut v, p)?;"));
    w.line("Ok(v)");
    w.close();
    w.finish()
}

/// Runtime leaf type of a primitive and whether its static value is `Copy`.
fn leaf_kind(primitive: &Primitive) -> Option<(&'static str, bool)> {
    let kind = match primitive {
        Primitive::Bool(_) => ("BoolParameter", true),
        Primitive::Int(_) => ("IntParameter", true),
        Primitive::Double(_) => ("DoubleParameter", true),
        Primitive::String(_) => ("StringParameter", false),
        Primitive::Path(_) | Primitive::Directory(_) => ("PathParameter", false),
        Primitive::Date(_) => ("DateParameter", true),
        Primitive::DateTime(_) => ("DateTimeParameter", true),
        Primitive::Dimensioned { .. } => ("DimensionedParameter", true),
        Primitive::DoubleRange(_) => ("DoubleRangeParameter", false),
        Primitive::Vector(_) => ("VectorParameter", false),
        Primitive::Matrix(_) => ("MatrixParameter", false),
        Primitive::CadGeometry(_) | Primitive::PropertyLibrarySelection { .. } => {
            ("OpaqueParameter", false)
        }
        Primitive::Selection { .. } => return None,
    };
    Some(kind)
}

/// A static value being marshalled: a struct field or a loop reference.
struct Place {
    expr: String,
    by_ref: bool,
}

impl Place {
    fn field(name: &str) -> Self {
        Self {
            expr: format!("self.{}", module_ident(name)),
            by_ref: false,
        }
    }

    fn item(var: &str) -> Self {
        Self {
            expr: var.to_string(),
            by_ref: true,
        }
    }

    /// The value itself, for reads of `Copy` values and assignments.
    fn value(&self) -> String {
        if self.by_ref {
            format!("*{}", self.expr)
        } else {
            self.expr.clone()
        }
    }

    /// A method call receiver.
    fn receiver(&self) -> &str {
        &self.expr
    }

    fn borrow(&self) -> String {
        if self.by_ref {
            self.expr.clone()
        } else {
            format!("&{}", self.expr)
        }
    }

    fn borrow_mut(&self) -> String {
        if self.by_ref {
            self.expr.clone()
        } else {
            format!("&mut {}", self.expr)
        }
    }
}

/// Writes statements copying the static place `value` into the dynamic
/// node `dynamic`.
fn set_value(
    ctx: &Context<'_>,
    w: &mut CodeWriter,
    generator: &Generator,
    value: &Place,
    dynamic: &str,
    at: &Scope,
    depth: usize,
) {
    let rt = ctx.rt;
    match &generator.kind {
        GeneratorKind::Primitive(primitive) => match leaf_kind(primitive) {
            Some((kind, copy)) => {
                let source = if copy {
                    value.value()
                } else {
                    format!("{}.clone()", value.receiver())
                };
                w.line(format!(
                    "{dynamic}.downcast_mut::<{rt}::{kind}>()?.set({source});"
                ));
            }
            None => w.line(format!(
                "{dynamic}.downcast_mut::<{rt}::SelectionParameter>()?.set_selection({}.as_str())?;",
                value.receiver()
            )),
        },
        GeneratorKind::Record(_) | GeneratorKind::Included { .. } => w.line(format!(
            "{rt}::StaticParameters::set({}, {dynamic}.downcast_mut::<{rt}::ParameterSet>()?)?;",
            value.borrow()
        )),
        GeneratorKind::Variant { .. } => w.line(format!(
            "{}.set({dynamic}.downcast_mut::<{rt}::SelectableSubsetParameter>()?)?;",
            value.receiver()
        )),
        GeneratorKind::Array { element, .. } => {
            let (array, item, next) = (
                format!("a{depth}"),
                format!("e{depth}"),
                format!("d{}", depth + 1),
            );
            w.open("");
            w.line(format!(
                "let {array} = {dynamic}.downcast_mut::<{rt}::ArrayParameter>()?;"
            ));
            w.line(format!("{array}.clear();"));
            w.open(format!("for {item} in {}.iter()", value.receiver()));
            w.line(format!("let mut {next} = {array}.make_element();"));
            set_value(ctx, w, element, &Place::item(&item), &next, at, depth + 1);
            w.line(format!("{array}.push({next});"));
            w.close();
            w.close();
        }
        GeneratorKind::LabeledArray { element, .. } => {
            let (array, key, item, next) = (
                format!("a{depth}"),
                format!("k{depth}"),
                format!("e{depth}"),
                format!("d{}", depth + 1),
            );
            w.open("");
            w.line(format!(
                "let {array} = {dynamic}.downcast_mut::<{rt}::LabeledArrayParameter>()?;"
            ));
            w.open(format!("for ({key}, {item}) in {}.iter()", value.receiver()));
            w.line(format!("let {next} = {array}.get_or_insert_default({key});"));
            set_value(ctx, w, element, &Place::item(&item), &next, at, depth + 1);
            w.close();
            w.line(format!(
                "{array}.retain_keys(|key| {}.contains_key(key));",
                value.receiver()
            ));
            w.close();
        }
    }
}

/// Writes statements copying the dynamic node `dynamic` into the static
/// place `value`.
fn get_value(
    ctx: &Context<'_>,
    w: &mut CodeWriter,
    generator: &Generator,
    value: &Place,
    dynamic: &str,
    at: &Scope,
    depth: usize,
) {
    let rt = ctx.rt;
    match &generator.kind {
        GeneratorKind::Primitive(primitive) => match leaf_kind(primitive) {
            Some((kind, copy)) => w.line(format!(
                "{} = {}{dynamic}.downcast_ref::<{rt}::{kind}>()?.value(){};",
                value.value(),
                if copy { "*" } else { "" },
                if copy { "" } else { ".clone()" }
            )),
            None => w.line(format!(
                "{} = {}::from_label({dynamic}.downcast_ref::<{rt}::SelectionParameter>()?.selection())?;",
                value.value(),
                ctx.static_type(generator, at)
            )),
        },
        GeneratorKind::Record(_) | GeneratorKind::Included { .. } => w.line(format!(
            "{rt}::StaticParameters::get({}, {dynamic}.downcast_ref::<{rt}::ParameterSet>()?)?;",
            value.borrow_mut()
        )),
        GeneratorKind::Variant { .. } => w.line(format!(
            "{}.get({dynamic}.downcast_ref::<{rt}::SelectableSubsetParameter>()?)?;",
            value.receiver()
        )),
        GeneratorKind::Array { element, .. } => {
            let (array, item, next) = (
                format!("a{depth}"),
                format!("e{depth}"),
                format!("d{}", depth + 1),
            );
            w.open("");
            w.line(format!(
                "let {array} = {dynamic}.downcast_ref::<{rt}::ArrayParameter>()?;"
            ));
            w.line(format!(
                "{}.resize_with({array}.len(), ::std::default::Default::default);",
                value.receiver()
            ));
            w.open(format!(
                "for ({item}, {next}) in {}.iter_mut().zip({array}.iter())",
                value.receiver()
            ));
            get_value(ctx, w, element, &Place::item(&item), &next, at, depth + 1);
            w.close();
            w.close();
        }
        GeneratorKind::LabeledArray { element, .. } => {
            let (array, key, item, next) = (
                format!("a{depth}"),
                format!("k{depth}"),
                format!("e{depth}"),
                format!("d{}", depth + 1),
            );
            w.open("");
            w.line(format!(
                "let {array} = {dynamic}.downcast_ref::<{rt}::LabeledArrayParameter>()?;"
            ));
            w.open(format!("for ({key}, {next}) in {array}.iter()"));
            w.line(format!(
                "let {item} = {}.entry({key}.to_string()).or_default();",
                value.receiver()
            ));
            get_value(ctx, w, element, &Place::item(&item), &next, at, depth + 1);
            w.close();
            w.close();
        }
    }
}

fn variant_label(cases: &[Field]) -> String {
    let mut w = CodeWriter::new();
    w.line("/// Returns the label of the active case.");
    w.open("pub fn label(&self) -> &'static str");
    w.open("match self");
    for case in cases {
        w.line(format!(
            "Self::{}(_) => {:?},",
            type_name(case.label.inner()),
            case.label.inner()
        ));
    }
    w.close();
    w.close();
    w.finish()
}

fn variant_set(ctx: &Context<'_>, cases: &[Field]) -> String {
    let rt = ctx.rt;
    let mut w = CodeWriter::new();
    w.line("/// Selects the active case in `p` and copies its fields.");
    w.open(format!(
        "pub fn set(&self, p: &mut {rt}::SelectableSubsetParameter) -> {rt}::Result<()>"
    ));
    w.line("p.set_selection(self.label())?;");
    w.open("match self");
    for case in cases {
        w.line(format!(
            "Self::{}(v) => {rt}::StaticParameters::set(v, p.active_mut()?),",
            type_name(case.label.inner())
        ));
    }
    w.close();
    w.close();
    w.finish()
}

fn variant_get(ctx: &Context<'_>, generator: &Generator, cases: &[Field]) -> String {
    let rt = ctx.rt;
    let at = generator.scope();
    let labels: Vec<&str> = cases.iter().map(|c| c.label.inner().as_str()).collect();

    let mut w = CodeWriter::new();
    w.line("/// Replaces this value with the case selected in `p`.");
    w.open(format!(
        "pub fn get(&mut self, p: &{rt}::SelectableSubsetParameter) -> {rt}::Result<()>"
    ));
    w.open("*self = match p.selection()");
    for case in cases {
        w.open(format!("{:?} =>", case.label.inner()));
        w.line(format!(
            "let mut v = <{} as ::std::default::Default>::default();",
            ctx.static_type(&case.generator, at)
        ));
        w.line(format!("{rt}::StaticParameters::get(&mut v, p.active()?)?;"));
        w.line(format!("Self::{}(v)", type_name(case.label.inner())));
        w.close();
    }
    w.open("other =>");
    w.open(format!(
        "return Err({rt}::ParameterError::UnknownSelection"
    ));
    w.line(format!(
        "name: ::std::string::String::from({:?}),",
        generator.path()
    ));
    w.line("selection: other.to_string(),");
    w.line(format!(
        "options: ::std::string::String::from({:?}),",
        labels.join(", ")
    ));
    w.close_with(");");
    w.close();
    w.close_with(";");
    w.line("Ok(())");
    w.close();
    w.finish()
}
