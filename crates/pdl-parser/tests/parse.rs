use pdl_parser::{
    Registry,
    error::{Diagnostic, ErrorCode},
    generator::{Generator, GeneratorKind, Primitive},
    parse_document, parse_document_with, parse_library,
    rule::{Grammar, IResult, Input, float_literal, int_literal},
};

fn first_code(result: Result<impl std::fmt::Debug, pdl_parser::error::ParseError>) -> ErrorCode {
    let err = result.expect_err("Expected parsing to fail");
    err.diagnostics()[0].code().expect("diagnostic has a code")
}

#[test]
fn test_names_paths_and_scopes() {
    let source = r#"
        mesh = set {
            cells = int 100
            layers = array [ double 0.1 ] * 3
        }
        solver = selectablesubset {{
            simple { tolerance = double 1e-6 }
        }} simple
    "#;

    let document = parse_document("Case", source).expect("Failed to parse");
    assert_eq!(document.name(), "Case");

    let root = document.root();
    assert_eq!(root.name(), "Case");
    assert_eq!(root.path(), "");
    assert_eq!(root.scope().to_string(), "crate");

    let record = document.record().expect("root is a record");
    let mesh = &record.field("mesh").expect("mesh").generator;
    assert_eq!(mesh.path(), "mesh");
    assert_eq!(mesh.scope().to_string(), "crate::case");

    let layers = &mesh.as_record().expect("set").field("layers").expect("layers").generator;
    assert_eq!(layers.path(), "mesh/layers");
    assert_eq!(layers.scope().to_string(), "crate::case::mesh");

    let GeneratorKind::Array { element, .. } = &layers.kind else {
        panic!("Expected array");
    };
    assert_eq!(element.name(), "layers_default");
    assert_eq!(element.path(), "mesh/layers/layers_default");
    assert_eq!(element.scope().to_string(), "crate::case::mesh::layers");

    let solver = &record.field("solver").expect("solver").generator;
    let GeneratorKind::Variant { cases, .. } = &solver.kind else {
        panic!("Expected selectable subset");
    };
    assert_eq!(cases[0].generator.path(), "solver/simple");
    assert_eq!(cases[0].generator.scope().to_string(), "crate::case::solver");
}

#[test]
fn test_lexer_errors_are_reported() {
    assert_eq!(first_code(parse_document("A", "x = string \"abc")), ErrorCode::E001);
    assert_eq!(first_code(parse_document("A", "x = int 1 ~")), ErrorCode::E002);
    assert_eq!(first_code(parse_document("A", "x = string \"\\q\"")), ErrorCode::E003);
}

#[test]
fn test_custom_registry() {
    let registry = Registry::empty();
    assert_eq!(
        first_code(parse_document_with(&registry, "A", "x = int 1")),
        ErrorCode::E102
    );
    assert!(parse_document_with(&registry, "A", "").is_ok());
}

fn integer_rule(_: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    let value = int_literal(input)?;
    Ok(GeneratorKind::Primitive(Primitive::Int(value.into_inner())))
}

/// A percentage, stored as a fraction.
fn percent_rule(g: &mut Grammar<'_>, input: &mut Input<'_>) -> IResult<GeneratorKind> {
    let value = float_literal(input)?;
    if !(0.0..=100.0).contains(value.inner()) {
        let diagnostic = Diagnostic::error(format!(
            "percentage {} out of range{}",
            value.inner(),
            g.location()
        ))
        .with_code(ErrorCode::E205)
        .with_label(value.span(), "expected a value from 0 to 100");
        return g.fail(diagnostic);
    }
    Ok(GeneratorKind::Primitive(Primitive::Double(
        value.into_inner() / 100.0,
    )))
}

fn field<'a>(root: &'a Generator, name: &str) -> &'a Generator {
    &root
        .as_record()
        .expect("record")
        .field(name)
        .expect("field exists")
        .generator
}

#[test]
fn test_registered_keywords() {
    let mut registry = Registry::with_builtin_kinds();
    registry.register("integer", integer_rule);
    registry.register("percent", percent_rule);
    let int = registry.rule("int").expect("int is built in");
    registry.register("long", int);
    assert!(registry.contains("integer"));

    let source = r#"
        cells = integer 10 "number of cells" *necessary
        relaxation = percent 25
        mesh = set {
            layers = integer 3
            size = long 7
        }
        levels = array [ percent 50 ] * 2
    "#;
    let document = parse_document_with(&registry, "Case", source).expect("Failed to parse");
    let root = document.root();

    let cells = field(root, "cells");
    assert_eq!(cells.kind, GeneratorKind::Primitive(Primitive::Int(10)));
    assert_eq!(cells.meta.description, "number of cells");
    assert!(cells.meta.necessary);
    assert_eq!(
        field(root, "relaxation").kind,
        GeneratorKind::Primitive(Primitive::Double(0.25))
    );

    let mesh = field(root, "mesh");
    assert_eq!(field(mesh, "layers").path(), "mesh/layers");
    assert_eq!(
        field(mesh, "size").kind,
        GeneratorKind::Primitive(Primitive::Int(7))
    );

    let GeneratorKind::Array { element, count } = &field(root, "levels").kind else {
        panic!("Expected array");
    };
    assert_eq!(*count, 2);
    assert_eq!(element.kind, GeneratorKind::Primitive(Primitive::Double(0.5)));
}

#[test]
fn test_registered_keyword_errors() {
    let mut registry = Registry::with_builtin_kinds();
    registry.register("percent", percent_rule);

    let err = parse_document_with(&registry, "Case", "mesh = set { ratio = percent 150 }")
        .expect_err("Expected parsing to fail");
    let diagnostic = &err.diagnostics()[0];
    assert_eq!(diagnostic.code(), Some(ErrorCode::E205));
    assert!(diagnostic.message().contains("at `mesh/ratio`"), "{}", diagnostic.message());

    assert_eq!(
        first_code(parse_document_with(&registry, "Case", "ratio = percent high")),
        ErrorCode::E100
    );
    assert_eq!(
        first_code(parse_document("Case", "ratio = percent 50")),
        ErrorCode::E102
    );
}

#[test]
fn test_parse_library() {
    let library = parse_library([
        ("Mesh", "cells = int 100 \"cells\""),
        ("Case", "mesh = includedset Mesh \"mesh\""),
    ])
    .expect("Failed to parse library");

    assert_eq!(library.len(), 2);
    let names: Vec<_> = library.documents().map(|d| d.name()).collect();
    assert_eq!(names, ["Mesh", "Case"]);
}

#[test]
fn test_parse_library_reports_document() {
    let err = parse_library([
        ("Mesh", "cells = int 100"),
        ("Case", "mesh = includedset Grid"),
    ])
    .expect_err("Expected validation to fail");
    assert_eq!(err.document, "Case");
    assert_eq!(err.error.diagnostics()[0].code(), Some(ErrorCode::E300));

    let err = parse_library([("Broken", "x = int")]).expect_err("Expected parsing to fail");
    assert_eq!(err.document, "Broken");
}
