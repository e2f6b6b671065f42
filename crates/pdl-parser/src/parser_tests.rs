//! Unit tests for the document grammar and the builtin type rules.
//!
//! These tests run the lexer and the parser on small documents and check
//! the generator tree or the diagnostic produced.

use pdl_core::KeySource;

use crate::{
    error::{Diagnostic, ErrorCode},
    generator::{Generator, GeneratorKind, Primitive},
    lexer, parser,
    registry::Registry,
};

/// Helper function to parse a source string into its root generator
fn parse_source(source: &str) -> Result<Generator, String> {
    let tokens = lexer::tokenize(source).map_err(|err| format!("Lexer error: {err}"))?;
    parser::build_document(&tokens, &Registry::with_builtin_kinds())
        .map_err(|err| format!("Parser error: {err}"))
}

/// Helper function to parse a source string and assert success
fn assert_parses_successfully(source: &str) -> Generator {
    match parse_source(source) {
        Ok(root) => root,
        Err(e) => panic!("Expected parsing to succeed, but got error: {e}"),
    }
}

/// Helper function to parse a source string and assert failure
fn assert_parse_fails(source: &str) {
    if parse_source(source).is_ok() {
        panic!("Expected parsing to fail, but it succeeded");
    }
}

/// Helper returning the diagnostic of a document that must fail to parse
fn parse_diagnostic(source: &str) -> Diagnostic {
    let tokens = lexer::tokenize(source).expect("Lexer should succeed");
    match parser::build_document(&tokens, &Registry::with_builtin_kinds()) {
        Ok(_) => panic!("Expected parsing to fail, but it succeeded"),
        Err(diagnostic) => diagnostic,
    }
}

fn assert_error_code(source: &str, code: ErrorCode) {
    let diagnostic = parse_diagnostic(source);
    assert_eq!(
        diagnostic.code(),
        Some(code),
        "unexpected diagnostic: {diagnostic}"
    );
}

fn field<'a>(root: &'a Generator, name: &str) -> &'a Generator {
    let record = root.as_record().expect("root is a record");
    &record.field(name).expect("field exists").generator
}

mod primitives {
    use super::*;

    #[test]
    fn test_scalar_fields() {
        let root = assert_parses_successfully(
            r#"
            enabled = bool true "switch"
            cells = int 100 "number of cells"
            ratio = double 0.5
            title = string "case"
            "#,
        );

        assert_eq!(
            field(&root, "enabled").kind,
            GeneratorKind::Primitive(Primitive::Bool(true))
        );
        assert_eq!(
            field(&root, "cells").kind,
            GeneratorKind::Primitive(Primitive::Int(100))
        );
        assert_eq!(
            field(&root, "ratio").kind,
            GeneratorKind::Primitive(Primitive::Double(0.5))
        );
        assert_eq!(field(&root, "cells").meta.description, "number of cells");
        assert_eq!(field(&root, "ratio").meta.description, "");
    }

    #[test]
    fn test_double_accepts_integer_literal() {
        let root = assert_parses_successfully("x = double 3");
        assert_eq!(
            field(&root, "x").kind,
            GeneratorKind::Primitive(Primitive::Double(3.0))
        );
    }

    #[test]
    fn test_paths() {
        let root = assert_parses_successfully(
            r#"
            mesh = path "constant/polyMesh"
            output = directory "results"
            "#,
        );
        assert_eq!(field(&root, "mesh").parameter_kind(), "path");
        assert_eq!(
            field(&root, "output").kind,
            GeneratorKind::Primitive(Primitive::Directory("results".to_string()))
        );
    }

    #[test]
    fn test_date_and_datetime() {
        let root = assert_parses_successfully(
            r#"
            start = date "2024-03-01"
            stamp = datetime "2024-03-01T12:30:00"
            other = datetime "2024-03-01 12:30:00"
            "#,
        );
        assert_eq!(field(&root, "start").parameter_kind(), "date");
        assert_eq!(field(&root, "stamp").kind, field(&root, "other").kind);
    }

    #[test]
    fn test_dimensioned() {
        let root = assert_parses_successfully("h = dimensioned length 2.5 mm \"height\"");
        match &field(&root, "h").kind {
            GeneratorKind::Primitive(Primitive::Dimensioned {
                quantity,
                value,
                unit,
            }) => {
                assert_eq!(quantity, "length");
                assert_eq!(*value, 2.5);
                assert_eq!(unit, "mm");
            }
            other => panic!("Expected dimensioned, got {other:?}"),
        }
    }

    #[test]
    fn test_number_lists() {
        let root = assert_parses_successfully(
            r#"
            range = doublerange (3 1, 2 1)
            origin = vector (0 0 1)
            rotation = matrix ((1 0) (0 1))
            "#,
        );
        assert_eq!(
            field(&root, "range").kind,
            GeneratorKind::Primitive(Primitive::DoubleRange(vec![1.0, 2.0, 3.0]))
        );
        assert_eq!(
            field(&root, "origin").kind,
            GeneratorKind::Primitive(Primitive::Vector(vec![0.0, 0.0, 1.0]))
        );
        match &field(&root, "rotation").kind {
            GeneratorKind::Primitive(Primitive::Matrix(m)) => {
                assert_eq!((m.rows(), m.cols()), (2, 2));
            }
            other => panic!("Expected matrix, got {other:?}"),
        }
    }

    #[test]
    fn test_selection() {
        let root = assert_parses_successfully("method = selection (euler, rk4) rk4 \"scheme\"");
        assert_eq!(
            field(&root, "method").kind,
            GeneratorKind::Primitive(Primitive::Selection {
                items: vec!["euler".to_string(), "rk4".to_string()],
                default: "rk4".to_string(),
            })
        );
    }

    #[test]
    fn test_opaque_kinds() {
        let root = assert_parses_successfully(
            r#"
            body = cadgeometry "box(1, 1, 1)"
            fluid = propertylibraryselection fluids "water"
            "#,
        );
        assert_eq!(field(&root, "body").parameter_kind(), "opaque");
        assert_eq!(field(&root, "fluid").parameter_kind(), "opaque");
    }

    #[test]
    fn test_flags() {
        let root = assert_parses_successfully(
            "x = int 1 \"x\" *necessary *expert\ny = int 2 *hidden",
        );
        let x = field(&root, "x");
        assert!(x.meta.necessary && x.meta.expert && !x.meta.hidden);
        assert!(field(&root, "y").meta.hidden);
    }
}

mod containers {
    use super::*;

    #[test]
    fn test_array() {
        let root = assert_parses_successfully("values = array [ double 1.0 ] * 3 \"values\"");
        match &field(&root, "values").kind {
            GeneratorKind::Array { element, count } => {
                assert_eq!(*count, 3);
                assert_eq!(element.parameter_kind(), "double");
            }
            other => panic!("Expected array, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_array() {
        let keyword = assert_parses_successfully("v = array [ int 0 ] * 2");
        let bare = assert_parses_successfully("v = [ int 0 ] * 2");
        assert_eq!(field(&keyword, "v").kind, field(&bare, "v").kind);
    }

    #[test]
    fn test_nested_arrays() {
        let root = assert_parses_successfully("grid = [ [ double 0 ] * 2 ] * 3");
        let GeneratorKind::Array { element, count } = &field(&root, "grid").kind else {
            panic!("Expected array");
        };
        assert_eq!(*count, 3);
        assert!(matches!(element.kind, GeneratorKind::Array { count: 2, .. }));
    }

    #[test]
    fn test_labeled_array_key_sources() {
        let root = assert_parses_successfully(
            r#"
            plain = labeledarray [ int 0 ] * 2
            named = labeledarray "patch%d" [ int 0 ] * 2
            linked = labeledarray keysFrom "../patches" [ int 0 ] * 0
            "#,
        );
        let keys = |name| match &field(&root, name).kind {
            GeneratorKind::LabeledArray { keys, .. } => keys.clone(),
            other => panic!("Expected labeled array, got {other:?}"),
        };
        assert_eq!(keys("plain"), KeySource::Pattern("%d".to_string()));
        assert_eq!(keys("named"), KeySource::Pattern("patch%d".to_string()));
        assert_eq!(keys("linked"), KeySource::Reference("../patches".to_string()));
    }

    #[test]
    fn test_array_of_sets() {
        assert_parses_successfully(
            r#"
            layers = array [
                set {
                    thickness = double 0.1
                    material = string "steel"
                }
            ] * 2 "layers"
            "#,
        );
    }
}

mod records {
    use super::*;

    #[test]
    fn test_nested_set() {
        let root = assert_parses_successfully(
            r#"
            mesh = set {
                cells = int 10
                refine = bool false
            } "mesh settings"
            "#,
        );
        let mesh = field(&root, "mesh");
        let record = mesh.as_record().expect("mesh is a set");
        assert_eq!(record.fields.len(), 2);
        assert_eq!(record.fields[1].generator.meta.order, 1);
        assert_eq!(mesh.meta.description, "mesh settings");
    }

    #[test]
    fn test_set_with_base_and_code() {
        let root = assert_parses_successfully(
            r#"
            geometry = set inherits Geometry {
                scale = double 1
            } addTo_makeDefault { p.get::<f64>("scale"); }
            "#,
        );
        let record = field(&root, "geometry").as_record().expect("set");
        assert_eq!(record.base.as_ref().map(|b| b.inner().as_str()), Some("Geometry"));
        assert_eq!(
            record.init_code.as_deref().map(str::trim),
            Some("p.get::<f64>(\"scale\");")
        );
    }

    #[test]
    fn test_document_header() {
        let root = assert_parses_successfully(
            r#"
            <B> inherits B
            addTo_makeDefault { }
            y = int 1
            "#,
        );
        let record = root.as_record().expect("root record");
        assert!(record.has_generic_base());
        assert!(record.init_code.is_some());
        assert_eq!(record.fields.len(), 1);
    }

    #[test]
    fn test_included_set() {
        let root = assert_parses_successfully("mesh = includedset Mesh \"mesh\"");
        match &field(&root, "mesh").kind {
            GeneratorKind::Included { target } => assert_eq!(target.inner(), "Mesh"),
            other => panic!("Expected included set, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_document() {
        let root = assert_parses_successfully("// only a comment\n");
        assert!(root.as_record().expect("root record").fields.is_empty());
    }
}

mod variants {
    use super::*;

    #[test]
    fn test_selectable_subset() {
        let root = assert_parses_successfully(
            r#"
            solver = selectablesubset {{
                simple set { tolerance = double 1e-6 }
                piso { correctors = int 2 }
                custom includedset CustomSolver
            }} simple "solver"
            "#,
        );
        match &field(&root, "solver").kind {
            GeneratorKind::Variant { cases, default } => {
                let labels: Vec<_> = cases.iter().map(|c| c.label.inner().as_str()).collect();
                assert_eq!(labels, ["simple", "piso", "custom"]);
                assert_eq!(default.inner(), "simple");
                assert_eq!(cases[2].generator.parameter_kind(), "set");
            }
            other => panic!("Expected selectable subset, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_selectable_subset() {
        let root = assert_parses_successfully("s = {{ a { } b { } }} b");
        assert_eq!(field(&root, "s").parameter_kind(), "selectablesubset");
    }
}

mod errors {
    use super::*;

    #[test]
    fn test_duplicate_field() {
        let diagnostic = parse_diagnostic("x = int 1\nx = int 2");
        assert_eq!(diagnostic.code(), Some(ErrorCode::E200));
        assert_eq!(diagnostic.labels().len(), 2);
        assert!(diagnostic.labels()[1].is_secondary());
    }

    #[test]
    fn test_duplicate_nested_field() {
        let diagnostic = parse_diagnostic("s = set { a = int 1 a = int 2 }");
        assert_eq!(diagnostic.code(), Some(ErrorCode::E200));
        assert!(diagnostic.message().contains("`a` in `s`"));
    }

    #[test]
    fn test_duplicate_case_and_item() {
        assert_error_code("v = {{ a { } a { } }} a", ErrorCode::E200);
        assert_error_code("s = selection (a b a) a", ErrorCode::E200);
    }

    #[test]
    fn test_unknown_variant_default() {
        assert_error_code(
            "v = selectablesubset {{ a { } b { } }} c",
            ErrorCode::E201,
        );
    }

    #[test]
    fn test_unknown_selection_default() {
        assert_error_code("s = selection (a b) c", ErrorCode::E202);
    }

    #[test]
    fn test_unknown_quantity_and_unit() {
        assert_error_code("d = dimensioned happiness 1 m", ErrorCode::E203);
        assert_error_code("d = dimensioned length 1 furlong", ErrorCode::E203);
    }

    #[test]
    fn test_negative_count() {
        assert_error_code("a = array [ int 0 ] * -1", ErrorCode::E204);
    }

    #[test]
    fn test_invalid_literals() {
        assert_error_code("d = date \"2024-13-01\"", ErrorCode::E205);
        assert_error_code("t = datetime \"noon\"", ErrorCode::E205);
        assert_error_code("m = matrix ((1 2) (3))", ErrorCode::E205);
    }

    #[test]
    fn test_case_must_be_set() {
        assert_error_code("v = selectablesubset {{ a int 1 }} a", ErrorCode::E206);
    }

    #[test]
    fn test_empty_selection() {
        assert_error_code("s = selection () a", ErrorCode::E207);
    }

    #[test]
    fn test_unknown_type() {
        let diagnostic = parse_diagnostic("x = integer 5");
        assert_eq!(diagnostic.code(), Some(ErrorCode::E102));
        assert!(diagnostic.help().is_some_and(|h| h.contains("int")));
    }

    #[test]
    fn test_generic_on_nested_set() {
        assert_error_code("s = set <B> { }", ErrorCode::E303);
    }

    #[test]
    fn test_syntax_errors() {
        assert_error_code("x = int \"five\"", ErrorCode::E100);
        assert_error_code("x int 5", ErrorCode::E100);
        assert_parse_fails("s = set { x = int 1");
        assert_parse_fails("a = array [ int 0 ] 3");
        assert_parse_fails("b = bool yes");
    }

    #[test]
    fn test_first_semantic_error_wins() {
        let diagnostic = parse_diagnostic("s = selection (a) b\nx = int 1\nx = int 2");
        assert_eq!(diagnostic.code(), Some(ErrorCode::E202));
    }
}
