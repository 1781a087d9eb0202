//! End-to-end scenarios driven through the public surface: tokenizer in,
//! problems out.
use jsonsieve::{validate_str, Locale, Problem, Schema, Tokenizer, ValidatingSource};
use serde_json::json;
use std::sync::Arc;
use test_case::test_case;

fn compiled(schema: &serde_json::Value) -> Arc<Schema> {
    Schema::compile(schema).expect("a valid schema")
}

fn problems(schema: &serde_json::Value, instance: &str) -> Vec<Problem> {
    validate_str(&compiled(schema), instance).expect("well-formed JSON")
}

#[test]
fn bounded_integer() {
    let schema = json!({"type": "integer", "minimum": 0, "maximum": 100});
    assert!(problems(&schema, "42").is_empty());

    let found = problems(&schema, "100.5");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].keyword(), "type");
}

#[test]
fn one_of_reports_both_branches() {
    let schema = json!({"oneOf": [{"type": "integer"}, {"multipleOf": 5}]});

    let found = problems(&schema, "10");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message_key(), "instance.problem.oneOf.many");
    assert_eq!(found[0].branches().len(), 2);

    let found = problems(&schema, "\"x\"");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message_key(), "instance.problem.oneOf.few");
    assert_eq!(found[0].branches().len(), 2);
}

#[test]
fn closed_object() {
    let schema = json!({
        "properties": {"a": {"type": "integer"}},
        "required": ["a"],
        "additionalProperties": false
    });

    let found = problems(&schema, r#"{"a": 1, "b": 2}"#);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].keyword(), "additionalProperties");
    assert_eq!(found[0].parameters()[0], ("name", json!("b")));

    let found = problems(&schema, "{}");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].keyword(), "required");

    let found = problems(&schema, r#"{"a": "x"}"#);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].keyword(), "type");
}

#[test]
fn dependency_lists_missing_and_dependant() {
    let schema = json!({"dependencies": {"a": ["b"]}});

    let found = problems(&schema, r#"{"a": 1}"#);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].parameters()[0], ("missing", json!(["b"])));
    assert_eq!(found[0].parameters()[1], ("dependant", json!("a")));

    assert!(problems(&schema, r#"{"a": 1, "b": 2}"#).is_empty());
    assert!(problems(&schema, r#"{"b": 2}"#).is_empty());
}

#[test]
fn conditional_routes_problems() {
    let schema = json!({
        "if": {"properties": {"t": {"const": "x"}}, "required": ["t"]},
        "then": {"required": ["x"]},
        "else": {"required": ["y"]}
    });

    let found = problems(&schema, r#"{"t": "x"}"#);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].parameters()[0], ("missing", json!(["x"])));

    let found = problems(&schema, r#"{"t": "z"}"#);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].parameters()[0], ("missing", json!(["y"])));
}

#[test]
fn email_format_in_strict_mode() {
    let schema = Schema::options()
        .strict_formats(true)
        .compile(&json!({"format": "email"}))
        .unwrap();
    assert!(validate_str(&schema, "\"a@b.c\"").unwrap().is_empty());
    assert_eq!(validate_str(&schema, "\"not-an-email\"").unwrap().len(), 1);

    // Strict mode rejects the unknown attribute at compile time; lax mode
    // accepts every string.
    assert!(Schema::options()
        .strict_formats(true)
        .compile(&json!({"format": "zzz"}))
        .is_err());
    let lax = compiled(&json!({"format": "zzz"}));
    assert!(validate_str(&lax, "\"anything at all\"").unwrap().is_empty());
}

#[test_case(json!({"const": 1}), "1.0"; "const one accepts one point zero")]
#[test_case(json!({"const": 1}), "1e0"; "const one accepts exponent form")]
#[test_case(json!({"multipleOf": 0.1}), "0.3"; "exact decimal remainder")]
fn numeric_canonicalisation(schema: serde_json::Value, instance: &str) {
    assert!(problems(&schema, instance).is_empty());
}

#[test]
fn string_length_counts_code_points() {
    // U+1F600 is one code point even though it needs two UTF-16 units.
    let schema = json!({"minLength": 2, "maxLength": 2});
    assert!(problems(&schema, "\"😀a\"").is_empty());
    assert_eq!(problems(&schema, "\"😀\"").len(), 1);
}

#[test]
fn all_of_problems_are_the_union() {
    let schema = json!({"allOf": [{"minimum": 10}, {"multipleOf": 2}]});
    let both = problems(&schema, "7");
    assert_eq!(both.len(), 2);
    assert_eq!(both[0].keyword(), "minimum");
    assert_eq!(both[1].keyword(), "multipleOf");
}

#[test]
fn negation_flips_problem_presence() {
    let cases = [
        (json!({"type": "integer"}), "5"),
        (json!({"type": "integer"}), "\"x\""),
        (json!({"oneOf": [{"type": "integer"}, {"multipleOf": 5}]}), "10"),
        (json!({"properties": {"a": {"type": "integer"}}}), r#"{"a": "x"}"#),
        (json!({"items": {"minimum": 3}}), "[4, 5]"),
    ];
    for (schema, instance) in &cases {
        let direct = problems(schema, instance);
        let negated = problems(&json!({ "not": schema }), instance);
        assert_eq!(
            direct.is_empty(),
            !negated.is_empty(),
            "negation invariant failed for {} against {}",
            schema,
            instance
        );
    }
}

#[test]
fn references_resolve_through_definitions() {
    let schema = json!({
        "definitions": {
            "positive": {"type": "integer", "minimum": 1}
        },
        "properties": {
            "count": {"$ref": "#/definitions/positive"}
        }
    });
    assert!(problems(&schema, r#"{"count": 3}"#).is_empty());
    assert_eq!(problems(&schema, r#"{"count": 0}"#).len(), 1);
}

#[test]
fn recursive_references() {
    let schema = json!({
        "definitions": {
            "node": {
                "type": "object",
                "properties": {
                    "value": {"type": "integer"},
                    "next": {"$ref": "#/definitions/node"}
                },
                "required": ["value"]
            }
        },
        "$ref": "#/definitions/node"
    });
    let nested = r#"{"value": 1, "next": {"value": 2, "next": {"value": 3}}}"#;
    assert!(problems(&schema, nested).is_empty());

    let broken = r#"{"value": 1, "next": {"next": {"value": 3}}}"#;
    let found = problems(&schema, broken);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].keyword(), "required");
}

#[test]
fn dangling_reference_fails_where_reached() {
    let schema = json!({"properties": {"a": {"$ref": "#/definitions/nowhere"}}});
    let compiled = compiled(&schema);
    // The reference is never exercised, so nothing fails.
    assert!(validate_str(&compiled, r#"{"b": 1}"#).unwrap().is_empty());
    // Reaching it emits a dereference problem.
    let found = validate_str(&compiled, r#"{"a": 1}"#).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].keyword(), "$ref");
    assert_eq!(found[0].message_key(), "instance.problem.ref");
}

#[test]
fn validating_source_is_transparent() {
    let text = r#"{"numbers": [1, 2.5, true], "s": "x"}"#;
    let schema = compiled(&json!({"properties": {"numbers": {"items": {"type": "number"}}}}));
    let mut plain = Tokenizer::new(text);
    let mut count = 0usize;
    let mut validating = ValidatingSource::new(schema, Tokenizer::new(text), |_| {});
    use jsonsieve::EventSource;
    loop {
        match (plain.next_event(), validating.next_event()) {
            (None, None) => break,
            (Some(Ok(expected)), Some(Ok(got))) => {
                count += 1;
                assert_eq!(expected.event, got.event);
                assert_eq!(expected.location, got.location);
            }
            _ => panic!("the validating source must forward every event"),
        }
    }
    assert!(count > 0);
    assert_eq!(validating.verdict(), Some(false));
}

#[test]
fn rendering_is_localized() {
    let found = problems(&json!({"maximum": 100}), "150");
    let en = found[0].message(Locale::En);
    assert_eq!(en, "the numeric value must be less than or equal to 100");
    let ja = found[0].message(Locale::Ja);
    assert_eq!(ja, "数値は100以下でなければいけません。");
    let lines = found[0].to_display_lines(Locale::En);
    assert!(lines[0].starts_with("[1,1] "));
}

#[test]
fn compound_problems_render_indented_branches() {
    let found = problems(&json!({"anyOf": [{"type": "integer"}, {"minLength": 5}]}), "\"abc\"");
    assert_eq!(found.len(), 1);
    let lines = found[0].to_display_lines(Locale::En);
    assert!(lines.len() > 3);
    assert!(lines[0].contains("at least one schema"));
    assert!(lines[1].trim_start().starts_with("1)"));
}

#[test]
fn deep_nesting_streams_through() {
    // properties > items > properties, several levels deep.
    let schema = json!({
        "properties": {
            "rows": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "cells": {"type": "array", "items": {"type": "integer"}}
                    },
                    "required": ["cells"]
                }
            }
        }
    });
    let good = r#"{"rows": [{"cells": [1, 2]}, {"cells": []}]}"#;
    assert!(problems(&schema, good).is_empty());

    let bad = r#"{"rows": [{"cells": [1, "x"]}, {"nope": 1}]}"#;
    let found = problems(&schema, bad);
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].keyword(), "type");
    assert_eq!(found[1].keyword(), "required");
}

#[test]
fn empty_schema_accepts_everything() {
    for instance in &["null", "true", "0", "\"x\"", "[]", "{}", "[{\"a\": [1]}]"] {
        assert!(problems(&json!({}), instance).is_empty());
        assert!(problems(&json!(true), instance).is_empty());
        assert_eq!(problems(&json!(false), instance).len(), 1);
    }
}
