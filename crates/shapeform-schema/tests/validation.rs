use pretty_assertions::assert_eq;
use serde_json::json;
use shapeform_schema::*;

fn signup_schema() -> SchemaNode {
    struct_schema([
        ("email", refine(string(), Check::pattern("^[^@]+@[^@]+$").unwrap()).title("an email address")),
        (
            "account",
            union([
                struct_schema([
                    ("type", literal("person")),
                    ("firstName", string()),
                ]),
                struct_schema([
                    ("type", literal("company")),
                    ("companyName", refine(string(), Check::NonEmpty)),
                    ("employees", optional(refine(number(), Check::Int))),
                ]),
            ]),
        ),
        ("tags", array(literals(["news", "offers"]))),
    ])
}

#[test]
fn valid_signup_passes() {
    let data = json!({
        "email": "ada@example.com",
        "account": { "type": "company", "companyName": "ACME", "employees": 12 },
        "tags": ["news"]
    });
    let output = validate(&signup_schema(), &data);
    assert!(output.is_valid, "{:?}", output.errors);
}

#[test]
fn errors_carry_paths_into_unions_and_arrays() {
    let data = json!({
        "email": "nope",
        "account": { "type": "company", "companyName": "", "employees": 1.5 },
        "tags": ["news", "spam"]
    });
    let output = validate(&signup_schema(), &data);
    let paths: Vec<String> = output
        .errors
        .iter()
        .map(|e| e.field_path().to_dot_path())
        .collect();
    assert_eq!(
        paths,
        vec![
            "email".to_string(),
            "account.companyName".to_string(),
            "account.employees".to_string(),
            "tags.1".to_string(),
        ]
    );
}

#[test]
fn decode_hands_back_the_value() {
    let data = json!({ "email": "a@b", "account": { "type": "person", "firstName": "Ada" }, "tags": [] });
    assert_eq!(decode(&signup_schema(), data.clone()).unwrap(), data);
}

#[test]
fn decode_error_lists_every_issue() {
    let err = decode(&signup_schema(), json!({})).unwrap_err();
    assert_eq!(err.issues.len(), 3);
    let text = err.to_string();
    assert!(text.contains("Missing required key 'email'"));
    assert!(text.contains("Missing required key 'tags'"));
}
