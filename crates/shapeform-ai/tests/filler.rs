use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use shapeform_ai::*;
use shapeform_form::{FormFields, extract_schema_fields};
use shapeform_schema::*;

/// Answers every request with a fixed result and records the requests
#[derive(Clone)]
struct StubProvider {
    answer: Arc<dyn Fn() -> Result<Value, ProviderError> + Send + Sync>,
    requests: Arc<Mutex<Vec<StructuredRequest>>>,
}

impl StubProvider {
    fn returning(value: Value) -> Self {
        Self {
            answer: Arc::new(move || Ok(value.clone())),
            requests: Arc::default(),
        }
    }

    fn failing() -> Self {
        Self {
            answer: Arc::new(|| Err(ProviderError::InvalidResponse("boom".into()))),
            requests: Arc::default(),
        }
    }
}

impl TextGenerationProvider for StubProvider {
    fn generate_object(&self, request: &StructuredRequest) -> Result<Value, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.answer)()
    }
}

fn project_fields() -> FormFields {
    extract_schema_fields(&struct_schema([
        ("projectName", string()),
        ("projectType", literals(["web", "mobile", "desktop", "cli"])),
        ("teamSize", number()),
    ]))
}

#[test]
fn fills_a_complete_project() {
    let provider = StubProvider::returning(json!({
        "projectName": "TestApp",
        "projectType": "mobile",
        "teamSize": 5
    }));
    let filler = AiFormFiller::new(provider.clone());
    let request = AiFormFillerRequest::new(
        "Project name: TestApp. Project type: mobile. Team size: 5.",
        project_fields(),
    );

    let response = filler.fill(&request).unwrap();
    assert_eq!(
        response.filled,
        json!({"projectName": "TestApp", "projectType": "mobile", "teamSize": 5})
    );
    assert_eq!(response.missing, Vec::<String>::new());
    assert!(response.clarifications.is_empty());
    assert!(response.complete);
    assert_eq!(
        response.summary,
        "Filled 3 fields: Project Name, Project Type, Team Size. All required fields are complete."
    );

    let sent = provider.requests.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].system, SYSTEM_PROMPT);
    assert!(sent[0].prompt.ends_with(
        "User input:\nProject name: TestApp. Project type: mobile. Team size: 5.\n\n\
         Return the complete form data. Keep every value from the current data that the \
         user did not change."
    ));
    let schema = serde_json::to_value(&sent[0].schema).unwrap();
    assert_eq!(schema["required"], json!(["projectName", "projectType", "teamSize"]));
}

#[test]
fn partial_answers_keep_previous_data_and_ask_for_the_rest() {
    let provider = StubProvider::returning(json!({
        "projectName": null,
        "projectType": null,
        "teamSize": 3
    }));
    let filler = AiFormFiller::new(provider);
    let request = AiFormFillerRequest::new("Three people", project_fields())
        .with_partial_data(json!({"projectName": "Existing"}));

    let response = filler.fill(&request).unwrap();
    assert_eq!(response.filled, json!({"projectName": "Existing", "teamSize": 3}));
    assert_eq!(response.missing, vec!["Project Type"]);
    assert!(!response.complete);
    assert_eq!(response.clarifications.len(), 1);
    let clarification = &response.clarifications[0];
    assert_eq!(clarification.field, "projectType");
    assert_eq!(
        clarification.options,
        Some(vec![json!("web"), json!("mobile"), json!("desktop"), json!("cli")])
    );
}

#[test]
fn nested_required_fields_are_detected() {
    let fields = extract_schema_fields(&struct_schema([
        ("projectName", string()),
        ("marketing", struct_schema([("productName", string()), ("slogan", optional(string()))])),
        ("sponsor", optional(struct_schema([("company", string())]))),
    ]));

    assert_eq!(
        detect_missing_fields(&fields, &json!({"projectName": "A", "marketing": {}})),
        vec!["marketing.productName"]
    );
    assert_eq!(
        detect_missing_fields(
            &fields,
            &json!({"projectName": "A", "marketing": {"productName": ""}})
        ),
        vec!["marketing.productName"]
    );
    assert_eq!(
        detect_missing_fields(
            &fields,
            &json!({"projectName": "A", "marketing": {"productName": "P"}})
        ),
        Vec::<String>::new()
    );
    assert_eq!(
        detect_missing_fields(
            &fields,
            &json!({"projectName": "A", "marketing": {"productName": "P"}, "sponsor": {}})
        ),
        vec!["sponsor.company"]
    );
    assert_eq!(
        detect_missing_fields(&fields, &json!({"projectName": null})),
        vec!["projectName", "marketing.productName"]
    );
}

#[test]
fn conditional_and_required_when_fields() {
    let fields = extract_schema_fields(&struct_schema([
        ("kind", literals(["person", "company"])),
        (
            "companyName",
            optional(string()).required_when(RequiredWhen::equals("kind", "company")),
        ),
        (
            "contact",
            union([
                struct_schema([("variant", literal("email")), ("address", string())]),
                struct_schema([("variant", literal("phone")), ("number", string())]),
            ]),
        ),
    ]));

    let data = json!({"kind": "person", "contact": {"variant": "phone"}});
    assert_eq!(detect_missing_fields(&fields, &data), vec!["contact.number"]);

    let data = json!({"kind": "company", "contact": {"variant": "email", "address": "a@b.c"}});
    assert_eq!(detect_missing_fields(&fields, &data), vec!["companyName"]);
}

#[test]
fn stream_yields_values_then_clarifications_then_done() {
    let filler = AiFormFiller::new(StubProvider::returning(json!({"projectName": "X"})));
    let chunks: Vec<FillChunk> = filler
        .fill_stream(&AiFormFillerRequest::new("X", project_fields()))
        .collect();

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].filled, Some(json!({"projectName": "X"})));
    assert!(!chunks[0].done);
    assert_eq!(
        chunks[1]
            .clarifications
            .as_ref()
            .map(|c| c.iter().map(|c| c.field.as_str()).collect::<Vec<_>>()),
        Some(vec!["projectType", "teamSize"])
    );
    assert_eq!(
        chunks[2],
        FillChunk {
            complete: Some(false),
            done: true,
            ..FillChunk::default()
        }
    );
}

#[test]
fn stream_without_clarifications_has_two_chunks() {
    let filler = AiFormFiller::new(StubProvider::returning(json!({
        "projectName": "TestApp",
        "projectType": "web",
        "teamSize": 2
    })));
    let chunks: Vec<FillChunk> = filler
        .fill_stream(&AiFormFillerRequest::new("all of it", project_fields()))
        .collect();
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[1].complete, Some(true));
    assert!(chunks[1].done);
}

#[test]
fn failures_surface_from_fill_but_not_from_stream() {
    let filler = AiFormFiller::new(StubProvider::failing());
    let request = AiFormFillerRequest::new("anything", project_fields());

    assert!(matches!(
        filler.fill(&request),
        Err(FillerError::Provider(ProviderError::InvalidResponse(_)))
    ));
    let chunks: Vec<FillChunk> = filler.fill_stream(&request).collect();
    assert_eq!(
        chunks,
        vec![FillChunk {
            complete: Some(false),
            done: true,
            ..FillChunk::default()
        }]
    );
}

#[test]
fn non_object_output_is_rejected() {
    let filler = AiFormFiller::new(StubProvider::returning(json!(["not", "an", "object"])));
    let result = filler.fill(&AiFormFillerRequest::new("x", project_fields()));
    assert!(matches!(result, Err(FillerError::UnexpectedOutput(_))));
}

#[test]
fn missing_api_key_fails_before_any_call() {
    let result = AiFormFiller::from_config(&AiConfig::default());
    assert!(matches!(result, Err(FillerError::MissingApiKey)));
}

#[test]
fn request_round_trips_through_json() {
    let request = AiFormFillerRequest::new("hello", project_fields())
        .with_messages(vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")])
        .with_partial_data(json!({"teamSize": 1}));
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["partialData"], json!({"teamSize": 1}));
    assert_eq!(json["messages"][1], json!({"role": "assistant", "content": "hello"}));
    let parsed: AiFormFillerRequest = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, request);
}
