use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use shapeform_query::*;
use url::Url;

/// Records requests and answers from a fixed handler
#[derive(Clone)]
struct StubTransport {
    requests: Arc<Mutex<Vec<ApiRequest>>>,
    handler: Arc<dyn Fn(&ApiRequest) -> ApiResponse + Send + Sync>,
}

impl StubTransport {
    fn new(handler: impl Fn(&ApiRequest) -> ApiResponse + Send + Sync + 'static) -> Self {
        Self {
            requests: Arc::default(),
            handler: Arc::new(handler),
        }
    }

    fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last(&self) -> ApiRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

impl Transport for StubTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok((self.handler)(request))
    }
}

fn routes() -> ApiRoutes {
    ApiRoutes::new()
        .route("user", "user", HttpMethod::Get, "/users/:username")
        .route("user", "list", HttpMethod::Get, "/users")
        .route("user", "update", HttpMethod::Patch, "/users/{username}")
        .route("team", "list", HttpMethod::Get, "/teams")
}

fn client(transport: &StubTransport) -> QueryClient {
    let base = Url::parse("https://api.example.com/").unwrap();
    QueryClient::new(ApiClient::new(base, routes(), transport.clone()))
}

fn echo_path(request: &ApiRequest) -> ApiResponse {
    ApiResponse {
        status: 200,
        body: Some(json!({"path": request.url.path()})),
    }
}

fn user_params(name: &str) -> RequestParams {
    RequestParams::default().with_path("username", name)
}

#[test]
fn second_query_is_served_from_cache() {
    let transport = StubTransport::new(echo_path);
    let client = client(&transport);
    let options = QueryOptions::default();

    let first = client.query("user", "user", &user_params("test"), &options).unwrap();
    let second = client.query("user", "user", &user_params("test"), &options).unwrap();
    assert_eq!(first, json!({"path": "/users/test"}));
    assert_eq!(first, second);
    assert_eq!(transport.count(), 1);

    let key = QueryKey::new("user", "user", json!({"path": {"username": "test"}}), &options);
    assert_eq!(client.get_query_data(&key), Some(first));

    client.query("user", "user", &user_params("other"), &options).unwrap();
    assert_eq!(transport.count(), 2);
}

#[test]
fn no_cache_always_hits_transport() {
    let transport = StubTransport::new(echo_path);
    let client = client(&transport);
    let options = QueryOptions {
        include_credentials: false,
        no_cache: true,
    };

    client.query("user", "list", &RequestParams::default(), &options).unwrap();
    client.query("user", "list", &RequestParams::default(), &options).unwrap();
    assert_eq!(transport.count(), 2);
    assert_eq!(
        transport.last().headers.get(NO_CACHE_HEADER).map(String::as_str),
        Some("true")
    );

    let key = QueryKey::new("user", "list", json!({}), &options);
    assert_eq!(client.get_query_data(&key), None);
}

#[test]
fn invalidation_by_section_and_method() {
    let transport = StubTransport::new(echo_path);
    let client = client(&transport);
    let options = QueryOptions::default();

    client.query("user", "user", &user_params("a"), &options).unwrap();
    client.query("user", "list", &RequestParams::default(), &options).unwrap();
    client.query("team", "list", &RequestParams::default(), &options).unwrap();

    assert_eq!(client.invalidate("user", Some("list")), 1);
    assert_eq!(client.invalidate("user", None), 1);
    assert_eq!(client.invalidate("user", None), 0);

    client.query("team", "list", &RequestParams::default(), &options).unwrap();
    assert_eq!(transport.count(), 3);
}

#[test]
fn mutation_is_not_cached_and_invalidates() {
    let transport = StubTransport::new(|request| ApiResponse {
        status: 200,
        body: request.body.clone(),
    });
    let client = client(&transport);

    client.query("user", "user", &user_params("a"), &QueryOptions::default()).unwrap();
    let params = user_params("a").with_payload(json!({"name": "A"}));
    let options = MutateOptions {
        include_credentials: true,
        invalidate: vec!["user".into()],
    };
    assert_eq!(client.mutate("user", "update", &params, &options).unwrap(), json!({"name": "A"}));
    assert_eq!(client.mutate("user", "update", &params, &options).unwrap(), json!({"name": "A"}));
    assert_eq!(transport.count(), 3);

    let request = transport.last();
    assert_eq!(request.method, HttpMethod::Patch);
    assert_eq!(request.credentials, CredentialsMode::Include);

    client.query("user", "user", &user_params("a"), &QueryOptions::default()).unwrap();
    assert_eq!(transport.count(), 4);
}

#[test]
fn failed_call_is_normalised_and_not_cached() {
    let transport = StubTransport::new(|_| ApiResponse {
        status: 422,
        body: Some(json!({
            "message": "Invalid user",
            "issues": [{"path": ["profile", "email"], "message": "Invalid email"}]
        })),
    });
    let client = client(&transport);
    let options = QueryOptions::default();

    let error = client.query("user", "user", &user_params("a"), &options).unwrap_err();
    assert_eq!(error.tag, "ValidationError");
    assert_eq!(error.status, Some(422));
    assert_eq!(error.validation_errors["profile.email"], "Invalid email");

    client.query("user", "user", &user_params("a"), &options).unwrap_err();
    assert_eq!(transport.count(), 2);
}

#[test]
fn unknown_route_never_reaches_transport() {
    let transport = StubTransport::new(echo_path);
    let client = client(&transport);
    let error = client
        .query("billing", "list", &RequestParams::default(), &QueryOptions::default())
        .unwrap_err();
    assert_eq!(error.tag, "UnknownRoute");
    assert_eq!(transport.count(), 0);
}

struct GetUser;

#[derive(Serialize)]
struct GetUserParams {
    path: Value,
}

#[derive(Debug, PartialEq, Deserialize)]
struct User {
    path: String,
}

impl Endpoint for GetUser {
    const SECTION: &'static str = "user";
    const METHOD: &'static str = "user";
    type Params = GetUserParams;
    type Output = User;
}

#[test]
fn typed_endpoint_shares_the_untyped_cache() {
    let transport = StubTransport::new(echo_path);
    let client = client(&transport);
    let params = GetUserParams {
        path: json!({"username": "test"}),
    };

    let user = client.query_endpoint::<GetUser>(&params, &QueryOptions::default()).unwrap();
    assert_eq!(
        user,
        User {
            path: "/users/test".into()
        }
    );
    client
        .query("user", "user", &user_params("test"), &QueryOptions::default())
        .unwrap();
    assert_eq!(transport.count(), 1);
}

#[test]
fn set_query_data_seeds_the_cache() {
    let transport = StubTransport::new(echo_path);
    let client = client(&transport);
    let key = QueryKey::new(
        "user",
        "user",
        json!({"path": {"username": "seeded"}}),
        &QueryOptions::default(),
    );
    client.set_query_data(key, json!({"path": "seeded"}));
    assert_eq!(
        client
            .query("user", "user", &user_params("seeded"), &QueryOptions::default())
            .unwrap(),
        json!({"path": "seeded"})
    );
    assert_eq!(transport.count(), 0);
}
