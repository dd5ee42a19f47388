use serde_json::{json, Value};
use smartroom_functions_lambda::adapters::log_sink::MemoryLogSink;
use smartroom_functions_lambda::dispatcher::FunctionHandlers;
use smartroom_functions_lambda::router::{RouteError, Router};

fn router() -> Router<FunctionHandlers<MemoryLogSink>> {
    Router::new(FunctionHandlers::new(MemoryLogSink::new())).expect("router should build")
}

fn http_event(method: &str, path: &str, body: Option<&str>, sub: Option<&str>) -> Value {
    let mut request_context = json!({ "http": { "method": method } });
    if let Some(sub) = sub {
        request_context["authorizer"] = json!({ "jwt": { "claims": { "sub": sub } } });
    }
    json!({
        "version": "2.0",
        "rawPath": path,
        "headers": { "Content-Type": "application/json" },
        "body": body,
        "isBase64Encoded": false,
        "requestContext": request_context,
    })
}

fn created_event(document: &str, data: Value) -> Value {
    json!({
        "specversion": "1.0",
        "id": "evt-1",
        "source": "//firestore.googleapis.com/projects/smartroom/databases/(default)",
        "type": "google.cloud.firestore.document.v1.created",
        "document": document,
        "data": data,
    })
}

fn response_body(value: &Value) -> Value {
    let body = value["body"].as_str().expect("body should be a string");
    serde_json::from_str(body).expect("body should be JSON")
}

#[test]
fn ping_returns_fixed_body_for_any_method_and_payload() {
    let router = router();
    for (method, body) in [("GET", None), ("POST", Some("{\"x\":1}")), ("PUT", Some("raw"))] {
        let value = router
            .route(http_event(method, "/helloSmartRoom", body, None))
            .expect("ping should route");
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["body"], "SmartRoom Backend is Working!");
    }
    assert_eq!(router.dispatcher().log_sink().entries().len(), 3);
}

#[test]
fn ping_is_idempotent() {
    let router = router();
    let event = http_event("GET", "/", None, None);
    let first = router.route(event.clone()).expect("first call should route");
    let second = router.route(event).expect("second call should route");
    assert_eq!(first, second);
}

#[test]
fn anonymous_callable_over_http_is_unauthenticated() {
    let router = router();
    let value = router
        .route(http_event("POST", "/migrateUserClaims", Some("{\"data\":{}}"), None))
        .expect("callable should route");

    assert_eq!(value["statusCode"], 401);
    assert_eq!(
        response_body(&value),
        json!({
            "error": {
                "status": "UNAUTHENTICATED",
                "message": "Only authenticated users can migrate claims"
            }
        })
    );
}

#[test]
fn authenticated_callable_over_http_reports_acceptance() {
    let router = router();
    let value = router
        .route(http_event(
            "POST",
            "/migrateUserClaims",
            Some("{\"data\":{\"dryRun\":true}}"),
            Some("user-17"),
        ))
        .expect("callable should route");

    assert_eq!(value["statusCode"], 200);
    assert_eq!(
        response_body(&value),
        json!({"result": {"success": true, "message": "Claims migration started"}})
    );
}

#[test]
fn callable_over_http_rejects_get_and_missing_data() {
    let router = router();

    let get = router
        .route(http_event("GET", "/migrateUserClaims", None, Some("user-1")))
        .expect("callable should route");
    assert_eq!(get["statusCode"], 400);
    assert_eq!(response_body(&get)["error"]["status"], "INVALID_ARGUMENT");

    let no_data = router
        .route(http_event("POST", "/migrateUserClaims", Some("{}"), Some("user-1")))
        .expect("callable should route");
    assert_eq!(no_data["statusCode"], 400);
}

#[test]
fn direct_callable_invocation_returns_envelopes() {
    let router = router();

    let anonymous = router
        .route(json!({"data": {}}))
        .expect("direct call should route");
    assert_eq!(anonymous["error"]["status"], "UNAUTHENTICATED");

    let authenticated = router
        .route(json!({"data": {}, "auth": {"uid": "user-3", "token": {"admin": true}}}))
        .expect("direct call should route");
    assert_eq!(authenticated["result"]["success"], true);
    assert_eq!(authenticated["result"]["message"], "Claims migration started");
}

#[test]
fn roster_creation_logs_one_structured_entry() {
    let router = router();
    let value = router
        .route(created_event(
            "dutyRoster/r-101",
            json!({"roomNumber": "101", "hostelName": "Elm", "taskRotation": "weekly"}),
        ))
        .expect("creation event should route");
    assert_eq!(value, json!({"status": "ok", "function": "logDutyRosterUpdate"}));

    let entries = router.dispatcher().log_sink().entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].message.contains("101"));
    assert_eq!(
        Value::Object(entries[0].fields.clone()),
        json!({"hostel": "Elm", "rotation": "weekly"})
    );
}

#[test]
fn roster_creation_without_room_number_still_logs() {
    let router = router();
    router
        .route(created_event(
            "dutyRoster/r-2",
            json!({"hostelName": "Oak", "taskRotation": "daily"}),
        ))
        .expect("creation event should route");

    let entries = router.dispatcher().log_sink().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "New duty roster created for room: <absent>");
    assert_eq!(
        Value::Object(entries[0].fields.clone()),
        json!({"hostel": "Oak", "rotation": "daily"})
    );
}

#[test]
fn creation_on_unwatched_collection_is_rejected_without_logging() {
    let router = router();
    let error = router
        .route(created_event("rooms/r-1", json!({"roomNumber": "1"})))
        .expect_err("unwatched document should fail");

    assert!(matches!(error, RouteError::UnwatchedDocument { ref document } if document == "rooms/r-1"));
    assert!(router.dispatcher().log_sink().entries().is_empty());
}

#[test]
fn unknown_shapes_are_routing_errors() {
    let router = router();
    let error = router
        .route(json!({"Records": []}))
        .expect_err("unknown shape should fail");
    assert_eq!(error.to_string(), "unsupported event shape");
}
