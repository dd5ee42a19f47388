use std::collections::BTreeMap;

use serde_json::{json, Value};
use smartroom_functions_core::contract::{
    CallResult, CallableError, CallableRequest, DocumentCreatedEvent, HttpRequest, HttpResponse,
    IdentityAssertion, DOCUMENT_CREATED_EVENT_TYPE,
};
use smartroom_functions_core::path_pattern::PathPatternError;
use smartroom_functions_core::registry::{
    document_routes, function_for_http_path, DocumentRoute, FunctionName,
};
use thiserror::Error;

use crate::dispatcher::Dispatcher;

const AUTH_CONTEXT_SUFFIX: &str = ".withAuthContext";

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("event payload must be a JSON object")]
    NotAnObject,
    #[error("unsupported event shape")]
    UnsupportedEvent,
    #[error("expected a {expected} event")]
    WrongTrigger { expected: &'static str },
    #[error("malformed {kind} event: {message}")]
    MalformedEvent { kind: &'static str, message: String },
    #[error("document '{document}' does not match any watched path")]
    UnwatchedDocument { document: String },
    #[error("invalid registered path pattern: {0}")]
    Registry(#[from] PathPatternError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Http,
    Callable,
    DocumentCreated,
}

impl EventKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Callable => "callable",
            Self::DocumentCreated => "document_created",
        }
    }
}

pub fn classify_event(event: &Value) -> Result<EventKind, RouteError> {
    let Some(object) = event.as_object() else {
        return Err(RouteError::NotAnObject);
    };

    if object
        .get("type")
        .and_then(Value::as_str)
        .map(is_document_created_type)
        .unwrap_or(false)
    {
        return Ok(EventKind::DocumentCreated);
    }

    if object.contains_key("requestContext") || object.contains_key("httpMethod") {
        return Ok(EventKind::Http);
    }

    if object.contains_key("data") {
        return Ok(EventKind::Callable);
    }

    Err(RouteError::UnsupportedEvent)
}

fn is_document_created_type(event_type: &str) -> bool {
    match event_type.strip_prefix(DOCUMENT_CREATED_EVENT_TYPE) {
        Some(suffix) => suffix.is_empty() || suffix == AUTH_CONTEXT_SUFFIX,
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayRequest {
    pub request: HttpRequest,
    pub identity: Option<IdentityAssertion>,
    pub body_is_base64: bool,
}

pub fn decode_gateway_event(event: &Value) -> Result<GatewayRequest, RouteError> {
    let Some(object) = event.as_object() else {
        return Err(RouteError::NotAnObject);
    };
    let request_context = object.get("requestContext");

    let method = object
        .get("httpMethod")
        .and_then(Value::as_str)
        .or_else(|| {
            request_context
                .and_then(|context| context.pointer("/http/method"))
                .and_then(Value::as_str)
        })
        .unwrap_or_default()
        .to_ascii_uppercase();

    let path = object
        .get("rawPath")
        .or_else(|| object.get("path"))
        .and_then(Value::as_str)
        .unwrap_or("/")
        .to_string();

    let headers = object
        .get("headers")
        .and_then(Value::as_object)
        .map(|headers| {
            headers
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .as_str()
                        .map(|value| (name.to_ascii_lowercase(), value.to_string()))
                })
                .collect::<BTreeMap<_, _>>()
        })
        .unwrap_or_default();

    let body = match object.get("body") {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => {
            return Err(RouteError::MalformedEvent {
                kind: EventKind::Http.as_str(),
                message: "body must be a string".to_string(),
            });
        }
    };

    let body_is_base64 = object
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Ok(GatewayRequest {
        request: HttpRequest {
            method,
            path,
            headers,
            body,
        },
        identity: request_context.and_then(identity_from_authorizer),
        body_is_base64,
    })
}

// JWT authorizer (HTTP API) or Cognito authorizer (REST API).
fn identity_from_authorizer(request_context: &Value) -> Option<IdentityAssertion> {
    let claims = request_context
        .pointer("/authorizer/jwt/claims")
        .or_else(|| request_context.pointer("/authorizer/claims"))
        .and_then(Value::as_object)?;

    let uid = claims.get("sub").and_then(Value::as_str)?.trim();
    if uid.is_empty() {
        return None;
    }

    Some(IdentityAssertion {
        uid: uid.to_string(),
        token: claims.clone(),
    })
}

pub fn decode_callable_http(gateway: &GatewayRequest) -> Result<CallableRequest, CallableError> {
    if gateway.request.method != "POST" {
        return Err(CallableError::invalid_argument(
            "Callable functions only accept POST requests",
        ));
    }

    if gateway.body_is_base64 {
        return Err(CallableError::invalid_argument(
            "Request body must be JSON text",
        ));
    }

    let body = gateway.request.body.as_deref().unwrap_or_default();
    let payload: Value = serde_json::from_str(body)
        .map_err(|error| CallableError::invalid_argument(format!("Malformed JSON body: {error}")))?;

    let Some(data) = payload.as_object().and_then(|object| object.get("data")) else {
        return Err(CallableError::invalid_argument(
            "Request body must be a JSON object with a 'data' field",
        ));
    };

    Ok(CallableRequest {
        data: data.clone(),
        auth: gateway.identity.clone(),
    })
}

pub fn callable_http_response(outcome: Result<CallResult, CallableError>) -> HttpResponse {
    match outcome {
        Ok(result) => HttpResponse::json(200, &result.envelope()),
        Err(error) => HttpResponse::json(error.http_status(), &error.envelope()),
    }
}

fn not_found_response(path: &str) -> HttpResponse {
    HttpResponse::json(
        404,
        &json!({
            "error": "not_found",
            "message": format!("No function is served at '{path}'"),
        }),
    )
}

fn to_json<T: serde::Serialize>(value: &T, kind: EventKind) -> Result<Value, RouteError> {
    serde_json::to_value(value).map_err(|error| RouteError::MalformedEvent {
        kind: kind.as_str(),
        message: format!("failed to serialize response: {error}"),
    })
}

pub struct Router<D> {
    dispatcher: D,
    document_routes: Vec<DocumentRoute>,
}

impl<D: Dispatcher> Router<D> {
    pub fn new(dispatcher: D) -> Result<Self, RouteError> {
        Ok(Self {
            dispatcher,
            document_routes: document_routes()?,
        })
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn route(&self, event: Value) -> Result<Value, RouteError> {
        let kind = classify_event(&event)?;
        tracing::debug!(kind = kind.as_str(), "routing event");

        match kind {
            EventKind::DocumentCreated => {
                let function = self.serve_document(event)?;
                Ok(json!({ "status": "ok", "function": function.as_str() }))
            }
            EventKind::Http => {
                let gateway = decode_gateway_event(&event)?;
                let response = match function_for_http_path(&gateway.request.path) {
                    Some(FunctionName::HelloSmartRoom) => {
                        self.dispatcher.handle_http(&gateway.request)
                    }
                    Some(FunctionName::MigrateUserClaims) => self.callable_over_http(&gateway),
                    Some(FunctionName::LogDutyRosterUpdate) | None => {
                        not_found_response(&gateway.request.path)
                    }
                };
                to_json(&response, kind)
            }
            EventKind::Callable => Ok(self.serve_direct_callable(event)),
        }
    }

    // An undecodable event is answered like an empty request.
    pub fn serve_http(&self, event: &Value) -> HttpResponse {
        let request = decode_gateway_event(event)
            .map(|gateway| gateway.request)
            .unwrap_or_default();
        self.dispatcher.handle_http(&request)
    }

    pub fn serve_callable(&self, event: Value) -> Result<Value, RouteError> {
        match classify_event(&event) {
            Ok(EventKind::Http) => {
                let gateway = decode_gateway_event(&event)?;
                to_json(&self.callable_over_http(&gateway), EventKind::Http)
            }
            // `data` is optional on a direct call, so any other object is a callable.
            Ok(EventKind::Callable) | Err(RouteError::UnsupportedEvent) => {
                Ok(self.serve_direct_callable(event))
            }
            Ok(EventKind::DocumentCreated) => Err(RouteError::WrongTrigger {
                expected: EventKind::Callable.as_str(),
            }),
            Err(error) => Err(error),
        }
    }

    pub fn serve_document(&self, event: Value) -> Result<FunctionName, RouteError> {
        let mut created: DocumentCreatedEvent =
            serde_json::from_value(event).map_err(|error| RouteError::MalformedEvent {
                kind: EventKind::DocumentCreated.as_str(),
                message: error.to_string(),
            })?;

        if !is_document_created_type(&created.event_type) {
            return Err(RouteError::WrongTrigger {
                expected: EventKind::DocumentCreated.as_str(),
            });
        }

        let Some((route, params)) = self.document_routes.iter().find_map(|route| {
            route
                .pattern
                .matches(&created.document)
                .map(|params| (route, params))
        }) else {
            return Err(RouteError::UnwatchedDocument {
                document: created.document,
            });
        };

        created.params.extend(params);

        tracing::debug!(
            function = route.function.as_str(),
            event_id = %created.id,
            document = %created.document,
            "dispatching creation trigger"
        );
        self.dispatcher.handle_create(&created);
        Ok(route.function)
    }

    fn callable_over_http(&self, gateway: &GatewayRequest) -> HttpResponse {
        let outcome = decode_callable_http(gateway)
            .and_then(|request| self.dispatcher.handle_call(&request));
        callable_http_response(outcome)
    }

    fn serve_direct_callable(&self, event: Value) -> Value {
        let outcome = serde_json::from_value::<CallableRequest>(event)
            .map_err(|error| {
                CallableError::invalid_argument(format!("Malformed callable request: {error}"))
            })
            .and_then(|request| self.dispatcher.handle_call(&request));

        match outcome {
            Ok(result) => result.envelope(),
            Err(error) => error.envelope(),
        }
    }
}
