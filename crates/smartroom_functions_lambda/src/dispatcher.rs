use smartroom_functions_core::contract::{
    CallResult, CallableError, CallableRequest, DocumentCreatedEvent, HttpRequest, HttpResponse,
};

use crate::adapters::log_sink::{LogSink, TracingLogSink};
use crate::handlers::callable::handle_migrate_user_claims;
use crate::handlers::http::handle_hello_request;
use crate::handlers::roster::handle_roster_created;

pub trait Dispatcher {
    fn handle_http(&self, request: &HttpRequest) -> HttpResponse;

    fn handle_call(&self, request: &CallableRequest) -> Result<CallResult, CallableError>;

    fn handle_create(&self, event: &DocumentCreatedEvent);
}

#[derive(Debug, Default, Clone)]
pub struct FunctionHandlers<S> {
    log_sink: S,
}

impl<S: LogSink> FunctionHandlers<S> {
    pub fn new(log_sink: S) -> Self {
        Self { log_sink }
    }

    pub fn log_sink(&self) -> &S {
        &self.log_sink
    }
}

impl FunctionHandlers<TracingLogSink> {
    pub fn with_tracing() -> Self {
        Self::new(TracingLogSink)
    }
}

impl<S: LogSink> Dispatcher for FunctionHandlers<S> {
    fn handle_http(&self, request: &HttpRequest) -> HttpResponse {
        handle_hello_request(request, &self.log_sink)
    }

    fn handle_call(&self, request: &CallableRequest) -> Result<CallResult, CallableError> {
        handle_migrate_user_claims(request)
    }

    fn handle_create(&self, event: &DocumentCreatedEvent) {
        handle_roster_created(event, &self.log_sink)
    }
}
