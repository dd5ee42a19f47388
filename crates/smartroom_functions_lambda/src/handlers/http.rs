use smartroom_functions_core::contract::{
    HttpRequest, HttpResponse, LogEntry, HELLO_LOG_MESSAGE, HELLO_RESPONSE_BODY,
};

use crate::adapters::log_sink::LogSink;

pub fn handle_hello_request(_request: &HttpRequest, log_sink: &dyn LogSink) -> HttpResponse {
    log_sink.emit(&LogEntry::info(HELLO_LOG_MESSAGE));
    HttpResponse::text(200, HELLO_RESPONSE_BODY)
}
