//! Lambda handlers and adapters for the SmartRoom functions.

pub mod adapters;
pub mod dispatcher;
pub mod handlers;
pub mod router;
pub mod telemetry;
