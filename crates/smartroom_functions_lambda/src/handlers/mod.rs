pub mod callable;
pub mod http;
pub mod roster;
