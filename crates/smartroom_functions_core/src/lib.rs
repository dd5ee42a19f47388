//! Handler contracts, path patterns and startup config for the SmartRoom functions.

pub mod config;
pub mod contract;
pub mod path_pattern;
pub mod registry;
