use serde::Serialize;

use crate::path_pattern::{PathPattern, PathPatternError};

pub const DUTY_ROSTER_PATTERN: &str = "dutyRoster/{rosterId}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FunctionName {
    #[serde(rename = "helloSmartRoom")]
    HelloSmartRoom,
    #[serde(rename = "migrateUserClaims")]
    MigrateUserClaims,
    #[serde(rename = "logDutyRosterUpdate")]
    LogDutyRosterUpdate,
}

impl FunctionName {
    pub const ALL: [FunctionName; 3] = [
        Self::HelloSmartRoom,
        Self::MigrateUserClaims,
        Self::LogDutyRosterUpdate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HelloSmartRoom => "helloSmartRoom",
            Self::MigrateUserClaims => "migrateUserClaims",
            Self::LogDutyRosterUpdate => "logDutyRosterUpdate",
        }
    }

    pub fn binary_name(self) -> &'static str {
        match self {
            Self::HelloSmartRoom => "hello_smartroom",
            Self::MigrateUserClaims => "migrate_user_claims",
            Self::LogDutyRosterUpdate => "log_duty_roster_update",
        }
    }

    pub fn trigger(self) -> TriggerKind {
        match self {
            Self::HelloSmartRoom => TriggerKind::Http,
            Self::MigrateUserClaims => TriggerKind::Callable,
            Self::LogDutyRosterUpdate => TriggerKind::DocumentCreated {
                pattern: DUTY_ROSTER_PATTERN,
            },
        }
    }

    pub fn http_path(self) -> Option<String> {
        match self.trigger() {
            TriggerKind::Http | TriggerKind::Callable => Some(format!("/{}", self.as_str())),
            TriggerKind::DocumentCreated { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerKind {
    Http,
    Callable,
    DocumentCreated { pattern: &'static str },
}

#[derive(Debug, Clone)]
pub struct DocumentRoute {
    pub function: FunctionName,
    pub pattern: PathPattern,
}

pub fn document_routes() -> Result<Vec<DocumentRoute>, PathPatternError> {
    let mut routes = Vec::new();
    for function in FunctionName::ALL {
        if let TriggerKind::DocumentCreated { pattern } = function.trigger() {
            routes.push(DocumentRoute {
                function,
                pattern: PathPattern::parse(pattern)?,
            });
        }
    }
    Ok(routes)
}

// `/` maps to the ping endpoint.
pub fn function_for_http_path(path: &str) -> Option<FunctionName> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return Some(FunctionName::HelloSmartRoom);
    }
    FunctionName::ALL
        .into_iter()
        .find(|function| function.http_path().as_deref() == Some(trimmed))
}
