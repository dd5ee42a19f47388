use serde::Serialize;
use thiserror::Error;

pub const MAX_INSTANCES_ENV: &str = "SMARTROOM_MAX_INSTANCES";
pub const DEFAULT_MAX_INSTANCES: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got '{value}'")]
    InvalidMaxInstances { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionsConfig {
    pub max_instances: u32,
}

impl Default for FunctionsConfig {
    fn default() -> Self {
        Self {
            max_instances: DEFAULT_MAX_INSTANCES,
        }
    }
}

impl FunctionsConfig {
    pub fn new(max_instances: u32) -> Result<Self, ConfigError> {
        if max_instances == 0 {
            return Err(ConfigError::InvalidMaxInstances {
                key: MAX_INSTANCES_ENV,
                value: max_instances.to_string(),
            });
        }
        Ok(Self { max_instances })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let Some(raw) = lookup(MAX_INSTANCES_ENV) else {
            return Ok(Self::default());
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        let max_instances =
            trimmed
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidMaxInstances {
                    key: MAX_INSTANCES_ENV,
                    value: raw.clone(),
                })?;
        Self::new(max_instances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset_or_blank() {
        assert_eq!(
            FunctionsConfig::from_lookup(|_| None),
            Ok(FunctionsConfig { max_instances: 10 })
        );
        assert_eq!(
            FunctionsConfig::from_lookup(|_| Some("  ".to_string())),
            Ok(FunctionsConfig::default())
        );
    }

    #[test]
    fn reads_positive_limit() {
        let config = FunctionsConfig::from_lookup(|key| {
            (key == MAX_INSTANCES_ENV).then(|| " 25 ".to_string())
        })
        .expect("limit should parse");
        assert_eq!(config.max_instances, 25);
    }

    #[test]
    fn rejects_zero_and_garbage() {
        let zero = FunctionsConfig::from_lookup(|_| Some("0".to_string()))
            .expect_err("zero should be rejected");
        assert_eq!(
            zero.to_string(),
            "SMARTROOM_MAX_INSTANCES must be a positive integer, got '0'"
        );

        let garbage = FunctionsConfig::from_lookup(|_| Some("ten".to_string()))
            .expect_err("non-numeric should be rejected");
        assert!(matches!(
            garbage,
            ConfigError::InvalidMaxInstances { ref value, .. } if value == "ten"
        ));
    }

    #[test]
    fn serializes_as_manifest_field() {
        let value =
            serde_json::to_value(FunctionsConfig::default()).expect("config should serialize");
        assert_eq!(value, serde_json::json!({"maxInstances": 10}));
    }
}
