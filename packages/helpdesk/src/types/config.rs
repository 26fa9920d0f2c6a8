//! Configuration types for the help desk pipeline.

use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::types::escalation::Urgency;

/// Tunables for request processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum number of knowledge items returned per request
    pub top_k: usize,

    /// Minimum relevance for a knowledge item to be returned (0.0-1.0)
    pub similarity_threshold: f32,

    /// Deadline for the classification call
    #[serde(with = "duration_secs")]
    pub classification_timeout: Duration,

    /// Deadline for the response generation call
    #[serde(with = "duration_secs")]
    pub generation_timeout: Duration,

    /// Escalation rules
    pub escalation: EscalationPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            similarity_threshold: 0.5,
            classification_timeout: Duration::from_secs(20),
            generation_timeout: Duration::from_secs(60),
            escalation: EscalationPolicy::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_classification_timeout(mut self, timeout: Duration) -> Self {
        self.classification_timeout = timeout;
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn with_escalation(mut self, policy: EscalationPolicy) -> Self {
        self.escalation = policy;
        self
    }

    /// Reject settings that would make the pipeline misbehave.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.top_k == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "top_k",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::InvalidSetting {
                name: "similarity_threshold",
                reason: format!("{} is outside [0, 1]", self.similarity_threshold),
            });
        }
        if self.classification_timeout.is_zero() {
            return Err(ConfigError::InvalidSetting {
                name: "classification_timeout",
                reason: "must be positive".to_string(),
            });
        }
        if self.generation_timeout.is_zero() {
            return Err(ConfigError::InvalidSetting {
                name: "generation_timeout",
                reason: "must be positive".to_string(),
            });
        }
        self.escalation.validate()
    }
}

/// Escalation rule data.
///
/// Category-specific rules (auto-escalation, trigger phrases, contacts) live
/// on [`CategoryDefinition`](crate::CategoryDefinition); this holds the
/// global ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationPolicy {
    /// Keywords that escalate regardless of category, with their urgency
    pub urgent_keywords: IndexMap<String, Urgency>,

    /// Phrases that mark a trigger-phrase escalation as critical
    pub critical_indicators: Vec<String>,

    /// Phrases that mark a trigger-phrase escalation as high
    pub high_indicators: Vec<String>,

    /// Phrases that mark a trigger-phrase escalation as medium
    pub medium_indicators: Vec<String>,

    /// Classifications below this confidence go to a human
    pub low_confidence_threshold: f32,

    /// Contact used when the category has none, and for low confidence
    pub default_contact: String,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        let urgent_keywords = [
            ("urgent", Urgency::High),
            ("emergency", Urgency::Critical),
            ("critical", Urgency::Critical),
            ("down", Urgency::High),
            ("broken", Urgency::High),
            ("not working", Urgency::High),
            ("can't work", Urgency::High),
            ("production", Urgency::Critical),
            ("server", Urgency::High),
            ("multiple users", Urgency::High),
            ("everyone", Urgency::High),
            ("department", Urgency::High),
            ("virus", Urgency::Critical),
            ("hacked", Urgency::Critical),
            ("malware", Urgency::Critical),
            ("suspicious", Urgency::High),
            ("data loss", Urgency::Critical),
            ("corrupted", Urgency::High),
        ]
        .into_iter()
        .map(|(k, u)| (k.to_string(), u))
        .collect();

        Self {
            urgent_keywords,
            critical_indicators: strings(&[
                "emergency",
                "critical",
                "urgent",
                "asap",
                "immediately",
                "production down",
                "server down",
                "system down",
                "data loss",
                "corrupted",
                "virus",
                "hacked",
                "malware",
            ]),
            high_indicators: strings(&[
                "important meeting",
                "deadline",
                "presentation",
                "can't work",
                "blocking",
                "stopped working",
                "multiple people",
                "department",
                "team affected",
            ]),
            medium_indicators: strings(&[
                "soon",
                "today",
                "this morning",
                "this afternoon",
                "affecting work",
                "slowing down",
            ]),
            low_confidence_threshold: 0.3,
            default_contact: "it-support@techcorp.com".to_string(),
        }
    }
}

impl EscalationPolicy {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.low_confidence_threshold) {
            return Err(ConfigError::InvalidSetting {
                name: "low_confidence_threshold",
                reason: format!("{} is outside [0, 1]", self.low_confidence_threshold),
            });
        }
        if self.default_contact.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "default_contact",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Durations as whole or fractional seconds.
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.similarity_threshold, 0.5);
        assert_eq!(config.classification_timeout, Duration::from_secs(20));
        assert_eq!(config.generation_timeout, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(PipelineConfig::new().with_top_k(0).validate().is_err());
        assert!(PipelineConfig::new()
            .with_similarity_threshold(1.5)
            .validate()
            .is_err());
        assert!(PipelineConfig::new()
            .with_similarity_threshold(f32::NAN)
            .validate()
            .is_err());
        assert!(PipelineConfig::new()
            .with_generation_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"top_k": 5, "classification_timeout": 2.5}"#).unwrap();
        assert_eq!(config.top_k, 5);
        assert_eq!(config.classification_timeout, Duration::from_millis(2500));
        assert_eq!(config.generation_timeout, Duration::from_secs(60));
        assert_eq!(config.escalation.low_confidence_threshold, 0.3);
    }
}
