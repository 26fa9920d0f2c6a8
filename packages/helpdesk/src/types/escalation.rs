//! Escalation types.

use serde::{Deserialize, Serialize};

/// How quickly a human needs to look at an escalated request.
///
/// Ordered: `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
            Urgency::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which rule produced a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum EscalationRule {
    /// The category always escalates
    CategoryAutoEscalate,

    /// A category trigger phrase appeared in the request
    TriggerPhrase { phrase: String },

    /// A globally urgent keyword appeared in the request
    UrgentKeyword { keyword: String },

    /// The classifier was unsure
    LowConfidence,
}

/// Outcome of the escalation rules.
///
/// When `required` is false, reason, urgency, contact and rule are all `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationVerdict {
    /// Whether a human must follow up
    pub required: bool,

    /// Why the request was escalated (present iff required)
    pub reason: Option<String>,

    /// Urgency (present iff required)
    pub urgency: Option<Urgency>,

    /// Where to route the request (present iff required)
    pub contact: Option<String>,

    /// Rule that fired
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<EscalationRule>,
}

impl EscalationVerdict {
    /// A verdict requiring human follow-up.
    pub fn escalate(
        rule: EscalationRule,
        urgency: Urgency,
        contact: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            required: true,
            reason: Some(reason.into()),
            urgency: Some(urgency),
            contact: Some(contact.into()),
            rule: Some(rule),
        }
    }

    /// A verdict that needs no follow-up.
    pub fn not_required() -> Self {
        Self {
            required: false,
            reason: None,
            urgency: None,
            contact: None,
            rule: None,
        }
    }

    /// Raise urgency to at least `floor`. No-op on a non-escalated verdict.
    pub fn raise_urgency(mut self, floor: Urgency) -> Self {
        if let Some(urgency) = self.urgency {
            self.urgency = Some(urgency.max(floor));
        }
        self
    }
}
