//! Category types - the closed set of labels a request can be routed to.
//!
//! Categories are runtime data, validated once at startup. The classifier
//! may only ever answer with a member of the configured [`CategorySet`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::pipeline::keywords::PhraseSet;
use crate::types::escalation::Urgency;

/// Definition of one help desk category.
///
/// Everything the classifier, escalator and generator need to know about a
/// category lives here, so new categories need no code changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    /// Category name (the classifier's output label)
    pub name: String,

    /// Human-readable description, used in the classification prompt
    #[serde(default)]
    pub description: String,

    /// Phrases that, when present in a request of this category, call for
    /// human follow-up. Checked in order.
    #[serde(default)]
    pub escalation_trigger_phrases: Vec<String>,

    /// Human-readable escalation conditions ("Multiple failed resets").
    /// Informational; matching uses `escalation_trigger_phrases`.
    #[serde(default, alias = "escalation_triggers")]
    pub escalation_conditions: Vec<String>,

    /// Representative keywords for the fallback classifier
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Support address requests of this category are escalated to
    #[serde(default)]
    pub escalation_contact: Option<String>,

    /// Requests of this category always escalate at this urgency
    #[serde(default)]
    pub auto_escalate: Option<Urgency>,

    /// Expected resolution time, informational
    #[serde(default)]
    pub typical_resolution_time: Option<String>,

    /// Extra instructions for response generation
    #[serde(default)]
    pub guidance: Option<String>,

    /// Canned reply used when response generation is unavailable
    #[serde(default)]
    pub fallback_response: Option<String>,
}

impl CategoryDefinition {
    /// Create a new category definition.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            escalation_trigger_phrases: Vec::new(),
            escalation_conditions: Vec::new(),
            keywords: Vec::new(),
            escalation_contact: None,
            auto_escalate: None,
            typical_resolution_time: None,
            guidance: None,
            fallback_response: None,
        }
    }

    /// Set the fallback classifier keywords.
    pub fn with_keywords(mut self, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.keywords = keywords.into_iter().map(|k| k.into()).collect();
        self
    }

    /// Set the escalation trigger phrases.
    pub fn with_triggers(mut self, phrases: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.escalation_trigger_phrases = phrases.into_iter().map(|p| p.into()).collect();
        self
    }

    /// Set the descriptive escalation conditions.
    pub fn with_conditions(mut self, conditions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.escalation_conditions = conditions.into_iter().map(|c| c.into()).collect();
        self
    }

    /// Set the escalation contact.
    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.escalation_contact = Some(contact.into());
        self
    }

    /// Always escalate this category at the given urgency.
    pub fn auto_escalate(mut self, urgency: Urgency) -> Self {
        self.auto_escalate = Some(urgency);
        self
    }

    /// Set the typical resolution time.
    pub fn with_resolution_time(mut self, time: impl Into<String>) -> Self {
        self.typical_resolution_time = Some(time.into());
        self
    }

    /// Set generation guidance.
    pub fn with_guidance(mut self, guidance: impl Into<String>) -> Self {
        self.guidance = Some(guidance.into());
        self
    }

    /// Set the canned fallback reply.
    pub fn with_fallback_response(mut self, response: impl Into<String>) -> Self {
        self.fallback_response = Some(response.into());
        self
    }

    /// Fill fields left empty here from `other`.
    ///
    /// Used by the loader to combine data files (which carry descriptions and
    /// escalation conditions) with built-in vocabulary for well-known
    /// categories.
    pub fn merge_missing(mut self, other: &CategoryDefinition) -> Self {
        if self.description.is_empty() {
            self.description = other.description.clone();
        }
        if self.escalation_trigger_phrases.is_empty() {
            self.escalation_trigger_phrases = other.escalation_trigger_phrases.clone();
        }
        if self.escalation_conditions.is_empty() {
            self.escalation_conditions = other.escalation_conditions.clone();
        }
        if self.keywords.is_empty() {
            self.keywords = other.keywords.clone();
        }
        self.escalation_contact = self
            .escalation_contact
            .or_else(|| other.escalation_contact.clone());
        self.auto_escalate = self.auto_escalate.or(other.auto_escalate);
        self.typical_resolution_time = self
            .typical_resolution_time
            .or_else(|| other.typical_resolution_time.clone());
        self.guidance = self.guidance.or_else(|| other.guidance.clone());
        self.fallback_response = self
            .fallback_response
            .or_else(|| other.fallback_response.clone());
        self
    }
}

/// A category with its phrase matchers compiled.
#[derive(Debug, Clone)]
pub(crate) struct CompiledCategory {
    pub(crate) definition: CategoryDefinition,
    pub(crate) keywords: PhraseSet,
    pub(crate) triggers: PhraseSet,
}

impl CompiledCategory {
    fn compile(definition: CategoryDefinition) -> Self {
        Self {
            keywords: PhraseSet::new(&definition.keywords),
            triggers: PhraseSet::new(&definition.escalation_trigger_phrases),
            definition,
        }
    }
}

/// The validated, ordered set of categories.
///
/// Declaration order doubles as the fallback classifier's tie-break
/// priority: earlier categories win ties.
#[derive(Debug, Clone)]
pub struct CategorySet {
    categories: IndexMap<String, CompiledCategory>,
    default_category: String,
}

impl CategorySet {
    /// Validate and build a category set.
    ///
    /// Fails when the set is empty, a name is blank or duplicated, or the
    /// default category is not a member.
    pub fn new(
        definitions: impl IntoIterator<Item = CategoryDefinition>,
        default_category: impl Into<String>,
    ) -> ConfigResult<Self> {
        let default_category = default_category.into();
        let mut categories = IndexMap::new();

        for mut definition in definitions {
            definition.name = definition.name.trim().to_string();
            if definition.name.is_empty() {
                return Err(ConfigError::EmptyCategoryName);
            }
            if categories.contains_key(&definition.name) {
                return Err(ConfigError::DuplicateCategory {
                    name: definition.name,
                });
            }
            categories.insert(
                definition.name.clone(),
                CompiledCategory::compile(definition),
            );
        }

        if categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }
        if !categories.contains_key(&default_category) {
            return Err(ConfigError::UnknownDefaultCategory {
                name: default_category,
            });
        }

        Ok(Self {
            categories,
            default_category,
        })
    }

    /// The IT help desk categories with their built-in vocabulary.
    pub fn help_desk_defaults() -> Self {
        // Static data; test_help_desk_defaults_pass_validation covers it
        Self::new(default_definitions(), DEFAULT_CATEGORY)
            .expect("built-in category definitions are valid")
    }

    /// Look up a category by exact name.
    pub fn get(&self, name: &str) -> Option<&CategoryDefinition> {
        self.categories.get(name).map(|c| &c.definition)
    }

    /// Resolve a label produced by a model.
    ///
    /// Accepts surrounding whitespace/quotes and case differences, nothing
    /// looser: near-misses are not members.
    pub fn resolve(&self, label: &str) -> Option<&CategoryDefinition> {
        let label = label.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        if let Some(category) = self.get(label) {
            return Some(category);
        }
        self.iter().find(|c| c.name.eq_ignore_ascii_case(label))
    }

    /// Whether `name` is a member.
    pub fn contains(&self, name: &str) -> bool {
        self.categories.contains_key(name)
    }

    /// Category names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(|k| k.as_str())
    }

    /// Definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &CategoryDefinition> {
        self.categories.values().map(|c| &c.definition)
    }

    /// Number of categories (never zero).
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Always false for a validated set.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// The catch-all category used when nothing else fits.
    pub fn default_category(&self) -> &CategoryDefinition {
        // Membership is checked in `new`
        &self.categories[self.default_category.as_str()].definition
    }

    /// Name of the default category.
    pub fn default_name(&self) -> &str {
        &self.default_category
    }

    pub(crate) fn compiled(&self) -> impl Iterator<Item = &CompiledCategory> {
        self.categories.values()
    }

    pub(crate) fn compiled_get(&self, name: &str) -> Option<&CompiledCategory> {
        self.categories.get(name)
    }
}

/// Default catch-all category name.
pub const DEFAULT_CATEGORY: &str = "policy_question";

/// Built-in IT help desk categories.
///
/// Order matters: it is the fallback classifier's tie-break priority.
/// Account and install problems come before the broad hardware vocabulary
/// ("not working") so they win ties against it.
pub fn default_definitions() -> Vec<CategoryDefinition> {
    vec![
        CategoryDefinition::new(
            "password_reset",
            "Password-related issues including resets, lockouts, forgotten passwords, and password policy questions",
        )
        .with_keywords(["password", "login", "forgot", "reset", "locked", "lockout", "sign in"])
        .with_triggers([
            "multiple failed",
            "failed multiple",
            "several attempts",
            "tried many times",
            "keep failing",
            "still not working",
            "account compromised",
            "unauthorized access",
        ])
        .with_contact("security@techcorp.com")
        .with_resolution_time("5-10 minutes")
        .with_guidance(
            "- Guide them to the self-service password reset portal\n\
             - Mention password policy requirements\n\
             - Explain account lockout procedures\n\
             - Provide IT contact for persistent issues",
        )
        .with_fallback_response(
            "For password issues, please visit https://password.techcorp.com to reset your password using your \
             company email address. If you continue to have issues, please contact IT support at it-support@techcorp.com.",
        ),
        CategoryDefinition::new(
            "software_installation",
            "Issues with installing, updating, or configuring software applications",
        )
        .with_keywords(["install", "software", "application", "app", "download", "setup"])
        .with_triggers(["new software", "need approval", "not approved", "custom software"])
        .with_contact("software-support@techcorp.com")
        .with_resolution_time("15-45 minutes")
        .with_guidance(
            "- Check if software is approved for installation\n\
             - Provide installation steps with administrator privileges\n\
             - Include troubleshooting for common installation issues\n\
             - Mention manager approval requirements for new software",
        )
        .with_fallback_response(
            "For software installation help, please ensure you're running the installer as an administrator. \
             If you need new software installed, please check with your manager for approval and contact IT support for assistance.",
        ),
        CategoryDefinition::new(
            "hardware_failure",
            "Physical hardware problems requiring repair or replacement (laptops, monitors, keyboards, etc.)",
        )
        .with_keywords(["broken", "not working", "hardware", "screen", "laptop", "monitor", "keyboard"])
        .with_contact("hardware-support@techcorp.com")
        .auto_escalate(Urgency::High)
        .with_resolution_time("1-3 business days")
        .with_guidance(
            "- Acknowledge urgency of hardware issues\n\
             - Advise on data backup if possible\n\
             - Explain hardware replacement timeline\n\
             - Mention temporary equipment availability\n\
             - Always escalate to hardware support team",
        )
        .with_fallback_response(
            "Hardware issues require immediate attention. Please contact our hardware support team immediately \
             and avoid using the affected device to prevent data loss. We'll arrange replacement equipment as needed.",
        ),
        CategoryDefinition::new(
            "network_connectivity",
            "Network access issues including WiFi, VPN, internet connectivity, and network configuration",
        )
        .with_keywords(["wifi", "internet", "vpn", "network", "connectivity", "connection"])
        .with_triggers(["no one can", "everyone having", "whole office", "entire office"])
        .with_contact("network-support@techcorp.com")
        .with_resolution_time("30 minutes - 2 hours")
        .with_guidance(
            "- Provide basic network troubleshooting steps\n\
             - Check for widespread network issues\n\
             - Include VPN troubleshooting if relevant\n\
             - Escalate if multiple users affected",
        )
        .with_fallback_response(
            "For network connectivity issues, please try restarting your network adapter and check with colleagues \
             if they're experiencing similar issues. If the problem persists, please contact network support.",
        ),
        CategoryDefinition::new(
            "email_configuration",
            "Email setup, synchronization, configuration issues, and mailbox problems",
        )
        .with_keywords(["email", "outlook", "sync", "mailbox", "mail"])
        .with_triggers(["account compromised", "unauthorized access", "phishing"])
        .with_contact("email-support@techcorp.com")
        .with_resolution_time("15-30 minutes")
        .with_guidance(
            "- Provide email server settings (IMAP/SMTP)\n\
             - Check for mailbox storage issues\n\
             - Include synchronization troubleshooting\n\
             - Mention email admin for server-side issues",
        )
        .with_fallback_response(
            "For email configuration issues, please check your internet connection and verify your email settings. \
             If you continue to have problems, please contact our email support team.",
        ),
        CategoryDefinition::new(
            "security_incident",
            "Potential security threats, malware, suspicious activity, or cybersecurity concerns",
        )
        .with_keywords(["virus", "malware", "security", "suspicious", "hacked", "threat"])
        .with_contact("security@techcorp.com")
        .auto_escalate(Urgency::Critical)
        .with_resolution_time("Immediate response")
        .with_guidance(
            "- Take security concerns seriously\n\
             - Advise immediate reporting to security team\n\
             - Instruct not to attempt fixes themselves\n\
             - Emphasize evidence preservation\n\
             - Always escalate to security team",
        )
        .with_fallback_response(
            "Security incidents require immediate attention. Please do not attempt to fix the issue yourself. \
             Contact our security team immediately at security@techcorp.com and preserve any evidence.",
        ),
        CategoryDefinition::new(
            DEFAULT_CATEGORY,
            "Questions about company IT policies, procedures, and general IT guidance",
        )
        .with_keywords(["policy", "procedure", "allowed", "rules", "guidelines"])
        .with_contact("it-support@techcorp.com")
        .with_resolution_time("Same day")
        .with_guidance(
            "- Reference relevant company IT policies\n\
             - Provide clear policy explanations\n\
             - Include approval processes if applicable\n\
             - Direct to appropriate contacts for exceptions",
        )
        .with_fallback_response(
            "For IT policy questions, please refer to our company IT policies or contact IT support for clarification. \
             We're here to help ensure you're following the correct procedures.",
        ),
    ]
}
