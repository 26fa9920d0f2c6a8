//! Escalation rules.
//!
//! Rules are checked in a fixed order and the first one that fires decides
//! the verdict:
//!
//! 1. the category always escalates
//! 2. the request contains one of the category's trigger phrases
//! 3. the request contains a globally urgent keyword
//! 4. the classification confidence is low
//!
//! Declared priority can raise the urgency of an escalated verdict but never
//! escalates on its own. Evaluation does no I/O and cannot fail.

use tracing::debug;

use super::keywords::PhraseSet;
use crate::types::category::CategorySet;
use crate::types::classification::ClassificationResult;
use crate::types::config::EscalationPolicy;
use crate::types::escalation::{EscalationRule, EscalationVerdict, Urgency};
use crate::types::request::Priority;

/// Compiled escalation policy.
#[derive(Debug, Clone)]
pub struct Escalator {
    policy: EscalationPolicy,

    /// Urgent keywords grouped by urgency, highest first
    urgent_keywords: Vec<(Urgency, PhraseSet)>,

    /// Urgency indicators, highest first
    indicators: Vec<(Urgency, PhraseSet)>,
}

impl Default for Escalator {
    fn default() -> Self {
        Self::new(EscalationPolicy::default())
    }
}

impl Escalator {
    pub fn new(policy: EscalationPolicy) -> Self {
        let mut urgent_keywords = Vec::new();
        for urgency in [Urgency::Critical, Urgency::High, Urgency::Medium, Urgency::Low] {
            let keywords: Vec<&str> = policy
                .urgent_keywords
                .iter()
                .filter(|(_, u)| **u == urgency)
                .map(|(k, _)| k.as_str())
                .collect();
            if !keywords.is_empty() {
                urgent_keywords.push((urgency, PhraseSet::new(&keywords)));
            }
        }

        let indicators = vec![
            (Urgency::Critical, PhraseSet::new(&policy.critical_indicators)),
            (Urgency::High, PhraseSet::new(&policy.high_indicators)),
            (Urgency::Medium, PhraseSet::new(&policy.medium_indicators)),
        ];

        Self {
            policy,
            urgent_keywords,
            indicators,
        }
    }

    pub fn policy(&self) -> &EscalationPolicy {
        &self.policy
    }

    /// Decide whether a classified request needs a human.
    pub fn evaluate(
        &self,
        classification: &ClassificationResult,
        text: &str,
        priority: Priority,
        categories: &CategorySet,
    ) -> EscalationVerdict {
        let verdict = self.evaluate_rules(classification, text, categories);
        let verdict = match priority {
            Priority::Urgent => verdict.raise_urgency(Urgency::High),
            Priority::High => verdict.raise_urgency(Urgency::Medium),
            Priority::Normal | Priority::Low => verdict,
        };

        debug!(
            required = verdict.required,
            urgency = ?verdict.urgency,
            rule = ?verdict.rule,
            "Evaluated escalation"
        );

        verdict
    }

    fn evaluate_rules(
        &self,
        classification: &ClassificationResult,
        text: &str,
        categories: &CategorySet,
    ) -> EscalationVerdict {
        let category = categories.compiled_get(&classification.category);
        let contact = category
            .and_then(|c| c.definition.escalation_contact.clone())
            .unwrap_or_else(|| self.policy.default_contact.clone());

        if let Some(category) = category {
            if let Some(urgency) = category.definition.auto_escalate {
                return EscalationVerdict::escalate(
                    EscalationRule::CategoryAutoEscalate,
                    urgency,
                    contact,
                    format!(
                        "All {} requests require specialist attention",
                        category.definition.name.replace('_', " ")
                    ),
                );
            }

            if let Some(phrase) = category.triggers.first_match(text) {
                // Never below what the urgent keywords alone would give
                let urgency = match self.urgent_keyword(text) {
                    Some((keyword_urgency, _)) => {
                        self.urgency_from_indicators(text).max(keyword_urgency)
                    }
                    None => self.urgency_from_indicators(text),
                };
                return EscalationVerdict::escalate(
                    EscalationRule::TriggerPhrase {
                        phrase: phrase.to_string(),
                    },
                    urgency,
                    contact,
                    format!("Escalation trigger detected: \"{}\"", phrase),
                );
            }
        }

        if let Some((urgency, keyword)) = self.urgent_keyword(text) {
            return EscalationVerdict::escalate(
                EscalationRule::UrgentKeyword {
                    keyword: keyword.to_string(),
                },
                urgency,
                contact,
                format!(
                    "Request contains \"{}\", indicating a {} priority issue",
                    keyword, urgency
                ),
            );
        }

        if classification.confidence < self.policy.low_confidence_threshold {
            return EscalationVerdict::escalate(
                EscalationRule::LowConfidence,
                Urgency::Low,
                self.policy.default_contact.clone(),
                format!(
                    "Low classification confidence ({:.2}) - human review recommended",
                    classification.confidence
                ),
            );
        }

        EscalationVerdict::not_required()
    }

    /// The most urgent keyword in `text`, with its urgency.
    fn urgent_keyword<'a>(&'a self, text: &str) -> Option<(Urgency, &'a str)> {
        self.urgent_keywords.iter().find_map(|(urgency, keywords)| {
            keywords.first_match(text).map(|keyword| (*urgency, keyword))
        })
    }

    /// Urgency suggested by the wording of the request.
    fn urgency_from_indicators(&self, text: &str) -> Urgency {
        self.indicators
            .iter()
            .find(|(_, phrases)| phrases.first_match(text).is_some())
            .map(|(urgency, _)| *urgency)
            .unwrap_or(Urgency::Low)
    }
}
