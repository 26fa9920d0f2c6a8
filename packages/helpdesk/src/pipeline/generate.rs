//! Response generation.

use std::time::Duration;

use tracing::{debug, warn};

use super::prompts::{format_fallback_response, format_generate_prompt, GENERATE_SYSTEM_PROMPT};
use crate::error::HelpdeskError;
use crate::traits::ai::LanguageModel;
use crate::types::category::CategoryDefinition;
use crate::types::classification::ClassificationResult;
use crate::types::escalation::EscalationVerdict;
use crate::types::knowledge::RetrievedItem;
use crate::types::request::SupportRequest;
use crate::types::response::Generation;

/// Everything generation needs about one request.
#[derive(Debug, Clone, Copy)]
pub struct GenerationInput<'a> {
    pub request: &'a SupportRequest,
    pub classification: &'a ClassificationResult,
    pub category: &'a CategoryDefinition,
    pub knowledge: &'a [RetrievedItem],
    pub escalation: &'a EscalationVerdict,
}

/// Generate a response, degrading to the category's canned reply on
/// provider failure, empty output or timeout.
pub async fn generate<L>(llm: &L, input: GenerationInput<'_>, timeout: Duration) -> Generation
where
    L: LanguageModel + ?Sized,
{
    let prompt = format_generate_prompt(
        input.request,
        input.classification,
        input.knowledge,
        input.escalation,
        input.category.guidance.as_deref(),
    );

    let error = match tokio::time::timeout(timeout, llm.complete(GENERATE_SYSTEM_PROMPT, &prompt)).await {
        Ok(Ok(text)) if !text.trim().is_empty() => {
            debug!(chars = text.len(), "Generated response");
            return Generation::Generated {
                text: text.trim().to_string(),
            };
        }
        Ok(Ok(_)) => HelpdeskError::MalformedOutput("empty response".to_string()),
        Ok(Err(e)) => e,
        Err(_) => HelpdeskError::Timeout {
            stage: "generation",
            after: timeout,
        },
    };

    warn!(error = %error, "Response generation unavailable, using fallback text");

    Generation::Unavailable {
        reason: error.to_string(),
        fallback_text: format_fallback_response(
            &input.category.name,
            input.category.fallback_response.as_deref(),
            input.escalation,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockAI;
    use crate::types::category::CategorySet;

    fn input<'a>(
        request: &'a SupportRequest,
        classification: &'a ClassificationResult,
        category: &'a CategoryDefinition,
        escalation: &'a EscalationVerdict,
    ) -> GenerationInput<'a> {
        GenerationInput {
            request,
            classification,
            category,
            knowledge: &[],
            escalation,
        }
    }

    fn classification() -> ClassificationResult {
        ClassificationResult {
            category: "password_reset".to_string(),
            confidence: 0.9,
            reasoning: "password".to_string(),
        }
    }

    #[tokio::test]
    async fn test_generated() {
        let ai = MockAI::new().with_completion("  Visit the reset portal.  ");
        let categories = CategorySet::help_desk_defaults();
        let request = SupportRequest::new("forgot password");
        let classification = classification();
        let category = categories.get("password_reset").unwrap();
        let verdict = EscalationVerdict::not_required();

        let generation = generate(
            &ai,
            input(&request, &classification, category, &verdict),
            Duration::from_secs(5),
        )
        .await;

        assert_eq!(
            generation,
            Generation::Generated {
                text: "Visit the reset portal.".to_string()
            }
        );
        let calls = ai.complete_calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("self-service password reset portal"));
    }

    #[tokio::test]
    async fn test_unavailable_on_failure() {
        let ai = MockAI::new().failing_completions();
        let categories = CategorySet::help_desk_defaults();
        let request = SupportRequest::new("forgot password");
        let classification = classification();
        let category = categories.get("password_reset").unwrap();
        let verdict = EscalationVerdict::not_required();

        let generation = generate(
            &ai,
            input(&request, &classification, category, &verdict),
            Duration::from_secs(5),
        )
        .await;

        match generation {
            Generation::Unavailable { fallback_text, .. } => {
                assert!(fallback_text.contains("https://password.techcorp.com"));
            }
            other => panic!("expected unavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unavailable_on_empty_output() {
        let ai = MockAI::new().with_completion("   ");
        let categories = CategorySet::help_desk_defaults();
        let request = SupportRequest::new("forgot password");
        let classification = classification();
        let category = categories.get("password_reset").unwrap();
        let verdict = EscalationVerdict::not_required();

        let generation = generate(
            &ai,
            input(&request, &classification, category, &verdict),
            Duration::from_secs(5),
        )
        .await;
        assert!(!generation.is_generated());
    }
}
