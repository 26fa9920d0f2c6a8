//! Request classification.
//!
//! The model path is tried first under a deadline; any failure (provider
//! error, timeout, malformed output, a category outside the configured set)
//! falls through to keyword heuristics. Classification never fails.

use std::time::Duration;

use tracing::{debug, warn};

use super::prompts::{format_classify_prompt, CLASSIFY_SYSTEM_PROMPT};
use crate::error::{HelpdeskError, Result};
use crate::traits::ai::LanguageModel;
use crate::types::category::CategorySet;
use crate::types::classification::{
    ClassificationMode, ClassificationOutcome, ClassificationResult, ModelClassification,
};

/// Fallback confidences always stay below this, so they never look like a
/// confident model answer.
pub const FALLBACK_CONFIDENCE_CEILING: f32 = 0.5;

/// Confidence of a fallback classification with a single weak match.
const FALLBACK_CONFIDENCE_FLOOR: f32 = 0.30;

/// Range a perfect keyword score adds on top of the floor.
const FALLBACK_CONFIDENCE_SPAN: f32 = 0.15;

/// Confidence when no keyword matched at all.
const NO_MATCH_CONFIDENCE: f32 = 0.1;

/// Classify `text` into one of `categories`.
pub async fn classify<L>(
    llm: &L,
    text: &str,
    categories: &CategorySet,
    timeout: Duration,
) -> ClassificationOutcome
where
    L: LanguageModel + ?Sized,
{
    let attempt = tokio::time::timeout(timeout, classify_with_model(llm, text, categories)).await;

    let cause = match attempt {
        Ok(Ok(result)) => {
            debug!(
                category = %result.category,
                confidence = result.confidence,
                "Classified request"
            );
            return ClassificationOutcome {
                result,
                mode: ClassificationMode::Primary,
            };
        }
        Ok(Err(e)) => e,
        Err(_) => HelpdeskError::Timeout {
            stage: "classification",
            after: timeout,
        },
    };

    warn!(error = %cause, "Model classification failed, using keyword fallback");

    let result = classify_by_keywords(text, categories);
    debug!(
        category = %result.category,
        confidence = result.confidence,
        "Classified request by keywords"
    );

    ClassificationOutcome {
        result,
        mode: ClassificationMode::Fallback {
            cause: cause.to_string(),
        },
    }
}

/// Ask the model for a classification and validate it.
pub async fn classify_with_model<L>(
    llm: &L,
    text: &str,
    categories: &CategorySet,
) -> Result<ClassificationResult>
where
    L: LanguageModel + ?Sized,
{
    let prompt = format_classify_prompt(text, categories);
    let response = llm.complete(CLASSIFY_SYSTEM_PROMPT, &prompt).await?;
    parse_classification(&response, categories)
}

/// Parse and validate a model classification response.
///
/// Accepts bare JSON or JSON wrapped in a markdown code fence. The category
/// must resolve to a member of `categories`; confidence is clamped to
/// `[0, 1]` and must be finite.
pub fn parse_classification(
    response: &str,
    categories: &CategorySet,
) -> Result<ClassificationResult> {
    let parsed: ModelClassification = serde_json::from_str(response)
        .or_else(|_| {
            let json_str = response
                .trim()
                .trim_start_matches("```json")
                .trim_start_matches("```")
                .trim_end_matches("```")
                .trim();
            serde_json::from_str(json_str)
        })
        .map_err(|e| {
            HelpdeskError::MalformedOutput(format!("Failed to parse classification: {}", e))
        })?;

    let category = categories
        .resolve(&parsed.category)
        .ok_or_else(|| HelpdeskError::UnknownCategory {
            name: parsed.category.clone(),
        })?;

    if !parsed.confidence.is_finite() {
        return Err(HelpdeskError::MalformedOutput(format!(
            "non-finite confidence: {}",
            parsed.confidence
        )));
    }

    Ok(ClassificationResult {
        category: category.name.clone(),
        confidence: parsed.confidence.clamp(0.0, 1.0) as f32,
        reasoning: parsed.reasoning,
    })
}

/// Classify by keyword heuristics.
///
/// Each category scores `matched keywords / total keywords` (capped at 1.0).
/// The highest score wins; ties go to the category declared first. When
/// nothing matches, the default category is returned with a low confidence.
pub fn classify_by_keywords(text: &str, categories: &CategorySet) -> ClassificationResult {
    let mut best: Option<(&str, f32, Vec<&str>)> = None;

    for category in categories.compiled() {
        if category.keywords.is_empty() {
            continue;
        }

        let matched = category.keywords.matches(text);
        if matched.is_empty() {
            continue;
        }

        let score = (matched.len() as f32 / category.keywords.len() as f32).min(1.0);

        // Strictly greater: earlier categories keep ties
        if best.as_ref().map_or(true, |(_, s, _)| score > *s) {
            best = Some((category.definition.name.as_str(), score, matched));
        }
    }

    match best {
        Some((name, score, matched)) => ClassificationResult {
            category: name.to_string(),
            confidence: fallback_confidence(score),
            reasoning: format!(
                "Keyword classification matched: {} (score {:.2})",
                matched.join(", "),
                score
            ),
        },
        None => ClassificationResult {
            category: categories.default_name().to_string(),
            confidence: NO_MATCH_CONFIDENCE,
            reasoning: format!(
                "No category keywords matched, defaulting to {}",
                categories.default_name()
            ),
        },
    }
}

/// Map a keyword score in `(0, 1]` into the fallback confidence band.
fn fallback_confidence(score: f32) -> f32 {
    let confidence = FALLBACK_CONFIDENCE_FLOOR + score.clamp(0.0, 1.0) * FALLBACK_CONFIDENCE_SPAN;
    confidence.min(FALLBACK_CONFIDENCE_CEILING - f32::EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockAI;
    use crate::types::category::CategoryDefinition;
    use proptest::prelude::*;

    fn categories() -> CategorySet {
        CategorySet::help_desk_defaults()
    }

    #[test]
    fn test_keywords_password() {
        let result = classify_by_keywords(
            "I forgot my password and can't log into my computer",
            &categories(),
        );
        assert_eq!(result.category, "password_reset");
        assert!(result.confidence >= 0.3);
        assert!(result.confidence < FALLBACK_CONFIDENCE_CEILING);
    }

    #[test]
    fn test_keywords_security() {
        let result = classify_by_keywords("I think my computer has been hacked", &categories());
        assert_eq!(result.category, "security_incident");
    }

    #[test]
    fn test_keywords_no_match_uses_default() {
        let result = classify_by_keywords("hello there", &categories());
        assert_eq!(result.category, "policy_question");
        assert_eq!(result.confidence, NO_MATCH_CONFIDENCE);
        assert!(result.reasoning.contains("No category keywords matched"));
    }

    #[test]
    fn test_keywords_tie_goes_to_first_declared() {
        let set = CategorySet::new(
            vec![
                CategoryDefinition::new("first", "").with_keywords(["printer", "toner"]),
                CategoryDefinition::new("second", "").with_keywords(["printer", "jam"]),
                CategoryDefinition::new("other", ""),
            ],
            "other",
        )
        .unwrap();

        assert_eq!(classify_by_keywords("the printer", &set).category, "first");
        assert_eq!(classify_by_keywords("printer jam", &set).category, "second");
    }

    #[test]
    fn test_keywords_prefer_password_over_hardware_vocabulary() {
        let result = classify_by_keywords("my password is still not working", &categories());
        assert_eq!(result.category, "password_reset");
    }

    #[test]
    fn test_parse_plain_and_fenced() {
        let set = categories();
        let plain = r#"{"category": "network_connectivity", "confidence": 0.92, "reasoning": "VPN"}"#;
        let result = parse_classification(plain, &set).unwrap();
        assert_eq!(result.category, "network_connectivity");
        assert!((result.confidence - 0.92).abs() < 1e-6);

        let fenced = format!("```json\n{}\n```", plain);
        assert_eq!(parse_classification(&fenced, &set).unwrap(), result);
    }

    #[test]
    fn test_parse_rejects_out_of_domain() {
        let set = categories();
        let response = r#"{"category": "printer_issue", "confidence": 0.99, "reasoning": ""}"#;
        assert!(matches!(
            parse_classification(response, &set),
            Err(HelpdeskError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_parse_clamps_confidence() {
        let set = categories();
        let response = r#"{"category": "Password_Reset", "confidence": 7.5}"#;
        let result = parse_classification(response, &set).unwrap();
        assert_eq!(result.category, "password_reset");
        assert_eq!(result.confidence, 1.0);

        let response = r#"{"category": "password_reset", "confidence": -2}"#;
        assert_eq!(parse_classification(response, &set).unwrap().confidence, 0.0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let set = categories();
        assert!(matches!(
            parse_classification("I think it's a password problem", &set),
            Err(HelpdeskError::MalformedOutput(_))
        ));
        assert!(parse_classification(r#"{"confidence": 0.5}"#, &set).is_err());
    }

    #[tokio::test]
    async fn test_classify_primary() {
        let ai = MockAI::new().with_classification("email_configuration", 0.88, "Outlook sync");
        let outcome = classify(
            &ai,
            "Outlook won't sync",
            &categories(),
            Duration::from_secs(5),
        )
        .await;

        assert_eq!(outcome.mode, ClassificationMode::Primary);
        assert_eq!(outcome.result.category, "email_configuration");
        assert_eq!(ai.complete_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_classify_falls_back_on_provider_error() {
        let ai = MockAI::new().failing_completions();
        let outcome = classify(
            &ai,
            "I forgot my password",
            &categories(),
            Duration::from_secs(5),
        )
        .await;

        assert!(outcome.mode.is_fallback());
        assert_eq!(outcome.result.category, "password_reset");
        assert!(outcome.result.confidence < FALLBACK_CONFIDENCE_CEILING);
    }

    #[tokio::test]
    async fn test_classify_falls_back_on_unknown_category() {
        let ai = MockAI::new().with_classification("printers", 0.99, "Printer");
        let outcome = classify(&ai, "The wifi keeps dropping", &categories(), Duration::from_secs(5)).await;

        assert!(outcome.mode.is_fallback());
        assert_eq!(outcome.result.category, "network_connectivity");
    }

    #[tokio::test]
    async fn test_classify_falls_back_on_timeout() {
        let ai = MockAI::new()
            .with_classification("email_configuration", 0.9, "")
            .with_delay(Duration::from_secs(5));
        let outcome = classify(&ai, "vpn is down", &categories(), Duration::from_millis(20)).await;

        match outcome.mode {
            ClassificationMode::Fallback { cause } => assert!(cause.contains("timed out")),
            other => panic!("expected fallback, got {other:?}"),
        }
        assert_eq!(outcome.result.category, "network_connectivity");
    }

    proptest! {
        #[test]
        fn keyword_category_is_always_a_member(text in ".{0,200}") {
            let set = categories();
            let result = classify_by_keywords(&text, &set);
            prop_assert!(set.contains(&result.category));
            prop_assert!((0.0..FALLBACK_CONFIDENCE_CEILING).contains(&result.confidence));
        }

        #[test]
        fn parsed_category_is_always_a_member(label in "[a-zA-Z_ ]{0,30}", confidence in -5.0f64..5.0) {
            let set = categories();
            let response = serde_json::json!({"category": label, "confidence": confidence}).to_string();
            if let Ok(result) = parse_classification(&response, &set) {
                prop_assert!(set.contains(&result.category));
                prop_assert!((0.0..=1.0).contains(&result.confidence));
            }
        }
    }
}
