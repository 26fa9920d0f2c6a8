//! LLM prompts for the help desk pipeline.
//!
//! Templates use `{placeholder}` substitution. The user's message is always
//! substituted last so braces in it are never expanded.

use crate::types::category::CategorySet;
use crate::types::classification::ClassificationResult;
use crate::types::escalation::EscalationVerdict;
use crate::types::knowledge::RetrievedItem;
use crate::types::request::{Priority, SupportRequest};

/// System prompt for classification.
pub const CLASSIFY_SYSTEM_PROMPT: &str = "You are an expert IT help desk classifier. \
Analyze user requests and classify them into the most appropriate category with high accuracy.";

/// Prompt for classifying a request into one of the configured categories.
pub const CLASSIFY_PROMPT: &str = r#"Classify the following IT help desk request into one of the predefined categories.

AVAILABLE CATEGORIES:
{categories}

CLASSIFICATION REQUIREMENTS:
1. Choose the MOST APPROPRIATE category based on the user's primary issue
2. Use a category name exactly as listed above
3. Provide a confidence score between 0.0 and 1.0 (1.0 = completely certain)
4. Explain your reasoning briefly

Output JSON:
{
    "category": "selected_category_name",
    "confidence": 0.95,
    "reasoning": "Brief explanation of why this category was chosen"
}

USER REQUEST: "{message}""#;

/// System prompt for response generation.
pub const GENERATE_SYSTEM_PROMPT: &str = r#"You are an expert IT Help Desk assistant for TechCorp Inc. Your role is to provide helpful, accurate, and professional responses to employee IT requests.

GUIDELINES:
- Be friendly, professional, and empathetic
- Provide clear, step-by-step instructions when applicable
- Reference company policies and procedures when relevant
- Always include next steps or follow-up actions
- If escalation is required, explain why and provide contact information
- Use the retrieved knowledge to give accurate, company-specific guidance
- Keep responses concise but comprehensive
- Show understanding of the user's urgency and business impact

RESPONSE STRUCTURE:
1. Acknowledge the issue with empathy
2. Provide the solution or next steps
3. Include relevant company-specific information
4. Mention escalation if required
5. Offer additional help or resources

Remember: You represent TechCorp's IT support team, so maintain a professional and helpful tone."#;

/// Prompt for generating a response from classification, evidence and escalation.
pub const GENERATE_PROMPT: &str = r#"CLASSIFICATION:
- Category: {category}
- Confidence: {confidence}
- Reasoning: {reasoning}

RELEVANT KNOWLEDGE:
{knowledge}

ESCALATION INFO:
{escalation}
{context}
CATEGORY-SPECIFIC GUIDANCE:
{guidance}

GENERATE A HELPFUL RESPONSE:
Create a professional, empathetic response that addresses the user's issue. Include:
1. Acknowledgment of their problem
2. Clear solution steps or guidance
3. Company-specific information from the knowledge base
4. Escalation information if required
5. Next steps or follow-up actions

USER REQUEST: "{message}""#;

/// Guidance used when a category carries none.
const DEFAULT_GUIDANCE: &str = "Provide general IT support guidance appropriate for the request.";

/// Canned reply used when a category carries none.
const DEFAULT_FALLBACK: &str =
    "I'll help you with your IT request. Please contact our IT support team for immediate assistance.";

/// Format the classification prompt.
pub fn format_classify_prompt(message: &str, categories: &CategorySet) -> String {
    let categories_text = categories
        .iter()
        .map(|c| {
            let description = if c.description.is_empty() {
                "General IT support category"
            } else {
                c.description.as_str()
            };
            format!("- {}: {}", c.name, description)
        })
        .collect::<Vec<_>>()
        .join("\n");

    CLASSIFY_PROMPT
        .replace("{categories}", &categories_text)
        .replace("{message}", message)
}

/// Format the response generation prompt.
pub fn format_generate_prompt(
    request: &SupportRequest,
    classification: &ClassificationResult,
    knowledge: &[RetrievedItem],
    escalation: &EscalationVerdict,
    guidance: Option<&str>,
) -> String {
    let knowledge_text = if knowledge.is_empty() {
        "No specific knowledge retrieved - provide general guidance based on category.".to_string()
    } else {
        knowledge
            .iter()
            .enumerate()
            .map(|(i, item)| {
                format!(
                    "{}. Source: {} (Relevance: {:.2})\n   Content: {}",
                    i + 1,
                    item.source,
                    item.relevance_score,
                    item.content
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut escalation_text = format!("- Required: {}", escalation.required);
    if escalation.required {
        if let Some(reason) = &escalation.reason {
            escalation_text.push_str(&format!("\n- Reason: {}", reason));
        }
        if let Some(contact) = &escalation.contact {
            escalation_text.push_str(&format!("\n- Contact: {}", contact));
        }
        if let Some(urgency) = escalation.urgency {
            escalation_text.push_str(&format!("\n- Urgency: {}", urgency));
        }
    }

    let mut context = String::new();
    if request.priority != Priority::Normal {
        context.push_str(&format!(
            "\nREQUEST PRIORITY: {}\n",
            format!("{:?}", request.priority).to_uppercase()
        ));
    }
    if let Some(user) = &request.user_id {
        context.push_str(&format!("USER: {}\n", user));
    }

    GENERATE_PROMPT
        .replace("{category}", &classification.category)
        .replace("{confidence}", &format!("{:.2}", classification.confidence))
        .replace("{reasoning}", &classification.reasoning)
        .replace("{knowledge}", &knowledge_text)
        .replace("{escalation}", &escalation_text)
        .replace("{context}", &context)
        .replace("{guidance}", guidance.unwrap_or(DEFAULT_GUIDANCE))
        .replace("{message}", &request.message)
}

/// Canned reply for when generation is unavailable.
pub fn format_fallback_response(
    category: &str,
    fallback_response: Option<&str>,
    escalation: &EscalationVerdict,
) -> String {
    let mut response = format!(
        "Hello! I understand you're experiencing a {} issue. {}",
        category.replace('_', " "),
        fallback_response.unwrap_or(DEFAULT_FALLBACK)
    );

    if escalation.required {
        response.push_str("\n\nThis issue requires escalation to our specialized team.");
        if let Some(contact) = &escalation.contact {
            response.push_str(&format!(" Please contact {} for immediate assistance.", contact));
        }
        if let Some(reason) = &escalation.reason {
            response.push_str(&format!(" Reason: {}", reason));
        }
    }

    response.push_str("\n\nIs there anything else I can help you with today?");
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::escalation::{EscalationRule, Urgency};

    #[test]
    fn test_classify_prompt_lists_categories() {
        let categories = CategorySet::help_desk_defaults();
        let prompt = format_classify_prompt("My VPN is down", &categories);

        for name in categories.names() {
            assert!(prompt.contains(&format!("- {name}: ")));
        }
        assert!(prompt.ends_with("USER REQUEST: \"My VPN is down\""));
    }

    #[test]
    fn test_user_braces_not_expanded() {
        let categories = CategorySet::help_desk_defaults();
        let prompt = format_classify_prompt("what is {categories}?", &categories);
        assert!(prompt.contains("what is {categories}?"));
    }

    #[test]
    fn test_generate_prompt_includes_escalation() {
        let request = SupportRequest::new("My laptop screen is cracked")
            .with_user("u-42")
            .with_priority(Priority::Urgent);
        let classification = ClassificationResult {
            category: "hardware_failure".to_string(),
            confidence: 0.9,
            reasoning: "Physical damage".to_string(),
        };
        let escalation = EscalationVerdict::escalate(
            EscalationRule::CategoryAutoEscalate,
            Urgency::High,
            "hardware-support@techcorp.com",
            "Hardware always escalates",
        );

        let prompt = format_generate_prompt(&request, &classification, &[], &escalation, None);

        assert!(prompt.contains("- Required: true"));
        assert!(prompt.contains("- Contact: hardware-support@techcorp.com"));
        assert!(prompt.contains("- Urgency: high"));
        assert!(prompt.contains("REQUEST PRIORITY: URGENT"));
        assert!(prompt.contains("USER: u-42"));
        assert!(prompt.contains("No specific knowledge retrieved"));
        assert!(prompt.contains(DEFAULT_GUIDANCE));
    }

    #[test]
    fn test_fallback_response() {
        let verdict = EscalationVerdict::escalate(
            EscalationRule::CategoryAutoEscalate,
            Urgency::Critical,
            "security@techcorp.com",
            "Security incidents always escalate",
        );
        let text = format_fallback_response("security_incident", Some("Do not touch it."), &verdict);

        assert!(text.starts_with("Hello! I understand you're experiencing a security incident issue. Do not touch it."));
        assert!(text.contains("Please contact security@techcorp.com"));
        assert!(text.contains("Reason: Security incidents always escalate"));
        assert!(text.ends_with("Is there anything else I can help you with today?"));

        let text = format_fallback_response("other", None, &EscalationVerdict::not_required());
        assert!(text.contains(DEFAULT_FALLBACK));
        assert!(!text.contains("escalation"));
        assert!(!text.contains("Reason:"));
    }
}
