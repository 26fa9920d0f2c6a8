use axum::{extract::Extension, Json};
use helpdesk::{CategoryDefinition, HelpDeskStats, Urgency, AI};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct CategoriesResponse {
    categories: Vec<CategorySummary>,
    default_category: String,
    total_categories: usize,
}

#[derive(Serialize)]
pub struct CategorySummary {
    name: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    typical_resolution_time: Option<String>,
    escalation_triggers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    escalation_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auto_escalate: Option<Urgency>,
}

impl From<&CategoryDefinition> for CategorySummary {
    fn from(definition: &CategoryDefinition) -> Self {
        // Human-readable conditions where the data has them, phrases otherwise
        let escalation_triggers = if definition.escalation_conditions.is_empty() {
            definition.escalation_trigger_phrases.clone()
        } else {
            definition.escalation_conditions.clone()
        };

        Self {
            name: definition.name.clone(),
            description: definition.description.clone(),
            typical_resolution_time: definition.typical_resolution_time.clone(),
            escalation_triggers,
            escalation_contact: definition.escalation_contact.clone(),
            auto_escalate: definition.auto_escalate,
        }
    }
}

/// Configured categories, in priority order
pub async fn categories_handler<A: AI + 'static>(
    Extension(state): Extension<AppState<A>>,
) -> Json<CategoriesResponse> {
    let categories = state.desk.categories();

    Json(CategoriesResponse {
        categories: categories.iter().map(CategorySummary::from).collect(),
        default_category: categories.default_name().to_string(),
        total_categories: categories.len(),
    })
}

/// Knowledge base statistics
pub async fn stats_handler<A: AI + 'static>(
    Extension(state): Extension<AppState<A>>,
) -> Json<HelpDeskStats> {
    Json(state.desk.stats())
}
