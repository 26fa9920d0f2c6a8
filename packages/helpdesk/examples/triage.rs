//! Triage - offline walkthrough of the help desk pipeline
//!
//! Runs a handful of requests through [`HelpDesk`] backed by `MockAI` with
//! completions switched off, so every request takes the keyword fallback path
//! and the canned category responses. Useful for checking category keywords
//! and escalation rules without an API key.
//!
//! ```bash
//! cargo run --example triage
//! cargo run --example triage -- path/to/data
//! ```

use helpdesk::testing::{sample_chunks, MockAI};
use helpdesk::{CategorySet, HelpDesk, KnowledgeLoader, Priority, SupportRequest, DEFAULT_CATEGORY};

const REQUESTS: &[(&str, Priority)] = &[
    ("I forgot my password and can't log into my computer", Priority::Normal),
    ("My laptop screen is cracked", Priority::Normal),
    ("I think my computer has been hacked", Priority::High),
    ("Outlook stopped syncing this morning", Priority::Normal),
    ("Can I bring my own keyboard?", Priority::Urgent),
    ("hello?", Priority::Normal),
];

#[tokio::main]
async fn main() -> helpdesk::Result<()> {
    let ai = MockAI::new().failing_completions();

    let desk = match std::env::args().nth(1) {
        Some(dir) => {
            let loaded = KnowledgeLoader::new(dir).load()?;
            let categories = loaded.category_set(DEFAULT_CATEGORY)?;
            HelpDesk::new(ai, categories, loaded.chunks).await?
        }
        None => HelpDesk::new(ai, CategorySet::help_desk_defaults(), sample_chunks()).await?,
    };

    let stats = desk.stats();
    println!(
        "{} categories, {} chunks ({} dims)\n",
        stats.categories, stats.chunks, stats.dimension
    );

    for (message, priority) in REQUESTS {
        let result = desk
            .process(SupportRequest::new(*message).with_priority(*priority))
            .await;

        println!("> {message} [{priority:?}]");
        println!(
            "  category:   {} ({:.2}, {:?})",
            result.classification.category,
            result.classification.confidence,
            result.classification_mode
        );
        match (&result.escalation.urgency, &result.escalation.contact) {
            (Some(urgency), Some(contact)) if result.escalation.required => println!(
                "  escalation: {urgency} -> {contact}: {}",
                result.escalation.reason.as_deref().unwrap_or_default()
            ),
            _ => println!("  escalation: none"),
        }
        for item in &result.knowledge {
            println!("  evidence:   {} ({:.2})", item.chunk_id, item.relevance_score);
        }
        println!("  response:   {}\n", result.response.text());
    }

    Ok(())
}
