//! The HelpDesk - main entry point for request processing.
//!
//! Per request: classify, evaluate escalation, retrieve knowledge, generate
//! a response. Stage failures are isolated: classification degrades to
//! keyword heuristics, retrieval to keyword overlap or an empty result, and
//! generation to a canned reply. Escalation is computed before generation so
//! it never waits on (or is lost to) a failed generation call.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::classify::classify;
use super::escalate::Escalator;
use super::generate::{generate, GenerationInput};
use super::retrieve::retrieve;
use crate::error::{HelpdeskError, Result};
use crate::index::{KnowledgeIndex, SharedIndex};
use crate::traits::ai::AI;
use crate::types::category::CategorySet;
use crate::types::classification::{ClassificationMode, ClassificationResult};
use crate::types::config::PipelineConfig;
use crate::types::knowledge::RawChunk;
use crate::types::request::SupportRequest;
use crate::types::response::PipelineResult;

/// Knowledge base summary for monitoring.
#[derive(Debug, Clone, Serialize)]
pub struct HelpDeskStats {
    pub categories: usize,
    pub chunks: usize,
    pub dimension: usize,

    /// Chunk count per source document
    pub chunks_by_source: BTreeMap<String, usize>,

    /// Chunk count per configured category, in declaration order
    pub chunks_by_category: Vec<(String, usize)>,
}

/// The help desk pipeline.
///
/// Cheap to share: wrap in an `Arc` and call [`process`](Self::process)
/// from as many tasks as needed.
///
/// # Example
///
/// ```rust,ignore
/// let desk = HelpDesk::new(ai, CategorySet::help_desk_defaults(), chunks).await?;
/// let result = desk.process(SupportRequest::new("I forgot my password")).await;
/// println!("{}", result.response.text());
/// ```
pub struct HelpDesk<A: AI> {
    ai: A,
    categories: CategorySet,
    index: SharedIndex,
    escalator: Escalator,
    config: PipelineConfig,
}

impl<A: AI> HelpDesk<A> {
    /// Build the knowledge index and create a help desk with default settings.
    pub async fn new(ai: A, categories: CategorySet, chunks: Vec<RawChunk>) -> Result<Self> {
        Self::with_config(ai, categories, chunks, PipelineConfig::default()).await
    }

    /// Build the knowledge index and create a help desk.
    pub async fn with_config(
        ai: A,
        categories: CategorySet,
        chunks: Vec<RawChunk>,
        config: PipelineConfig,
    ) -> Result<Self> {
        config.validate()?;
        let index = KnowledgeIndex::build(chunks, &ai).await?;
        Self::from_index(ai, categories, index, config)
    }

    /// Create a help desk over an already built index.
    pub fn from_index(
        ai: A,
        categories: CategorySet,
        index: KnowledgeIndex,
        config: PipelineConfig,
    ) -> Result<Self> {
        config.validate()?;

        let untagged = categories
            .names()
            .filter(|name| index.count_tagged(name) == 0)
            .collect::<Vec<_>>();
        if !untagged.is_empty() {
            warn!(categories = ?untagged, "Categories without knowledge; retrieval will widen");
        }

        info!(
            categories = categories.len(),
            chunks = index.len(),
            "Help desk ready"
        );

        Ok(Self {
            escalator: Escalator::new(config.escalation.clone()),
            ai,
            categories,
            index: SharedIndex::new(index),
            config,
        })
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn ai(&self) -> &A {
        &self.ai
    }

    /// The knowledge index currently serving requests.
    pub fn index(&self) -> Arc<KnowledgeIndex> {
        self.index.snapshot()
    }

    /// Process one request. Never fails: every stage has a degraded outcome.
    pub async fn process(&self, request: SupportRequest) -> PipelineResult {
        let start = Instant::now();
        let index = self.index.snapshot();

        debug!(request_id = %request.id, "Processing request");

        // 1. Classify
        let outcome = classify(
            &self.ai,
            &request.message,
            &self.categories,
            self.config.classification_timeout,
        )
        .await;
        let (classification, classification_mode) =
            self.ensure_member(outcome.result, outcome.mode);

        // 2. Escalate (pure, independent of retrieval and generation)
        let escalation = self.escalator.evaluate(
            &classification,
            &request.message,
            request.priority,
            &self.categories,
        );

        // 3. Retrieve
        let (knowledge, retrieval_mode) = retrieve(
            &self.ai,
            &index,
            &request.message,
            &classification.category,
            self.config.top_k,
            self.config.similarity_threshold,
        )
        .await;

        // 4. Generate
        let category = self
            .categories
            .get(&classification.category)
            .unwrap_or_else(|| self.categories.default_category());
        let response = generate(
            &self.ai,
            GenerationInput {
                request: &request,
                classification: &classification,
                category,
                knowledge: &knowledge,
                escalation: &escalation,
            },
            self.config.generation_timeout,
        )
        .await;

        let processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            request_id = %request.id,
            category = %classification.category,
            degraded = classification_mode.is_fallback(),
            knowledge = knowledge.len(),
            escalated = escalation.required,
            generated = response.is_generated(),
            processing_time_ms,
            "Processed request"
        );

        PipelineResult {
            request_id: request.id,
            classification,
            classification_mode,
            knowledge,
            retrieval_mode,
            response,
            escalation,
            processing_time_ms,
            created_at: Utc::now(),
        }
    }

    /// Process with cancellation support.
    pub async fn process_with_cancel(
        &self,
        request: SupportRequest,
        cancel: CancellationToken,
    ) -> Result<PipelineResult> {
        tokio::select! {
            result = self.process(request) => Ok(result),
            _ = cancel.cancelled() => Err(HelpdeskError::Cancelled),
        }
    }

    /// Process several requests concurrently. Results keep input order.
    pub async fn process_batch(&self, requests: Vec<SupportRequest>) -> Vec<PipelineResult> {
        join_all(requests.into_iter().map(|r| self.process(r))).await
    }

    /// Rebuild the knowledge index from `chunks` and swap it in.
    ///
    /// Requests already in flight finish against the old index. On error the
    /// current index stays in place.
    pub async fn reload(&self, chunks: Vec<RawChunk>) -> Result<()> {
        let index = KnowledgeIndex::build(chunks, &self.ai).await?;
        let chunks = index.len();
        let previous = self.index.replace(index);

        info!(previous = previous.len(), chunks, "Reloaded knowledge index");
        Ok(())
    }

    /// Knowledge base statistics.
    pub fn stats(&self) -> HelpDeskStats {
        let index = self.index.snapshot();

        let mut chunks_by_source = BTreeMap::new();
        for chunk in index.chunks() {
            *chunks_by_source.entry(chunk.source.clone()).or_insert(0) += 1;
        }

        HelpDeskStats {
            categories: self.categories.len(),
            chunks: index.len(),
            dimension: index.dimension(),
            chunks_by_source,
            chunks_by_category: self
                .categories
                .names()
                .map(|name| (name.to_string(), index.count_tagged(name)))
                .collect(),
        }
    }

    /// Replace a classification whose category is not a member with the
    /// default category.
    fn ensure_member(
        &self,
        classification: ClassificationResult,
        mode: ClassificationMode,
    ) -> (ClassificationResult, ClassificationMode) {
        if self.categories.contains(&classification.category) {
            return (classification, mode);
        }

        warn!(
            category = %classification.category,
            "Classification outside category set, using default"
        );

        let default = self.categories.default_name().to_string();
        (
            ClassificationResult {
                reasoning: format!(
                    "Category {} is not configured, defaulting to {}",
                    classification.category, default
                ),
                category: default,
                confidence: classification.confidence.clamp(0.0, 1.0),
            },
            ClassificationMode::Fallback {
                cause: "category outside configured set".to_string(),
            },
        )
    }
}
