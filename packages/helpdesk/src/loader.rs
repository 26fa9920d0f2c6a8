//! Knowledge base loading.
//!
//! Reads a data directory laid out as:
//!
//! - `categories.json` - category descriptions, resolution times, escalation conditions
//! - `installation_guides.json` - per-software install steps and common issues
//! - `troubleshooting_database.json` - troubleshooting procedures by issue type
//! - `company_it_policies.md`, `knowledge_base.md` - markdown, split by header
//!
//! Missing files are skipped with a warning; malformed files are errors.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{ConfigResult, HelpdeskError, Result};
use crate::types::category::{default_definitions, CategoryDefinition, CategorySet};
use crate::types::knowledge::RawChunk;

const CATEGORIES_FILE: &str = "categories.json";
const INSTALLATION_GUIDES_FILE: &str = "installation_guides.json";
const TROUBLESHOOTING_FILE: &str = "troubleshooting_database.json";
const MARKDOWN_FILES: &[&str] = &["company_it_policies.md", "knowledge_base.md"];

/// Category tag for installation guide chunks.
const INSTALLATION_CATEGORY: &str = "software_installation";

/// Category tag for content that matches nothing more specific.
const GENERAL_CATEGORY: &str = "policy_question";

/// Troubleshooting issue types with a known category.
const TROUBLESHOOTING_CATEGORIES: &[(&str, &str)] = &[
    ("password_reset", "password_reset"),
    ("slow_computer", "hardware_failure"),
    ("wifi_connection", "network_connectivity"),
    ("email_not_syncing", "email_configuration"),
    ("software_installation_failed", "software_installation"),
];

/// Header words that place a markdown section in a category. First hit wins.
const HEADER_CATEGORIES: &[(&[&str], &str)] = &[
    (&["password", "login", "authentication"], "password_reset"),
    (&["software", "installation", "install"], "software_installation"),
    (&["hardware", "device", "equipment"], "hardware_failure"),
    (&["network", "connectivity", "wifi", "vpn"], "network_connectivity"),
    (&["email", "mail", "outlook"], "email_configuration"),
    (&["security", "incident", "threat"], "security_incident"),
];

/// Everything read from a data directory.
#[derive(Debug, Clone, Default)]
pub struct LoadedKnowledge {
    /// Categories from `categories.json`, in file order
    pub categories: Vec<CategoryDefinition>,

    /// Chunks ready for indexing
    pub chunks: Vec<RawChunk>,
}

impl LoadedKnowledge {
    /// Build the category set.
    ///
    /// Loaded categories are completed with built-in vocabulary of the same
    /// name. With no `categories.json`, the built-in categories are used.
    pub fn category_set(&self, default_category: &str) -> ConfigResult<CategorySet> {
        let builtin = default_definitions();
        if self.categories.is_empty() {
            return CategorySet::new(builtin, default_category);
        }

        let definitions = self.categories.iter().cloned().map(|loaded| {
            match builtin.iter().find(|b| b.name == loaded.name) {
                Some(known) => loaded.merge_missing(known),
                None => loaded,
            }
        });

        CategorySet::new(definitions.collect::<Vec<_>>(), default_category)
    }
}

/// Reads knowledge files from a directory.
#[derive(Debug, Clone)]
pub struct KnowledgeLoader {
    dir: PathBuf,
}

impl KnowledgeLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load every known file in the directory.
    pub fn load(&self) -> Result<LoadedKnowledge> {
        let mut loaded = LoadedKnowledge::default();

        if let Some(file) = self.read_json::<CategoriesFile>(CATEGORIES_FILE)? {
            for (name, entry) in file.categories {
                loaded.chunks.push(category_chunk(&name, &entry));
                loaded.categories.push(entry.into_definition(name));
            }
        }

        if let Some(file) = self.read_json::<InstallationGuidesFile>(INSTALLATION_GUIDES_FILE)? {
            for (software, guide) in file.software_guides {
                loaded.chunks.extend(guide_chunks(&software, &guide));
            }
        }

        if let Some(file) = self.read_json::<TroubleshootingFile>(TROUBLESHOOTING_FILE)? {
            for (issue_type, procedure) in file.troubleshooting_steps {
                loaded.chunks.push(troubleshooting_chunk(&issue_type, &procedure));
            }
        }

        for name in MARKDOWN_FILES {
            if let Some(content) = self.read(name)? {
                loaded.chunks.extend(split_markdown_sections(&content, name));
            }
        }

        info!(
            dir = %self.dir.display(),
            categories = loaded.categories.len(),
            chunks = loaded.chunks.len(),
            "Loaded knowledge base"
        );

        Ok(loaded)
    }

    fn read(&self, name: &str) -> Result<Option<String>> {
        let path = self.dir.join(name);
        if !path.exists() {
            warn!(path = %path.display(), "Knowledge file not found, skipping");
            return Ok(None);
        }

        fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| HelpdeskError::Io {
                path: path.display().to_string(),
                source,
            })
    }

    fn read_json<T: for<'de> Deserialize<'de>>(&self, name: &str) -> Result<Option<T>> {
        match self.read(name)? {
            Some(content) => Ok(Some(serde_json::from_str(&content)?)),
            None => Ok(None),
        }
    }

    /// Directory being read.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[derive(Debug, Deserialize)]
struct CategoriesFile {
    #[serde(default)]
    categories: IndexMap<String, CategoryEntry>,
}

#[derive(Debug, Deserialize)]
struct CategoryEntry {
    #[serde(default)]
    description: String,
    #[serde(default)]
    typical_resolution_time: Option<String>,
    #[serde(default)]
    escalation_triggers: Vec<String>,
    #[serde(default)]
    escalation_trigger_phrases: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    escalation_contact: Option<String>,
}

impl CategoryEntry {
    fn into_definition(self, name: String) -> CategoryDefinition {
        let mut definition = CategoryDefinition::new(name, self.description)
            .with_conditions(self.escalation_triggers)
            .with_triggers(self.escalation_trigger_phrases)
            .with_keywords(self.keywords);
        definition.typical_resolution_time = self.typical_resolution_time;
        definition.escalation_contact = self.escalation_contact;
        definition
    }
}

#[derive(Debug, Deserialize)]
struct InstallationGuidesFile {
    #[serde(default)]
    software_guides: IndexMap<String, InstallationGuide>,
}

#[derive(Debug, Deserialize)]
struct InstallationGuide {
    #[serde(default)]
    title: String,
    #[serde(default)]
    steps: Vec<String>,
    #[serde(default)]
    common_issues: Vec<CommonIssue>,
}

#[derive(Debug, Deserialize)]
struct CommonIssue {
    #[serde(default)]
    issue: String,
    #[serde(default)]
    solution: String,
}

#[derive(Debug, Deserialize)]
struct TroubleshootingFile {
    #[serde(default)]
    troubleshooting_steps: IndexMap<String, TroubleshootingProcedure>,
}

#[derive(Debug, Deserialize)]
struct TroubleshootingProcedure {
    #[serde(default)]
    category: String,
    #[serde(default)]
    steps: Vec<String>,
    #[serde(default)]
    escalation_trigger: String,
}

fn category_chunk(name: &str, entry: &CategoryEntry) -> RawChunk {
    let source = format!("{CATEGORIES_FILE}:{name}");
    RawChunk::new(
        source.clone(),
        format!(
            "Category: {} - {}. Resolution time: {}. Escalation triggers: {}",
            name,
            entry.description,
            entry.typical_resolution_time.as_deref().unwrap_or("unknown"),
            entry.escalation_triggers.join(", ")
        ),
        source,
        name,
    )
}

fn guide_chunks(software: &str, guide: &InstallationGuide) -> Vec<RawChunk> {
    let source = format!("{INSTALLATION_GUIDES_FILE}:{software}");
    let mut chunks = vec![RawChunk::new(
        source.clone(),
        format!(
            "Installing {}: {}. Steps: {}",
            software,
            guide.title,
            guide.steps.join(". ")
        ),
        source.clone(),
        INSTALLATION_CATEGORY,
    )];

    let issues_source = format!("{source}:issues");
    chunks.extend(guide.common_issues.iter().enumerate().map(|(i, issue)| {
        RawChunk::new(
            format!("{issues_source}:{i}"),
            format!(
                "{} issue: {}. Solution: {}",
                software, issue.issue, issue.solution
            ),
            issues_source.clone(),
            INSTALLATION_CATEGORY,
        )
    }));

    chunks
}

fn troubleshooting_chunk(issue_type: &str, procedure: &TroubleshootingProcedure) -> RawChunk {
    let source = format!("{TROUBLESHOOTING_FILE}:{issue_type}");
    let category = TROUBLESHOOTING_CATEGORIES
        .iter()
        .find(|(issue, _)| *issue == issue_type)
        .map(|(_, category)| *category)
        .unwrap_or(GENERAL_CATEGORY);

    RawChunk::new(
        source.clone(),
        format!(
            "Troubleshooting {} ({}): {}. Escalate when: {}",
            issue_type,
            procedure.category,
            procedure.steps.join(". "),
            procedure.escalation_trigger
        ),
        source,
        category,
    )
}

/// Split markdown into one chunk per headed section.
///
/// Text before the first header and sections with no body are dropped.
/// Blank lines inside a section are removed.
pub fn split_markdown_sections(content: &str, source: &str) -> Vec<RawChunk> {
    let mut chunks = Vec::new();
    let mut header: Option<&str> = None;
    let mut body: Vec<&str> = Vec::new();

    let mut flush = |header: Option<&str>, body: &mut Vec<&str>| {
        if let Some(header) = header {
            let text = body.join("\n");
            let text = text.trim();
            if !text.is_empty() {
                let title = header.trim_start_matches('#').trim();
                chunks.push(RawChunk::new(
                    format!("{}:{}", source, chunks.len()),
                    format!("{}: {}", header, text),
                    format!("{}:{}", source, title),
                    infer_category(header),
                ));
            }
        }
        body.clear();
    };

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            flush(header, &mut body);
            header = Some(trimmed);
        } else if !trimmed.is_empty() {
            body.push(line);
        }
    }
    flush(header, &mut body);

    chunks
}

/// Category for a markdown section, from words in its header.
fn infer_category(header: &str) -> &'static str {
    let header = header.to_lowercase();
    HEADER_CATEGORIES
        .iter()
        .find(|(words, _)| words.iter().any(|w| header.contains(w)))
        .map(|(_, category)| *category)
        .unwrap_or(GENERAL_CATEGORY)
}
