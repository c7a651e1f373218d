//! Matcher: summarizes which catalog vacancies share competencies with a resume.
//!
//! Every upstream failure degrades to an empty result; the invocation itself
//! always succeeds.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::broadcast::{Notification, Notifier};
use crate::catalog::VacancyCatalog;
use crate::models::response::InvocationResponse;
use crate::models::vacancy::VacancyRecord;
use crate::pipeline::InvocationHandler;

pub const SUMMARY_SUBJECT: &str = "Resume Processing Summary";
const SNIPPET_CHARS: usize = 200;
const FOUND_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub resume_snippet: String,
    pub competencias_found: Vec<String>,
    pub vacancies_matched: usize,
}

impl MatchSummary {
    pub fn new(resume_text: &str, competencias_found: Vec<String>, vacancies_matched: usize) -> Self {
        let mut resume_snippet: String = resume_text.chars().take(SNIPPET_CHARS).collect();
        resume_snippet.push_str("...");
        Self {
            resume_snippet,
            competencias_found,
            vacancies_matched,
        }
    }
}

pub struct Matcher {
    catalog: Arc<dyn VacancyCatalog>,
    notifier: Arc<dyn Notifier>,
    table: String,
    topic: String,
}

impl Matcher {
    pub fn new(
        catalog: Arc<dyn VacancyCatalog>,
        notifier: Arc<dyn Notifier>,
        table: String,
        topic: String,
    ) -> Self {
        Self {
            catalog,
            notifier,
            table,
            topic,
        }
    }

    pub async fn run(&self, resume_text: &str) -> MatchSummary {
        let rows = match self.catalog.scan(&self.table).await {
            Ok(rows) => rows,
            Err(e) => {
                error!("Error reading catalog '{}': {e}", self.table);
                Vec::new()
            }
        };

        let tags = distinct_competencias(&rows);
        info!("Collected {} unique competencias", tags.len());

        let found = placeholder_found_competencias(&tags);
        info!("Placeholder found competencias: {found:?}");

        let matched = count_matching(&rows, &found);
        info!("Found {matched} matching job vacancies");

        let summary = MatchSummary::new(resume_text, found, matched);
        self.broadcast(&summary).await;
        summary
    }

    async fn broadcast(&self, summary: &MatchSummary) {
        let message = match serde_json::to_string_pretty(summary) {
            Ok(message) => message,
            Err(e) => {
                error!("Could not serialize summary: {e}");
                return;
            }
        };
        let notification = Notification {
            subject: SUMMARY_SUBJECT.to_string(),
            message,
        };
        if let Err(e) = self.notifier.publish(&self.topic, &notification).await {
            error!("Error publishing summary to '{}': {e}", self.topic);
        }
    }
}

#[async_trait]
impl InvocationHandler for Matcher {
    fn name(&self) -> &'static str {
        "matcher"
    }

    async fn invoke(&self, input: &str) -> InvocationResponse {
        let resume_text = resume_text_from(input);
        let summary = self.run(&resume_text).await;
        InvocationResponse::ok(&json!({
            "message": "Matching completed",
            "found": summary.competencias_found,
        }))
    }
}

/// `pdf_text` of the input, or empty if the input is unreadable or lacks it.
pub fn resume_text_from(input: &str) -> String {
    match serde_json::from_str::<Value>(input) {
        Ok(value) => value
            .get("pdf_text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Err(e) => {
            warn!("Failed to parse resume text: {e}");
            String::new()
        }
    }
}

/// Union of every row's tags, ordered.
pub fn distinct_competencias(rows: &[VacancyRecord]) -> BTreeSet<String> {
    rows.iter()
        .flat_map(|row| row.competencias.iter().cloned())
        .collect()
}

/// STUB: stands in for real resume analysis. Takes the first tags of the catalog
/// set and ignores the resume text entirely.
pub fn placeholder_found_competencias(tags: &BTreeSet<String>) -> Vec<String> {
    tags.iter().take(FOUND_LIMIT).cloned().collect()
}

pub fn count_matching(rows: &[VacancyRecord], found: &[String]) -> usize {
    rows.iter().filter(|row| row.has_any_competency(found)).count()
}
