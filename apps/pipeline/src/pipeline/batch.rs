//! Batch matcher: asks the generative model which vacancies fit the most recent
//! legacy resume and broadcasts the raw answer.

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;
use tracing::{error, info};

use crate::broadcast::{Notification, Notifier};
use crate::catalog::VacancyCatalog;
use crate::db::ResumeStore;
use crate::errors::PipelineError;
use crate::llm_client::prompts::vacancy_match_prompt;
use crate::llm_client::GenerativeModel;
use crate::models::resume::LegacyResumeRow;
use crate::models::response::InvocationResponse;

pub struct BatchMatcher {
    resumes: Arc<dyn ResumeStore>,
    catalog: Arc<dyn VacancyCatalog>,
    model: Arc<dyn GenerativeModel>,
    notifier: Arc<dyn Notifier>,
    table: String,
    topic: String,
}

pub fn answer_subject(nome: &str) -> String {
    format!("Matching vacancies for {nome}")
}

impl BatchMatcher {
    pub fn new(
        resumes: Arc<dyn ResumeStore>,
        catalog: Arc<dyn VacancyCatalog>,
        model: Arc<dyn GenerativeModel>,
        notifier: Arc<dyn Notifier>,
        table: String,
        topic: String,
    ) -> Self {
        Self {
            resumes,
            catalog,
            model,
            notifier,
            table,
            topic,
        }
    }

    /// `Ok(None)` when there is no resume to match. Relational failures are fatal;
    /// a model failure is reported as a 500 response.
    pub async fn run(&self) -> Result<Option<InvocationResponse>, PipelineError> {
        let Some(resume) = self.resumes.latest_legacy_resume().await? else {
            info!("No resume found");
            return Ok(None);
        };
        info!("Resume found: {}", resume.nome);

        let vacancies = match self.catalog.scan(&self.table).await {
            Ok(rows) => rows,
            Err(e) => {
                error!("Error reading catalog '{}': {e}", self.table);
                Vec::new()
            }
        };

        let prompt = build_prompt(&resume, &serde_json::to_string(&vacancies)?)?;

        let answer = match self.model.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                error!("Error calling the generative model: {e}");
                return Ok(Some(InvocationResponse::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &json!(e.to_string()),
                )));
            }
        };
        info!("Model answer: {answer}");

        let notification = Notification {
            subject: answer_subject(&resume.nome),
            message: answer.clone(),
        };
        match self.notifier.publish(&self.topic, &notification).await {
            Ok(()) => info!("Answer for '{}' broadcast", resume.nome),
            Err(e) => error!("Error broadcasting answer: {e}"),
        }

        Ok(Some(InvocationResponse::ok(&json!({ "gemini_answer": answer }))))
    }
}

fn build_prompt(resume: &LegacyResumeRow, vacancies_json: &str) -> Result<String, PipelineError> {
    let resume_json = serde_json::to_string(&json!({
        "nome": resume.nome,
        "competencias": resume.competency_list(),
        "experiencia": resume.experiencia.as_deref().unwrap_or_default(),
    }))?;
    Ok(vacancy_match_prompt(&resume_json, vacancies_json))
}
