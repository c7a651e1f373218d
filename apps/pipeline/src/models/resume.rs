use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row of `resumes`, written by the persister.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: i64,
    pub filename: String,
    pub pdf_text: String,
    pub txt_content: String,
}

/// Row of the legacy `curriculos` table read by the batch matcher.
/// Unrelated to `resumes`; the two schemas are not unified.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LegacyResumeRow {
    pub id: i64,
    pub nome: String,
    /// Comma-joined competency tags.
    pub competencias: Option<String>,
    pub experiencia: Option<String>,
}

impl LegacyResumeRow {
    /// Splits on commas as stored. Empty pieces from stray commas are kept.
    pub fn competency_list(&self) -> Vec<String> {
        self.competencias
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(String::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(competencias: Option<&str>) -> LegacyResumeRow {
        LegacyResumeRow {
            id: 1,
            nome: "Ana".into(),
            competencias: competencias.map(String::from),
            experiencia: None,
        }
    }

    #[test]
    fn test_competency_list_keeps_trailing_empty_tag() {
        assert_eq!(
            row(Some("rust,sql,")).competency_list(),
            vec!["rust", "sql", ""]
        );
    }

    #[test]
    fn test_competency_list_null_is_single_empty_tag() {
        assert_eq!(row(None).competency_list(), vec![""]);
    }
}
