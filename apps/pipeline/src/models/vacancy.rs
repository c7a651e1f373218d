use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A catalog vacancy. Only `competencias` is interpreted; every other field is
/// carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VacancyRecord {
    #[serde(default)]
    pub competencias: Vec<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl VacancyRecord {
    pub fn has_any_competency(&self, tags: &[String]) -> bool {
        self.competencias.iter().any(|c| tags.contains(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extra_fields_survive_round_trip() {
        let raw = json!({"id": "001", "cargo": "Backend Dev", "competencias": ["rust"]});
        let vacancy: VacancyRecord = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(vacancy.competencias, vec!["rust"]);
        assert_eq!(vacancy.fields.get("cargo"), Some(&json!("Backend Dev")));
        assert_eq!(serde_json::to_value(&vacancy).unwrap(), raw);
    }

    #[test]
    fn test_missing_competencias_is_empty() {
        let vacancy: VacancyRecord = serde_json::from_value(json!({"id": "002"})).unwrap();
        assert!(vacancy.competencias.is_empty());
        assert!(!vacancy.has_any_competency(&["rust".to_string()]));
    }
}
