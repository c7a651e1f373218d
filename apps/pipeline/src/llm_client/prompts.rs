// Prompt text for the batch matcher. Placeholders are replaced with serialized JSON.

pub const VACANCY_MATCH_PROMPT_TEMPLATE: &str = "\
You are a system that analyzes a resume and identifies job vacancies with similar competencies.
Return ONLY a JSON list in the format: [{\"id\": \"001\", \"cargo\": \"...\"}]

Resume:
{resume_json}

Vacancies:
{vacancies_json}";

pub fn vacancy_match_prompt(resume_json: &str, vacancies_json: &str) -> String {
    VACANCY_MATCH_PROMPT_TEMPLATE
        .replace("{resume_json}", resume_json)
        .replace("{vacancies_json}", vacancies_json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_both_documents() {
        let prompt = vacancy_match_prompt(r#"{"nome":"Ana"}"#, r#"[{"id":"001"}]"#);
        assert!(prompt.contains("Resume:\n{\"nome\":\"Ana\"}"));
        assert!(prompt.ends_with("Vacancies:\n[{\"id\":\"001\"}]"));
        assert!(prompt.contains("Return ONLY a JSON list"));
    }
}
