use common::error::{AppError, Res};
use genai::GenAiClient;
use serde::Deserialize;

/// Upper bound on either input text; resumes and postings beyond this are
/// rejected rather than truncated silently.
pub const MAX_TEXT_CHARS: usize = 20_000;

const SYSTEM_PROMPT: &str = "You are a career assistant. Compare a resume against a job \
description and list the skills the job asks for that the resume does not demonstrate. \
Respond with JSON only, in the shape \
{\"missing_skills\": [\"...\"], \"summary\": \"...\"} with at most 15 skills.";

#[derive(Debug, Deserialize, PartialEq)]
pub struct GapAnalysis {
    pub missing_skills: Vec<String>,
    pub summary: String,
}

pub fn validate_inputs(resume_text: &str, job_description: &str) -> Res<()> {
    for (field, value) in [
        ("resume_text", resume_text),
        ("job_description", job_description),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::BadRequest(format!("{} must not be empty", field)));
        }
        if value.chars().count() > MAX_TEXT_CHARS {
            return Err(AppError::BadRequest(format!(
                "{} must be at most {} characters",
                field, MAX_TEXT_CHARS
            )));
        }
    }
    Ok(())
}

/// Runs the gap analysis: one chat completion, parsed as JSON.
pub async fn analyze(
    genai: &GenAiClient,
    resume_text: &str,
    job_description: &str,
) -> Res<GapAnalysis> {
    let user_prompt = format!(
        "Resume:\n{}\n\nJob description:\n{}",
        resume_text.trim(),
        job_description.trim()
    );

    let completion = genai
        .chat_completion(genai::CHAT_MODEL, SYSTEM_PROMPT, &user_prompt)
        .await?;

    parse_gap_analysis(&completion)
}

/// Parses the model output, tolerating markdown code fences around the
/// JSON, which chat models add despite instructions.
pub fn parse_gap_analysis(raw: &str) -> Res<GapAnalysis> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_start_matches('\n'))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str::<GapAnalysis>(body.trim()).map_err(|e| {
        log::warn!("Gap analysis output was not valid JSON: {}", e);
        AppError::Internal(format!("Gap analysis output could not be parsed: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_inputs_are_rejected() {
        assert!(validate_inputs("", "some jd").is_err());
        assert!(validate_inputs("some resume", "   ").is_err());
        assert!(validate_inputs("some resume", "some jd").is_ok());
    }

    #[test]
    fn oversized_inputs_are_rejected() {
        let huge = "x".repeat(MAX_TEXT_CHARS + 1);
        assert!(validate_inputs(&huge, "jd").is_err());
    }

    #[test]
    fn parses_plain_json() {
        let parsed = parse_gap_analysis(
            r#"{"missing_skills": ["Kubernetes", "Terraform"], "summary": "Two gaps."}"#,
        )
        .unwrap();
        assert_eq!(parsed.missing_skills.len(), 2);
        assert_eq!(parsed.summary, "Two gaps.");
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "```json\n{\"missing_skills\": [\"Go\"], \"summary\": \"One gap.\"}\n```";
        let parsed = parse_gap_analysis(raw).unwrap();
        assert_eq!(parsed.missing_skills, vec!["Go".to_string()]);
    }

    #[test]
    fn garbage_output_is_an_internal_error() {
        assert!(matches!(
            parse_gap_analysis("sorry, I cannot help with that"),
            Err(AppError::Internal(_))
        ));
    }
}
