use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct GapAnalysisRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct GapAnalysisResponse {
    /// Skills the job description asks for that the resume does not show.
    pub missing_skills: Vec<String>,
    pub summary: String,
    pub gems_remaining: i64,
}
