use std::sync::Arc;

use actix_web::{Responder, post, web};
use api_gems::services::ledger;
use common::{env_config::Config, error::Res, http::Success, jwt::JwtClaims};
use genai::GenAiClient;
use sqlx::PgPool;

use crate::{
    dtos::gap::{GapAnalysisRequest, GapAnalysisResponse},
    services,
};

/// Compares a resume against a job description and lists missing skills.
///
/// Debits the configured gem cost, then runs a single chat completion and
/// returns the parsed result.
///
/// # Output
/// - Success: `{ missing_skills, summary, gems_remaining }`
/// - Error: 400 for empty/oversized inputs or insufficient balance,
///   429/502 for provider-side failures
#[post("/gap-analysis")]
pub async fn post_gap_analysis(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<GapAnalysisRequest>,
    pool: web::Data<Arc<PgPool>>,
    genai: web::Data<GenAiClient>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let req = req.into_inner();
    services::gap::validate_inputs(&req.resume_text, &req.job_description)?;

    let balance = ledger::debit(&pool, claims.user_id, config.gem_costs.gap_analysis).await?;
    let analysis = services::gap::analyze(&genai, &req.resume_text, &req.job_description).await?;

    Success::ok(GapAnalysisResponse {
        missing_skills: analysis.missing_skills,
        summary: analysis.summary,
        gems_remaining: balance.tokens_remaining,
    })
}
