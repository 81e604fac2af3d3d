// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{CategoryScore, Feedback, FeedbackType, Interview, LeaderboardEntry};
use crate::services::feedback::{
    CreateFeedbackOutcome, CreateFeedbackParams, GeneralAnswers, QuestionAnswer, TranscriptTurn,
};
use crate::services::leaderboard;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// API routes (require a session).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/interviews", get(get_my_interviews))
        .route("/api/interviews/latest", get(get_latest_interviews))
        .route("/api/interviews/quota", get(get_interview_quota))
        .route("/api/interviews/{id}", get(get_interview))
        .route("/api/interviews/{id}/feedback", get(get_interview_feedback))
        .route("/api/feedback", post(create_feedback))
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/account/data", delete(remove_user_data))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subscription: bool,
    pub photo_url: Option<String>,
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = state
        .db
        .get_user(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    Ok(Json(UserResponse {
        id: user.user_id,
        name: profile.name,
        email: profile.email,
        subscription: profile.subscription,
        photo_url: profile.photo_url,
    }))
}

// ─── Interviews ──────────────────────────────────────────────

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct InterviewResponse {
    pub id: String,
    pub role: String,
    pub level: String,
    pub questions: Vec<String>,
    pub techstack: Vec<String>,
    #[serde(rename = "type")]
    pub interview_type: String,
    pub user_id: String,
    pub finalized: bool,
    pub created_at: String,
}

impl From<Interview> for InterviewResponse {
    fn from(i: Interview) -> Self {
        Self {
            id: i.id,
            role: i.role,
            level: i.level,
            questions: i.questions,
            techstack: i.techstack,
            interview_type: i.interview_type,
            user_id: i.user_id,
            finalized: i.finalized,
            created_at: i.created_at,
        }
    }
}

/// List the current user's interviews, newest first.
async fn get_my_interviews(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<InterviewResponse>>> {
    let interviews = state.db.get_interviews_for_user(&user.user_id).await?;
    Ok(Json(interviews.into_iter().map(Into::into).collect()))
}

#[derive(Deserialize)]
struct LatestQuery {
    #[serde(default = "default_latest_limit")]
    limit: u32,
}

fn default_latest_limit() -> u32 {
    20
}

const MAX_LATEST_LIMIT: u32 = 50;

/// Finalized interviews from other users, newest first.
async fn get_latest_interviews(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<LatestQuery>,
) -> Result<Json<Vec<InterviewResponse>>> {
    if params.limit == 0 {
        return Err(AppError::BadRequest(
            "limit must be greater than 0".to_string(),
        ));
    }
    let limit = params.limit.min(MAX_LATEST_LIMIT);

    let interviews = state
        .db
        .get_latest_interviews(&user.user_id, limit)
        .await?;
    Ok(Json(interviews.into_iter().map(Into::into).collect()))
}

/// Get one interview by ID.
async fn get_interview(
    State(state): State<Arc<AppState>>,
    Path(interview_id): Path<String>,
) -> Result<Json<InterviewResponse>> {
    let interview = state
        .db
        .get_interview(&interview_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {} not found", interview_id)))?;
    Ok(Json(interview.into()))
}

// ─── Voice Interview Quota ───────────────────────────────────

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct QuotaResponse {
    pub has_subscription: bool,
    /// Voice interviews already scored
    pub count: usize,
    /// Voice interviews allowed without a subscription
    pub limit: usize,
    pub can_start_voice_interview: bool,
}

/// Whether the current user may start another voice interview.
async fn get_interview_quota(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<QuotaResponse>> {
    let has_subscription = state
        .db
        .get_user(&user.user_id)
        .await?
        .map(|u| u.subscription)
        .unwrap_or(false);
    let count = state
        .db
        .count_feedback(&user.user_id, FeedbackType::Voice)
        .await?;
    let limit = state.config.free_voice_interviews;

    Ok(Json(QuotaResponse {
        has_subscription,
        count,
        limit,
        can_start_voice_interview: has_subscription || count < limit,
    }))
}

// ─── Feedback ────────────────────────────────────────────────

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FeedbackResponse {
    pub id: String,
    pub interview_id: String,
    pub total_score: f64,
    #[cfg_attr(feature = "binding-generation", ts(skip))]
    pub category_scores: Vec<CategoryScore>,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub final_assessment: String,
    pub created_at: String,
}

impl From<Feedback> for FeedbackResponse {
    fn from(f: Feedback) -> Self {
        Self {
            id: f.id,
            interview_id: f.interview_id,
            total_score: f.total_score,
            category_scores: f.category_scores,
            strengths: f.strengths,
            areas_for_improvement: f.areas_for_improvement,
            final_assessment: f.final_assessment,
            created_at: f.created_at,
        }
    }
}

/// Get the current user's feedback for an interview.
async fn get_interview_feedback(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(interview_id): Path<String>,
) -> Result<Json<FeedbackResponse>> {
    let feedback = state
        .db
        .get_feedback_for_interview(&interview_id, &user.user_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No feedback for interview {}", interview_id))
        })?;
    Ok(Json(feedback.into()))
}

/// Body of `POST /api/feedback`. The user comes from the session.
#[derive(Deserialize, Validate, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackRequest {
    #[validate(length(min = 1, max = 128))]
    pub interview_id: String,
    pub transcript: Option<Vec<TranscriptTurn>>,
    pub general_questions: Option<GeneralAnswers>,
    pub actual_questions: Option<Vec<QuestionAnswer>>,
    #[serde(rename = "type")]
    pub feedback_type: Option<FeedbackType>,
}

/// Score a finished interview and store the feedback.
///
/// Pipeline failures are reported in the body as `{success: false}` with a
/// 200 status; only malformed requests are rejected.
async fn create_feedback(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreateFeedbackRequest>,
) -> Result<Json<CreateFeedbackOutcome>> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let params = CreateFeedbackParams {
        interview_id: body.interview_id,
        user_id: user.user_id,
        transcript: body.transcript,
        general_questions: body.general_questions,
        actual_questions: body.actual_questions,
        feedback_type: body.feedback_type,
    };
    params
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    Ok(Json(state.feedback.create_feedback(params).await))
}

// ─── Leaderboard ─────────────────────────────────────────────

/// Top scorers across all users.
async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LeaderboardEntry>>> {
    let entries = leaderboard::top_scores(state.db.as_ref()).await?;
    Ok(Json(entries))
}

// ─── Account Data Removal ────────────────────────────────────

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RemoveDataResponse {
    pub success: bool,
    pub message: String,
    pub interviews_removed: usize,
    pub feedbacks_removed: usize,
}

/// Delete all of the user's interviews and feedback and reset the
/// subscription. The profile stays.
async fn remove_user_data(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<RemoveDataResponse>> {
    tracing::info!(user_id = %user.user_id, "User-initiated data removal");

    let summary = state.db.delete_user_data(&user.user_id).await?;

    Ok(Json(RemoveDataResponse {
        success: true,
        message: "User data removed successfully".to_string(),
        interviews_removed: summary.interviews_removed,
        feedbacks_removed: summary.feedback_removed,
    }))
}
