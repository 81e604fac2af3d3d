// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Feedback synthesis: turn a finished interview into one scored, persisted
//! feedback record.
//!
//! Flow:
//! 1. Format the transcript and/or written answers into prompt sections
//! 2. Ask the scoring model for a structured result
//! 3. Store the result as a new `feedback` document
//!
//! Every failure collapses into `{success: false}`; nothing is written unless
//! scoring succeeded.

use crate::db::Datastore;
use crate::error::AppError;
use crate::models::{Category, Feedback, FeedbackType};
use crate::services::scoring::{ScoringError, ScoringModel};
use crate::time_utils::format_utc_rfc3339;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;
use validator::Validate;

/// System instruction sent with every scoring request.
pub const SYSTEM_INSTRUCTION: &str = "You are a professional interviewer analyzing a mock interview. \
Your task is to evaluate the candidate based on structured categories";

/// One turn of a voice interview transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptTurn {
    pub role: String,
    pub content: String,
}

/// Free-text answers to the fixed opening questions of a text interview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralAnswers {
    pub introduction: String,
    pub motivation: String,
    pub experience: String,
}

/// A role-specific question with the candidate's written answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

/// Input to [`FeedbackSynthesizer::create_feedback`].
#[derive(Debug, Clone, Validate)]
pub struct CreateFeedbackParams {
    #[validate(length(min = 1, message = "interviewId must not be empty"))]
    pub interview_id: String,
    #[validate(length(min = 1, message = "userId must not be empty"))]
    pub user_id: String,
    pub transcript: Option<Vec<TranscriptTurn>>,
    pub general_questions: Option<GeneralAnswers>,
    pub actual_questions: Option<Vec<QuestionAnswer>>,
    /// Defaults to voice when a transcript is present, text otherwise.
    pub feedback_type: Option<FeedbackType>,
}

impl CreateFeedbackParams {
    pub fn resolved_type(&self) -> FeedbackType {
        self.feedback_type.unwrap_or(if self.transcript.is_some() {
            FeedbackType::Voice
        } else {
            FeedbackType::Text
        })
    }
}

/// Why a synthesis attempt failed. Logged, never returned to callers.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringError),

    #[error("storing feedback failed: {0}")]
    Store(#[from] AppError),
}

/// Uniform result of a synthesis attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_id: Option<String>,
}

impl CreateFeedbackOutcome {
    fn created(feedback_id: String) -> Self {
        Self {
            success: true,
            feedback_id: Some(feedback_id),
        }
    }

    fn failed() -> Self {
        Self {
            success: false,
            feedback_id: None,
        }
    }
}

// ─── Prompt formatting ───────────────────────────────────────

/// `- {role}: {content}` per turn; empty when there is no transcript.
pub fn format_transcript(transcript: Option<&[TranscriptTurn]>) -> String {
    let mut out = String::new();
    for turn in transcript.unwrap_or_default() {
        let _ = writeln!(out, "- {}: {}", turn.role, turn.content);
    }
    out
}

/// Fixed three-field block; empty when the answers are absent.
pub fn format_general_answers(answers: Option<&GeneralAnswers>) -> String {
    match answers {
        Some(a) => format!(
            "General Questions:\n- Introduction: {}\n- Motivation: {}\n- Experience: {}\n",
            a.introduction, a.motivation, a.experience
        ),
        None => String::new(),
    }
}

/// Question/answer pairs under a header; empty when absent.
pub fn format_question_answers(pairs: Option<&[QuestionAnswer]>) -> String {
    let Some(pairs) = pairs else {
        return String::new();
    };

    let mut out = String::from("Actual Questions and Answers:\n");
    for qa in pairs {
        let _ = writeln!(out, "- Question: {}\n  Answer: {}", qa.question, qa.answer);
    }
    out
}

/// Assemble the full evaluation prompt.
pub fn build_prompt(params: &CreateFeedbackParams) -> String {
    let transcript = format_transcript(params.transcript.as_deref());
    let general = format_general_answers(params.general_questions.as_ref());
    let answers = format_question_answers(params.actual_questions.as_deref());

    let mut prompt = String::from(
        "You are an AI interviewer analyzing a mock interview. Your task is to evaluate the \
candidate based on structured categories. Be thorough and detailed in your analysis. Don't be \
lenient with the candidate. If there are mistakes or areas for improvement, point them out.\n\n",
    );

    if !transcript.is_empty() {
        prompt.push_str("Transcript:\n");
        prompt.push_str(&transcript);
        prompt.push('\n');
    }
    if !general.is_empty() {
        prompt.push_str(&general);
        prompt.push('\n');
    }
    if !answers.is_empty() {
        prompt.push_str(&answers);
        prompt.push('\n');
    }

    prompt.push_str(
        "Please score the candidate from 0 to 100 in the following areas. \
Do not add categories other than the ones provided:\n",
    );
    for category in Category::ALL {
        let _ = writeln!(prompt, "- **{}**: {}", category.name(), category.description());
    }
    prompt.push_str(
        "\nAlso give an overall totalScore from 0 to 100, a list of strengths, a list of areas \
for improvement, and a final assessment.\n",
    );

    prompt
}

// ─── Synthesizer ─────────────────────────────────────────────

/// Scores finished interviews and stores the feedback.
#[derive(Clone)]
pub struct FeedbackSynthesizer {
    db: Arc<dyn Datastore>,
    scorer: Arc<dyn ScoringModel>,
}

impl FeedbackSynthesizer {
    pub fn new(db: Arc<dyn Datastore>, scorer: Arc<dyn ScoringModel>) -> Self {
        Self { db, scorer }
    }

    /// Score and persist feedback, reporting only success or failure.
    ///
    /// Concurrent calls for the same interview each create their own record.
    pub async fn create_feedback(&self, params: CreateFeedbackParams) -> CreateFeedbackOutcome {
        let interview_id = params.interview_id.clone();
        let user_id = params.user_id.clone();

        match self.try_create_feedback(params).await {
            Ok(feedback_id) => {
                tracing::info!(
                    interview_id = %interview_id,
                    user_id = %user_id,
                    feedback_id = %feedback_id,
                    "Feedback created"
                );
                CreateFeedbackOutcome::created(feedback_id)
            }
            Err(e) => {
                tracing::error!(
                    interview_id = %interview_id,
                    user_id = %user_id,
                    error = %e,
                    "Error saving feedback"
                );
                CreateFeedbackOutcome::failed()
            }
        }
    }

    async fn try_create_feedback(
        &self,
        params: CreateFeedbackParams,
    ) -> Result<String, SynthesisError> {
        let feedback_type = params.resolved_type();
        let prompt = build_prompt(&params);

        tracing::debug!(
            interview_id = %params.interview_id,
            feedback_type = feedback_type.as_str(),
            prompt_len = prompt.len(),
            "Requesting interview score"
        );

        let scored = self.scorer.score(&prompt, SYSTEM_INSTRUCTION).await?;

        let feedback = Feedback::from_scored(
            uuid::Uuid::new_v4().simple().to_string(),
            params.interview_id,
            params.user_id,
            feedback_type,
            scored,
            format_utc_rfc3339(chrono::Utc::now()),
        );

        self.db.insert_feedback(&feedback).await?;
        Ok(feedback.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{FirestoreDb, MemoryDb};
    use crate::models::{CategoryScore, ScoredFeedback};

    fn params() -> CreateFeedbackParams {
        CreateFeedbackParams {
            interview_id: "int-1".to_string(),
            user_id: "user-1".to_string(),
            transcript: None,
            general_questions: None,
            actual_questions: None,
            feedback_type: None,
        }
    }

    #[test]
    fn test_format_transcript_lines() {
        let turns = vec![
            TranscriptTurn {
                role: "assistant".to_string(),
                content: "Tell me about yourself.".to_string(),
            },
            TranscriptTurn {
                role: "user".to_string(),
                content: "I build backends.".to_string(),
            },
        ];
        assert_eq!(
            format_transcript(Some(turns.as_slice())),
            "- assistant: Tell me about yourself.\n- user: I build backends.\n"
        );
    }

    #[test]
    fn test_format_question_answers() {
        let pairs = vec![QuestionAnswer {
            question: "What is a lifetime?".to_string(),
            answer: "A scope for references.".to_string(),
        }];
        assert_eq!(
            format_question_answers(Some(pairs.as_slice())),
            "Actual Questions and Answers:\n- Question: What is a lifetime?\n  Answer: A scope for references.\n"
        );
    }

    #[test]
    fn test_absent_sections_are_empty() {
        assert_eq!(format_transcript(None), "");
        assert_eq!(format_transcript(Some(&[][..])), "");
        assert_eq!(format_general_answers(None), "");
        assert_eq!(format_question_answers(None), "");
    }

    #[test]
    fn test_prompt_without_input_still_lists_categories() {
        let prompt = build_prompt(&params());

        assert!(!prompt.contains("Transcript:"));
        assert!(!prompt.contains("General Questions:"));
        assert!(prompt.contains("Don't be lenient"));
        assert!(prompt.contains("Do not add categories other than the ones provided"));
        for category in Category::ALL {
            assert!(prompt.contains(category.name()));
        }
    }

    #[test]
    fn test_prompt_includes_text_answers() {
        let mut p = params();
        p.general_questions = Some(GeneralAnswers {
            introduction: "Hi".to_string(),
            motivation: "Growth".to_string(),
            experience: "5 years".to_string(),
        });
        let prompt = build_prompt(&p);

        assert!(prompt.contains("General Questions:\n- Introduction: Hi\n- Motivation: Growth"));
    }

    #[test]
    fn test_resolved_type() {
        let mut p = params();
        assert_eq!(p.resolved_type(), FeedbackType::Text);

        p.transcript = Some(vec![]);
        assert_eq!(p.resolved_type(), FeedbackType::Voice);

        p.feedback_type = Some(FeedbackType::Text);
        assert_eq!(p.resolved_type(), FeedbackType::Text);
    }

    #[test]
    fn test_params_validation() {
        let mut p = params();
        assert!(p.validate().is_ok());

        p.interview_id = String::new();
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_outcome_serialization() {
        let ok = serde_json::to_value(CreateFeedbackOutcome::created("fb-1".to_string())).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true, "feedbackId": "fb-1"}));

        let failed = serde_json::to_value(CreateFeedbackOutcome::failed()).unwrap();
        assert_eq!(failed, serde_json::json!({"success": false}));
    }

    struct EmptyScorer;

    #[async_trait::async_trait]
    impl ScoringModel for EmptyScorer {
        async fn score(&self, _: &str, _: &str) -> Result<ScoredFeedback, ScoringError> {
            Err(ScoringError::EmptyContent)
        }
    }

    struct FixedScorer;

    #[async_trait::async_trait]
    impl ScoringModel for FixedScorer {
        async fn score(&self, _: &str, _: &str) -> Result<ScoredFeedback, ScoringError> {
            Ok(ScoredFeedback {
                total_score: 64.5,
                category_scores: Category::ALL
                    .iter()
                    .map(|c| CategoryScore {
                        name: c.name().to_string(),
                        score: 64.5,
                        comment: String::new(),
                    })
                    .collect(),
                strengths: vec![],
                areas_for_improvement: vec![],
                final_assessment: "Fine".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_failures_name_the_failing_stage() {
        let synthesizer =
            FeedbackSynthesizer::new(Arc::new(MemoryDb::new()), Arc::new(EmptyScorer));
        let err = synthesizer.try_create_feedback(params()).await.unwrap_err();
        assert!(matches!(
            err,
            SynthesisError::Scoring(ScoringError::EmptyContent)
        ));

        let synthesizer =
            FeedbackSynthesizer::new(Arc::new(FirestoreDb::new_mock()), Arc::new(FixedScorer));
        let err = synthesizer.try_create_feedback(params()).await.unwrap_err();
        assert!(matches!(err, SynthesisError::Store(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_fractional_score_is_stored() {
        let db = Arc::new(MemoryDb::new());
        let synthesizer = FeedbackSynthesizer::new(db.clone(), Arc::new(FixedScorer));

        let outcome = synthesizer.create_feedback(params()).await;

        assert!(outcome.success);
        let stored = db
            .get_feedback_for_interview("int-1", "user-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.total_score, 64.5);
    }
}
