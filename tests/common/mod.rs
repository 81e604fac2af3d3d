// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use interview_prep::config::Config;
use interview_prep::db::{Datastore, FirestoreDb, MemoryDb};
use interview_prep::middleware::auth::create_session_token;
use interview_prep::models::{Category, CategoryScore, Feedback, FeedbackType, ScoredFeedback, User};
use interview_prep::routes::create_router;
use interview_prep::services::{ScoringError, ScoringModel};
use interview_prep::AppState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Unique suffix for test isolation against a shared emulator.
#[allow(dead_code)]
pub fn unique_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

// ─── Scoring stubs ───────────────────────────────────────────

/// A valid result with every category at `score`.
#[allow(dead_code)]
pub fn scored_result(total_score: u32, score: u32) -> ScoredFeedback {
    ScoredFeedback {
        total_score: f64::from(total_score),
        category_scores: Category::ALL
            .iter()
            .map(|c| CategoryScore {
                name: c.name().to_string(),
                score: f64::from(score),
                comment: format!("{} comment", c.name()),
            })
            .collect(),
        strengths: vec!["Clear structure".to_string()],
        areas_for_improvement: vec!["More depth on trade-offs".to_string()],
        final_assessment: "Good effort.".to_string(),
    }
    .validate()
    .expect("stub result must be valid")
}

/// Scoring model that always returns the same result and records prompts.
#[allow(dead_code)]
pub struct FixedScorer {
    result: ScoredFeedback,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FixedScorer {
    pub fn new(result: ScoredFeedback) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ScoringModel for FixedScorer {
    async fn score(&self, prompt: &str, _system: &str) -> Result<ScoredFeedback, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.result.clone())
    }
}

/// Scoring model that always fails like an unavailable upstream.
#[allow(dead_code)]
pub struct FailingScorer {
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl FailingScorer {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ScoringModel for FailingScorer {
    async fn score(&self, _prompt: &str, _system: &str) -> Result<ScoredFeedback, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ScoringError::Api {
            status: 503,
            message: "model overloaded".to_string(),
        })
    }
}

// ─── Fixtures ────────────────────────────────────────────────

#[allow(dead_code)]
pub fn make_user(id: &str) -> User {
    User {
        id: id.to_string(),
        name: format!("User {}", id),
        email: format!("{}@example.com", id),
        subscription: false,
        created_at: Some("2025-01-01T00:00:00Z".to_string()),
        photo_url: None,
    }
}

#[allow(dead_code)]
pub fn make_feedback(id: &str, user_id: &str, total_score: u32, kind: FeedbackType) -> Feedback {
    Feedback::from_scored(
        id.to_string(),
        format!("interview-{}", id),
        user_id.to_string(),
        kind,
        scored_result(total_score, total_score),
        "2025-02-01T00:00:00Z".to_string(),
    )
}

// ─── App construction ────────────────────────────────────────

/// Create a test app over the given store and scorer.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app_with(
    db: Arc<dyn Datastore>,
    scorer: Arc<dyn ScoringModel>,
) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Config::test_default(), db, scorer));
    (create_router(state.clone()), state)
}

/// Create a test app with an empty in-memory store and a scorer that
/// returns 75 everywhere.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MemoryDb>) {
    let db = Arc::new(MemoryDb::new());
    let scorer = Arc::new(FixedScorer::new(scored_result(75, 75)));
    let (app, state) = create_test_app_with(db.clone(), scorer);
    (app, state, db)
}

/// Session token for `user_id` signed with the test key.
#[allow(dead_code)]
pub fn session_token(user_id: &str, state: &AppState) -> String {
    create_session_token(user_id, &state.config.session_signing_key).unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
