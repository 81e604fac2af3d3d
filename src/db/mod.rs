// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Handlers and services only see the [`Datastore`] trait; `main` picks the
//! Firestore implementation and tests use the in-memory one.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{Feedback, FeedbackType, Interview, User};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const INTERVIEWS: &str = "interviews";
    pub const FEEDBACK: &str = "feedback";
}

/// Counts returned by [`Datastore::delete_user_data`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletionSummary {
    pub interviews_removed: usize,
    pub feedback_removed: usize,
}

/// Document store operations used by the application.
#[async_trait]
pub trait Datastore: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError>;

    /// Create or replace a user record (keyed by `user.id`).
    async fn upsert_user(&self, user: &User) -> Result<(), AppError>;

    /// All users, in document ID order.
    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    /// Set the subscription flag on an existing user.
    async fn set_subscription(&self, user_id: &str, subscription: bool) -> Result<(), AppError>;

    // ─── Interviews ──────────────────────────────────────────────

    async fn get_interview(&self, interview_id: &str) -> Result<Option<Interview>, AppError>;

    /// Create or replace an interview record (keyed by `interview.id`).
    async fn upsert_interview(&self, interview: &Interview) -> Result<(), AppError>;

    /// A user's interviews, newest first.
    async fn get_interviews_for_user(&self, user_id: &str) -> Result<Vec<Interview>, AppError>;

    /// Finalized interviews owned by anyone except `exclude_user_id`, newest first.
    async fn get_latest_interviews(
        &self,
        exclude_user_id: &str,
        limit: u32,
    ) -> Result<Vec<Interview>, AppError>;

    // ─── Feedback ────────────────────────────────────────────────

    /// Store a new feedback record (keyed by `feedback.id`).
    async fn insert_feedback(&self, feedback: &Feedback) -> Result<(), AppError>;

    async fn get_feedback_for_interview(
        &self,
        interview_id: &str,
        user_id: &str,
    ) -> Result<Option<Feedback>, AppError>;

    /// Every feedback record, unfiltered.
    async fn list_feedback(&self) -> Result<Vec<Feedback>, AppError>;

    async fn count_feedback(
        &self,
        user_id: &str,
        feedback_type: FeedbackType,
    ) -> Result<usize, AppError>;

    // ─── User Data Deletion ──────────────────────────────────────

    /// Delete a user's interviews and feedback and clear their subscription.
    /// The user profile itself is kept.
    async fn delete_user_data(&self, user_id: &str) -> Result<DeletionSummary, AppError>;
}
