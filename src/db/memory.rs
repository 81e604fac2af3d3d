// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory datastore for tests and local runs without Firestore.
//!
//! Listing follows Firestore's default ordering (by document ID).

use crate::db::{Datastore, DeletionSummary};
use crate::error::AppError;
use crate::models::{Feedback, FeedbackType, Interview, User};
use async_trait::async_trait;
use dashmap::DashMap;

/// Datastore backed by concurrent hash maps.
#[derive(Default)]
pub struct MemoryDb {
    users: DashMap<String, User>,
    interviews: DashMap<String, Interview>,
    feedback: DashMap<String, Feedback>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored feedback records.
    pub fn feedback_count(&self) -> usize {
        self.feedback.len()
    }
}

fn sorted_by_id<T: Clone>(map: &DashMap<String, T>) -> Vec<T> {
    let mut entries: Vec<(String, T)> = map
        .iter()
        .map(|e| (e.key().clone(), e.value().clone()))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries.into_iter().map(|(_, v)| v).collect()
}

#[async_trait]
impl Datastore for MemoryDb {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.get(user_id).map(|u| u.clone()))
    }

    async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(sorted_by_id(&self.users))
    }

    async fn set_subscription(&self, user_id: &str, subscription: bool) -> Result<(), AppError> {
        let mut user = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        user.subscription = subscription;
        Ok(())
    }

    async fn get_interview(&self, interview_id: &str) -> Result<Option<Interview>, AppError> {
        Ok(self.interviews.get(interview_id).map(|i| i.clone()))
    }

    async fn upsert_interview(&self, interview: &Interview) -> Result<(), AppError> {
        self.interviews
            .insert(interview.id.clone(), interview.clone());
        Ok(())
    }

    async fn get_interviews_for_user(&self, user_id: &str) -> Result<Vec<Interview>, AppError> {
        let mut interviews: Vec<Interview> = sorted_by_id(&self.interviews)
            .into_iter()
            .filter(|i| i.user_id == user_id)
            .collect();
        interviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(interviews)
    }

    async fn get_latest_interviews(
        &self,
        exclude_user_id: &str,
        limit: u32,
    ) -> Result<Vec<Interview>, AppError> {
        let mut interviews: Vec<Interview> = sorted_by_id(&self.interviews)
            .into_iter()
            .filter(|i| i.finalized && i.user_id != exclude_user_id)
            .collect();
        interviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        interviews.truncate(limit as usize);
        Ok(interviews)
    }

    async fn insert_feedback(&self, feedback: &Feedback) -> Result<(), AppError> {
        self.feedback.insert(feedback.id.clone(), feedback.clone());
        Ok(())
    }

    async fn get_feedback_for_interview(
        &self,
        interview_id: &str,
        user_id: &str,
    ) -> Result<Option<Feedback>, AppError> {
        Ok(sorted_by_id(&self.feedback)
            .into_iter()
            .find(|f| f.interview_id == interview_id && f.user_id == user_id))
    }

    async fn list_feedback(&self) -> Result<Vec<Feedback>, AppError> {
        Ok(sorted_by_id(&self.feedback))
    }

    async fn count_feedback(
        &self,
        user_id: &str,
        feedback_type: FeedbackType,
    ) -> Result<usize, AppError> {
        Ok(self
            .feedback
            .iter()
            .filter(|f| f.user_id == user_id && f.feedback_type == Some(feedback_type))
            .count())
    }

    async fn delete_user_data(&self, user_id: &str) -> Result<DeletionSummary, AppError> {
        if !self.users.contains_key(user_id) {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        let before_interviews = self.interviews.len();
        self.interviews.retain(|_, i| i.user_id != user_id);
        let before_feedback = self.feedback.len();
        self.feedback.retain(|_, f| f.user_id != user_id);

        self.set_subscription(user_id, false).await?;

        Ok(DeletionSummary {
            interviews_removed: before_interviews - self.interviews.len(),
            feedback_removed: before_feedback - self.feedback.len(),
        })
    }
}
