// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile and subscription flag)
//! - Interviews (generated question sets)
//! - Feedback (scored interview results)

use crate::db::{collections, Datastore, DeletionSummary};
use crate::error::AppError;
use crate::models::{Feedback, FeedbackType, Interview, User};
use async_trait::async_trait;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Fetch every document in `collection` whose `userId` equals `user_id`.
    async fn query_by_user<T>(&self, collection: &str, user_id: &str) -> Result<Vec<T>, AppError>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(move |q| q.field("userId").eq(user_id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}

#[async_trait]
impl Datastore for FirestoreDb {
    // ─── User Operations ─────────────────────────────────────────

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        let user: Option<User> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(user.map(|mut u| {
            u.id = user_id.to_string();
            u
        }))
    }

    async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn set_subscription(&self, user_id: &str, subscription: bool) -> Result<(), AppError> {
        // Fetch-modify-write to preserve other fields
        let mut user = self
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        user.subscription = subscription;
        self.upsert_user(&user).await?;

        tracing::info!(user_id, subscription, "Subscription updated");
        Ok(())
    }

    // ─── Interview Operations ────────────────────────────────────

    async fn get_interview(&self, interview_id: &str) -> Result<Option<Interview>, AppError> {
        let interview: Option<Interview> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::INTERVIEWS)
            .obj()
            .one(interview_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(interview.map(|mut i| {
            i.id = interview_id.to_string();
            i
        }))
    }

    async fn upsert_interview(&self, interview: &Interview) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::INTERVIEWS)
            .document_id(&interview.id)
            .object(interview)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get_interviews_for_user(&self, user_id: &str) -> Result<Vec<Interview>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::INTERVIEWS)
            .filter(move |q| q.field("userId").eq(user_id.clone()))
            .order_by([("createdAt", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn get_latest_interviews(
        &self,
        exclude_user_id: &str,
        limit: u32,
    ) -> Result<Vec<Interview>, AppError> {
        // At most `own` of the newest finalized interviews belong to the
        // caller, so `limit + own` rows always hold `limit` from others.
        let own = self
            .get_interviews_for_user(exclude_user_id)
            .await?
            .into_iter()
            .filter(|i| i.finalized)
            .count();
        let fetch = limit.saturating_add(u32::try_from(own).unwrap_or(u32::MAX));

        let interviews: Vec<Interview> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::INTERVIEWS)
            .filter(|q| q.for_all([q.field("finalized").eq(true)]))
            .order_by([("createdAt", firestore::FirestoreQueryDirection::Descending)])
            .limit(fetch)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(interviews
            .into_iter()
            .filter(|i| i.user_id != exclude_user_id)
            .take(limit as usize)
            .collect())
    }

    // ─── Feedback Operations ─────────────────────────────────────

    async fn insert_feedback(&self, feedback: &Feedback) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::FEEDBACK)
            .document_id(&feedback.id)
            .object(feedback)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get_feedback_for_interview(
        &self,
        interview_id: &str,
        user_id: &str,
    ) -> Result<Option<Feedback>, AppError> {
        let interview_id = interview_id.to_string();
        let user_id = user_id.to_string();
        let mut results: Vec<Feedback> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::FEEDBACK)
            .filter(move |q| {
                q.for_all([
                    q.field("interviewId").eq(interview_id.clone()),
                    q.field("userId").eq(user_id.clone()),
                ])
            })
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(results.pop())
    }

    async fn list_feedback(&self) -> Result<Vec<Feedback>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::FEEDBACK)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn count_feedback(
        &self,
        user_id: &str,
        feedback_type: FeedbackType,
    ) -> Result<usize, AppError> {
        let user_id = user_id.to_string();
        let results: Vec<Feedback> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::FEEDBACK)
            .filter(move |q| {
                q.for_all([
                    q.field("userId").eq(user_id.clone()),
                    q.field("type").eq(feedback_type.as_str()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(results.len())
    }

    // ─── User Data Deletion ──────────────────────────────────────

    /// Deletes from:
    /// - `interviews` (query by userId)
    /// - `feedback` (query by userId)
    ///
    /// then resets `users/{user_id}.subscription` to false. A missing profile
    /// is reported before anything is deleted.
    async fn delete_user_data(&self, user_id: &str) -> Result<DeletionSummary, AppError> {
        let mut user = self
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let interviews: Vec<Interview> =
            self.query_by_user(collections::INTERVIEWS, user_id).await?;
        self.batch_delete(&interviews, collections::INTERVIEWS, |i: &Interview| {
            i.id.clone()
        })
        .await?;
        tracing::debug!(user_id, count = interviews.len(), "Deleted interviews");

        let feedback: Vec<Feedback> = self.query_by_user(collections::FEEDBACK, user_id).await?;
        self.batch_delete(&feedback, collections::FEEDBACK, |f: &Feedback| {
            f.id.clone()
        })
        .await?;
        tracing::debug!(user_id, count = feedback.len(), "Deleted feedback");

        user.subscription = false;
        self.upsert_user(&user).await?;

        let summary = DeletionSummary {
            interviews_removed: interviews.len(),
            feedback_removed: feedback.len(),
        };
        tracing::info!(
            user_id,
            interviews_removed = summary.interviews_removed,
            feedback_removed = summary.feedback_removed,
            "User data deletion complete"
        );

        Ok(summary)
    }
}
