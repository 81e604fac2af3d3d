// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard service: loads users and feedback and ranks them.

use crate::db::Datastore;
use crate::error::AppError;
use crate::models::leaderboard::{compute_leaderboard, LeaderboardEntry};

/// Recompute the top scorers from the full `users` and `feedback`
/// collections. No caching: each call reads everything.
pub async fn top_scores(db: &dyn Datastore) -> Result<Vec<LeaderboardEntry>, AppError> {
    let users = db.list_users().await?;
    let feedback = db.list_feedback().await?;

    let entries = compute_leaderboard(&users, &feedback);

    tracing::debug!(
        users = users.len(),
        feedback = feedback.len(),
        ranked = entries.len(),
        "Leaderboard computed"
    );

    Ok(entries)
}
