// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard rows derived from users and their feedback.
//!
//! Nothing here is persisted: every request rebuilds the ranking from the
//! full `users` and `feedback` collections.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{Feedback, User};

/// Number of rows returned by the leaderboard.
pub const LEADERBOARD_SIZE: usize = 20;

/// Points available per completed interview.
const POINTS_PER_INTERVIEW: u64 = 100;

/// One ranked user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardEntry {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Sum of `totalScore` over the user's feedback
    pub total_impressions: f64,
    /// `total_interviews * 100`
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub max_possible_score: u64,
    pub total_interviews: u32,
    pub average_score: f64,
}

impl LeaderboardEntry {
    /// Aggregate one user's row by scanning all feedback.
    pub fn for_user(user: &User, feedback: &[Feedback]) -> Self {
        let mut total_interviews = 0u32;
        let mut total_impressions = 0.0;
        for record in feedback.iter().filter(|f| f.user_id == user.id) {
            total_interviews += 1;
            total_impressions += record.total_score;
        }

        let average_score = if total_interviews > 0 {
            total_impressions / f64::from(total_interviews)
        } else {
            0.0
        };

        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            photo_url: user.photo_url.clone(),
            total_impressions,
            max_possible_score: u64::from(total_interviews) * POINTS_PER_INTERVIEW,
            total_interviews,
            average_score,
        }
    }
}

/// Rank users by cumulative feedback score and keep the top
/// [`LEADERBOARD_SIZE`].
///
/// Sorting is stable, so users with equal totals keep their input order.
/// The second sort after truncation leaves the order unchanged; it keeps the
/// output non-increasing even if the first pass changes.
pub fn compute_leaderboard(users: &[User], feedback: &[Feedback]) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = users
        .iter()
        .map(|user| LeaderboardEntry::for_user(user, feedback))
        .collect();

    entries.sort_by(|a, b| b.total_impressions.total_cmp(&a.total_impressions));
    entries.truncate(LEADERBOARD_SIZE);
    entries.sort_by(|a, b| b.total_impressions.total_cmp(&a.total_impressions));

    entries
}
