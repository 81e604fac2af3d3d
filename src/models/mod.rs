// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod feedback;
pub mod interview;
pub mod leaderboard;
pub mod user;

pub use feedback::{Category, CategoryScore, Feedback, FeedbackType, ScoredFeedback};
pub use interview::Interview;
pub use leaderboard::LeaderboardEntry;
pub use user::User;
