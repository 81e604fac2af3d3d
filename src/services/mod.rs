// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod feedback;
pub mod leaderboard;
pub mod scoring;

pub use feedback::{CreateFeedbackOutcome, CreateFeedbackParams, FeedbackSynthesizer};
pub use scoring::{GeminiClient, ScoringError, ScoringModel};
