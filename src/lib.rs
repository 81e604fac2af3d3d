// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Interview-Prep: backend for AI mock interviews
//!
//! This crate scores finished mock interviews with a generative model,
//! stores the feedback, and ranks users on a leaderboard.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Datastore;
use services::FeedbackSynthesizer;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn Datastore>,
    pub feedback: FeedbackSynthesizer,
}

impl AppState {
    /// Wire the state from its collaborators.
    pub fn new(
        config: Config,
        db: Arc<dyn Datastore>,
        scorer: Arc<dyn services::ScoringModel>,
    ) -> Self {
        let feedback = FeedbackSynthesizer::new(db.clone(), scorer);
        Self {
            config,
            db,
            feedback,
        }
    }
}
