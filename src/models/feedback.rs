// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Feedback model: the persisted outcome of scoring one interview, plus the
//! structured result the scoring model must return.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Highest score for a single category or for the whole interview.
pub const MAX_SCORE: f64 = 100.0;

/// The five fixed evaluation categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    CommunicationSkills,
    TechnicalKnowledge,
    ProblemSolving,
    CulturalRoleFit,
    ConfidenceClarity,
}

impl Category {
    /// All categories, in prompt order.
    pub const ALL: [Category; 5] = [
        Category::CommunicationSkills,
        Category::TechnicalKnowledge,
        Category::ProblemSolving,
        Category::CulturalRoleFit,
        Category::ConfidenceClarity,
    ];

    /// Display name, as stored in `categoryScores[].name`.
    pub fn name(self) -> &'static str {
        match self {
            Category::CommunicationSkills => "Communication Skills",
            Category::TechnicalKnowledge => "Technical Knowledge",
            Category::ProblemSolving => "Problem-Solving",
            Category::CulturalRoleFit => "Cultural & Role Fit",
            Category::ConfidenceClarity => "Confidence & Clarity",
        }
    }

    /// What the evaluator looks at for this category.
    pub fn description(self) -> &'static str {
        match self {
            Category::CommunicationSkills => "Clarity, articulation, structured responses.",
            Category::TechnicalKnowledge => "Understanding of key concepts for the role.",
            Category::ProblemSolving => "Ability to analyze problems and propose solutions.",
            Category::CulturalRoleFit => "Alignment with company values and job role.",
            Category::ConfidenceClarity => {
                "Confidence in responses, engagement, and clarity."
            }
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the interview was conducted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    Voice,
    Text,
}

impl FeedbackType {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackType::Voice => "voice",
            FeedbackType::Text => "text",
        }
    }
}

/// Score and comment for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub name: String,
    pub score: f64,
    #[serde(default)]
    pub comment: String,
}

/// Structured result returned by the scoring model.
///
/// Only constructed through [`ScoredFeedback::validate`] by the scoring
/// client, so holders can rely on the category and range rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredFeedback {
    pub total_score: f64,
    pub category_scores: Vec<CategoryScore>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_improvement: Vec<String>,
    #[serde(default)]
    pub final_assessment: String,
}

/// Why a scored result was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("total score {0} is out of range 0..=100")]
    TotalOutOfRange(f64),

    #[error("expected 5 categories, got {0}")]
    CategoryCount(usize),

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("category '{0}' appears more than once")]
    DuplicateCategory(String),

    #[error("category '{name}' score {score} is out of range 0..=100")]
    CategoryOutOfRange { name: String, score: f64 },
}

impl ScoredFeedback {
    /// Check the fixed-category contract: a total in range and exactly one
    /// in-range score for each of the five categories.
    pub fn validate(self) -> Result<Self, ShapeError> {
        if !in_range(self.total_score) {
            return Err(ShapeError::TotalOutOfRange(self.total_score));
        }
        if self.category_scores.len() != Category::ALL.len() {
            return Err(ShapeError::CategoryCount(self.category_scores.len()));
        }

        let mut seen = HashSet::new();
        for entry in &self.category_scores {
            let category = Category::from_name(&entry.name)
                .ok_or_else(|| ShapeError::UnknownCategory(entry.name.clone()))?;
            if !seen.insert(category) {
                return Err(ShapeError::DuplicateCategory(entry.name.clone()));
            }
            if !in_range(entry.score) {
                return Err(ShapeError::CategoryOutOfRange {
                    name: entry.name.clone(),
                    score: entry.score,
                });
            }
        }

        Ok(self)
    }
}

/// Scores may be fractional but must be finite and within `0..=MAX_SCORE`.
fn in_range(score: f64) -> bool {
    (0.0..=MAX_SCORE).contains(&score)
}

/// Stored `totalScore` may be an integer, a float, null or absent.
fn score_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Stored feedback record in Firestore. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    #[serde(alias = "_firestore_id", default, skip_serializing)]
    pub id: String,
    pub interview_id: String,
    pub user_id: String,
    /// Missing or null on some legacy records; counts as zero.
    #[serde(default, deserialize_with = "score_or_zero")]
    pub total_score: f64,
    #[serde(default)]
    pub category_scores: Vec<CategoryScore>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_improvement: Vec<String>,
    #[serde(default)]
    pub final_assessment: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub feedback_type: Option<FeedbackType>,
    pub created_at: String,
}

impl Feedback {
    /// Build a new record from a validated scoring result.
    pub fn from_scored(
        id: String,
        interview_id: String,
        user_id: String,
        feedback_type: FeedbackType,
        scored: ScoredFeedback,
        created_at: String,
    ) -> Self {
        Self {
            id,
            interview_id,
            user_id,
            total_score: scored.total_score,
            category_scores: scored.category_scores,
            strengths: scored.strengths,
            areas_for_improvement: scored.areas_for_improvement,
            final_assessment: scored.final_assessment,
            feedback_type: Some(feedback_type),
            created_at,
        }
    }
}
