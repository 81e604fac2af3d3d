// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Interview model. Interviews are created by the question generator and
//! only read here.

use serde::{Deserialize, Serialize};

/// Stored interview record in Firestore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    #[serde(alias = "_firestore_id", default, skip_serializing)]
    pub id: String,
    /// Job role the interview targets
    pub role: String,
    /// Seniority level (Junior, Senior, ...)
    pub level: String,
    pub questions: Vec<String>,
    #[serde(default)]
    pub techstack: Vec<String>,
    /// Interview style (Technical, Behavioural, Mixed)
    #[serde(rename = "type")]
    pub interview_type: String,
    pub user_id: String,
    #[serde(default)]
    pub finalized: bool,
    /// Creation time (ISO 8601)
    pub created_at: String,
}
