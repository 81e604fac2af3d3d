// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
///
/// The document ID is the identity provider's user ID; it is not stored as a
/// field and is filled in from `_firestore_id` on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_firestore_id", default, skip_serializing)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Whether the one-time subscription was purchased
    #[serde(default)]
    pub subscription: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}
