// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard endpoint tests over the in-memory store.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use interview_prep::db::{Datastore, FirestoreDb};
use interview_prep::models::{Feedback, FeedbackType};
use interview_prep::services::leaderboard::top_scores;
use std::sync::Arc;
use tower::ServiceExt;

mod common;

async fn get_leaderboard(app: axum::Router, token: &str) -> serde_json::Value {
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/leaderboard")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    common::body_json(response).await
}

#[tokio::test]
async fn test_leaderboard_aggregates_per_user() {
    let (app, state, db) = common::create_test_app();
    db.upsert_user(&common::make_user("alice")).await.unwrap();
    db.upsert_user(&common::make_user("bob")).await.unwrap();
    for (id, user, score) in [("f1", "alice", 80), ("f2", "alice", 60), ("f3", "bob", 95)] {
        db.insert_feedback(&common::make_feedback(id, user, score, FeedbackType::Voice))
            .await
            .unwrap();
    }

    let token = common::session_token("alice", &state);
    let board = get_leaderboard(app, &token).await;
    let rows = board.as_array().unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], "alice");
    assert_eq!(rows[0]["totalInterviews"], 2);
    assert_eq!(rows[0]["totalImpressions"], 140.0);
    assert_eq!(rows[0]["maxPossibleScore"], 200);
    assert_eq!(rows[0]["averageScore"], 70.0);
    assert_eq!(rows[1]["id"], "bob");
    assert_eq!(rows[1]["totalImpressions"], 95.0);
}

#[tokio::test]
async fn test_leaderboard_truncates_to_twenty() {
    let (app, state, db) = common::create_test_app();
    for i in 0..25u32 {
        let user_id = format!("user-{:02}", i);
        db.upsert_user(&common::make_user(&user_id)).await.unwrap();
        // Distinct totals: user-NN scores NN + 50
        db.insert_feedback(&common::make_feedback(
            &format!("fb-{:02}", i),
            &user_id,
            i + 50,
            FeedbackType::Text,
        ))
        .await
        .unwrap();
    }

    let token = common::session_token("user-00", &state);
    let board = get_leaderboard(app, &token).await;
    let rows = board.as_array().unwrap();

    assert_eq!(rows.len(), 20);
    assert_eq!(rows[0]["id"], "user-24");
    assert_eq!(rows[19]["id"], "user-05");
    let totals: Vec<f64> = rows
        .iter()
        .map(|r| r["totalImpressions"].as_f64().unwrap())
        .collect();
    assert!(totals.windows(2).all(|w| w[0] > w[1]));
}

#[tokio::test]
async fn test_leaderboard_includes_users_without_feedback() {
    let (app, state, db) = common::create_test_app();
    db.upsert_user(&common::make_user("quiet")).await.unwrap();

    let token = common::session_token("quiet", &state);
    let board = get_leaderboard(app, &token).await;

    assert_eq!(board[0]["totalInterviews"], 0);
    assert_eq!(board[0]["averageScore"], 0.0);
}

#[tokio::test]
async fn test_leaderboard_reads_legacy_fractional_scores() {
    let (app, state, db) = common::create_test_app();
    db.upsert_user(&common::make_user("legacy")).await.unwrap();
    db.upsert_user(&common::make_user("modern")).await.unwrap();

    // Records written by the existing web app carry whatever number the
    // model returned, or no score at all.
    let legacy: Feedback = serde_json::from_value(serde_json::json!({
        "_firestore_id": "old-1",
        "interviewId": "int-old-1",
        "userId": "legacy",
        "totalScore": 72.5,
        "createdAt": "2024-11-02T09:15:00.000Z"
    }))
    .unwrap();
    let unscored: Feedback = serde_json::from_value(serde_json::json!({
        "_firestore_id": "old-2",
        "interviewId": "int-old-2",
        "userId": "legacy",
        "totalScore": null,
        "createdAt": "2024-11-03T09:15:00.000Z"
    }))
    .unwrap();
    db.insert_feedback(&legacy).await.unwrap();
    db.insert_feedback(&unscored).await.unwrap();
    db.insert_feedback(&common::make_feedback("new-1", "modern", 72, FeedbackType::Voice))
        .await
        .unwrap();

    let token = common::session_token("modern", &state);
    let board = get_leaderboard(app, &token).await;
    let rows = board.as_array().unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], "legacy");
    assert_eq!(rows[0]["totalImpressions"], 72.5);
    assert_eq!(rows[0]["totalInterviews"], 2);
    assert_eq!(rows[0]["averageScore"], 36.25);
    assert_eq!(rows[1]["id"], "modern");
    assert_eq!(rows[1]["totalImpressions"], 72.0);
}

#[tokio::test]
async fn test_leaderboard_store_failure() {
    let db = Arc::new(FirestoreDb::new_mock());
    let result = top_scores(db.as_ref()).await;
    assert!(result.is_err());
}
