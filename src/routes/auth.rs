// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session routes.
//!
//! Sign-in happens against the identity provider; the backend only ends
//! sessions by expiring the cookie.

use crate::middleware::auth::SESSION_COOKIE;
use crate::AppState;
use axum::{http::StatusCode, routing::post, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/logout", post(logout))
}

/// Clear the session cookie.
async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, StatusCode::NO_CONTENT)
}
