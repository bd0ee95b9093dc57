//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up the test environment with a database
//! - An offline context whose pool never connects, for validation tests
//! - Cleanup helpers for the rows a test created
//!
//! # Requirements
//! Tests marked `requires database` need a PostgreSQL database (set DATABASE_URL).

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;

use spaced_review_backend::config::ReviewSettings;
use spaced_review_backend::db::Database;
use spaced_review_backend::services::review::ReviewProcessor;
use spaced_review_backend::{build_router, AppState};

/// Test context containing database connection and router.
pub struct TestContext {
    pub db: Arc<Database>,
    app: Router,
}

impl TestContext {
    /// Create a new test context backed by DATABASE_URL.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or the database connection fails.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url, 20)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        Self::with_database(db)
    }

    /// Create a context whose pool never connects.
    ///
    /// Use this for requests rejected before any store access.
    pub fn offline() -> Self {
        let db = Database::connect_lazy("postgres://reviews@localhost:1/reviews")
            .expect("Failed to build lazy pool");

        Self::with_database(db)
    }

    fn with_database(db: Database) -> Self {
        let db = Arc::new(db);
        let app = build_router(AppState::new(db.clone(), ReviewSettings::default()));
        Self { db, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Start a test server over the router.
    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).expect("Failed to start test server")
    }

    /// Review processor sharing this context's database.
    pub fn processor(&self) -> ReviewProcessor {
        self.processor_with(ReviewSettings::default())
    }

    /// Review processor with custom write-path tuning.
    pub fn processor_with(&self, settings: ReviewSettings) -> ReviewProcessor {
        ReviewProcessor::new(self.db.clone(), settings)
    }

    /// Clean up test data for a user.
    pub async fn cleanup_user(&self, user_id: &str) {
        let _ = sqlx::query("DELETE FROM review_records WHERE user_id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM user_card_states WHERE user_id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;
    }
}
