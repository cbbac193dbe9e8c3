//! Test Module
//!
//! Cross-module test suite for the Pathfinder core.
//!
//! ## Test Categories
//! - `advisor_tests`: Rule precedence, classifier fallback, corpus feedback loop
//! - `database_tests`: SQLite corpus store and seeding
//! - `actor_tests`: Advisor actor, persistence and retraining behavior
