//! AIOps Test Hub library.
//!
//! Core functionality for the test hub: configuration, persistence,
//! authentication, and the HTTP API for suites, cases, runs and settings.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
