//! Turbonomic REST API integration module
//!
//! - `client`: HTTP client, login and request helpers
//! - `targets`: cloud account target lookup and credential rotation
//! - `actions`: realtime market action listing
//! - `accounts`: per cloud account action report

pub mod accounts;
pub mod actions;
pub mod client;
pub mod models;
pub mod targets;

pub use client::TurboClient;
pub use accounts::AccountPaging;
pub use models::{AccountActions, AccountEntry, ActionSummary, AwsKeys};
