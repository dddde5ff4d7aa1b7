//! GitHub infrastructure adapter.
//!
//! Implements [`relay::StatusPublisher`] against the GitHub commit status
//! REST API (`POST /repos/{owner}/{repo}/statuses/{sha}`) using `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. Headers,
//! timeouts, and error-body parsing are handled here; the [`relay`] crate
//! only sees [`relay::RelayError::Publish`] or
//! [`relay::RelayError::Transport`].

pub mod statuses;

pub use statuses::{GithubConfig, GithubStatusPublisher, DEFAULT_API_BASE, DEFAULT_TIMEOUT};
