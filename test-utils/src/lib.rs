//! Alliance Dispatch Test Utils
//!
//! Shared testing utilities for the alliance dispatch crate. The main component
//! is a scriptable stand-in for the game API, served over real HTTP on an
//! ephemeral local port so the HTTP upstream can be tested end to end.
//!
//! # Overview
//!
//! - **MockGameApi**: Local axum server exposing the player and health routes
//! - **MockReply**: Canned answer the player route returns
//! - **TestError**: Error types that can occur during test setup
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::mock_api::{MockGameApi, MockReply};
//!
//! #[tokio::test]
//! async fn test_rate_limit() -> Result<(), TestError> {
//!     let api = MockGameApi::start().await?;
//!     api.set_reply(MockReply::RateLimited { retry_after: Some(30) });
//!
//!     // Point an HTTP upstream at api.base_url()...
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod mock_api;
