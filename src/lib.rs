//! # Eyerest - activity-based eye rest reminder
//!
//! Counts the time a user is actually engaged with the computer, either
//! typing and moving the mouse or listening to audio, and asks them to rest
//! their eyes once a configurable amount of active time has accumulated.
//! Short idle gaps pause the count without resetting it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use eyerest::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod commands;
pub mod libs;
