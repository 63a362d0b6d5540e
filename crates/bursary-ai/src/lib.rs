//! Language-model plumbing for bursary packs.
//!
//! - [`prompt`] turns preferences and listings into a system/user message pair.
//!   Pure and deterministic.
//! - [`normalize`] turns the model's free-form reply into a [`PackResult`],
//!   degrading to a raw fallback instead of failing.
//! - [`client`] talks to a hosted chat-completion endpoint.
//!
//! # Quick start
//!
//! ```no_run
//! use bursary_ai::{normalize, prompt};
//! use bursary_core::preferences::Preferences;
//!
//! let prompt = prompt::build(&Preferences::default(), &[], &[]).unwrap();
//! assert!(prompt.user.contains("Available Accommodations"));
//! let result = normalize::normalize("```json\n[]\n```");
//! assert!(!result.is_fallback());
//! ```
//!
//! [`PackResult`]: bursary_core::pack::PackResult

pub mod client;
pub mod error;
pub mod normalize;
pub mod prompt;

pub use client::{CompletionConfig, HttpCompletionClient};
pub use error::{Error, Result};
