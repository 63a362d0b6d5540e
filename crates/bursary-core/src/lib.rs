//! Core types and trait definitions for the bursary pack service.
//!
//! No HTTP or database dependencies live here. Storage backends implement
//! [`store::PackStore`]; completion backends implement
//! [`completion::CompletionProvider`].

// Trait methods spell out `+ Send` on their futures, impls use `async fn`.
#![allow(async_fn_in_trait)]

pub mod cache;
pub mod completion;
pub mod error;
pub mod feature;
pub mod identity;
pub mod ledger;
pub mod listing;
pub mod pack;
pub mod preferences;
pub mod store;

pub use error::{Error, Result};
