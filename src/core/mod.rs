//! Core types shared by every hxdeps module.
//!
//! Currently this is the error layer: [`HxError`] for typed failures and
//! [`ErrorContext`] / [`user_friendly_error`] for presenting them.

pub mod error;

pub use error::{ErrorContext, HxError, user_friendly_error};
