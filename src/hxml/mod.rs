//! Argument-file (`.hxml`) support: tokenizer and recognised option flags.

pub mod flags;
pub mod tokenizer;

pub use flags::{FlagSet, LibrarySpec};
pub use tokenizer::{tokenize, tokenize_file};
