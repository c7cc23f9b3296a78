//! Core table logic – records, ordering, sorting, and HTML output.
//!
//! Nothing in this module depends on any TUI or rendering crate.
//! Every type is `Send + Sync` so it can be shared across async tasks.

pub mod collate;
pub mod markup;
pub mod record;
pub mod table;
