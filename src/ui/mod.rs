//! UI / rendering layer — everything that touches Ratatui widgets.
//!
//! This layer takes the *core* table and turns it into cells on the
//! terminal.  No sorting decisions happen here.

pub mod layout;
pub mod popup;
pub mod table_widget;
pub mod theme;
