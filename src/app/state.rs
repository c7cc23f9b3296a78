//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::core::table::RecordTable;
use crate::ui::table_widget::TableWidgetState;

use super::auto_sort::{AutoSorter, SortCommand};

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Table,
    Help,
}

/// Top-level application state.
pub struct AppState {
    /// The rendered movie table.
    pub table: RecordTable,
    /// Widget-level state (selection, scroll).
    pub table_state: TableWidgetState,
    /// Where the records came from, shown in the table title.
    pub source: String,
    /// User-configurable keybindings and timing.
    pub config: AppConfig,
    /// Auto-sort scheduler.  Its commands arrive on the main loop's channel.
    pub auto_sort: AutoSorter,
    /// Which view / overlay is currently shown.
    pub active_view: ActiveView,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(
        table: RecordTable,
        source: String,
        config: AppConfig,
        sort_tx: mpsc::UnboundedSender<SortCommand>,
    ) -> Self {
        let auto_sort = AutoSorter::new(config.auto_sort_step(), sort_tx);
        Self {
            table,
            table_state: TableWidgetState::default(),
            source,
            config,
            auto_sort,
            active_view: ActiveView::default(),
            should_quit: false,
            status_message: None,
        }
    }

    /// Text for the bottom bar.
    pub fn status_line(&self) -> String {
        if let Some(msg) = &self.status_message {
            return msg.clone();
        }
        if self.auto_sort.is_running() {
            let sorted = match self.table.active_sort() {
                Some((field, direction)) => format!(" · {field} {direction:?}"),
                None => String::new(),
            };
            return format!(
                "auto-sort every {} ms{sorted} | {}: stop",
                self.auto_sort.step().as_millis(),
                self.config.display_bindings(crate::config::Action::ToggleAutoSort),
            );
        }
        self.config.status_bar_hint()
    }
}
