//! Input handling — maps key events and auto-sort steps to state mutations.

use anyhow::{bail, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::Action;
use crate::core::record::{Field, SortDirection};

use super::auto_sort::SortCommand;
use super::event::AppEvent;
use super::state::{ActiveView, AppState};

/// Rows of chrome around the table body: two borders, the header line and
/// the status bar.
const TABLE_CHROME_HEIGHT: u16 = 4;

/// Dispatch one terminal event.  `None` means the event reader has gone
/// away, which leaves no way to quit, so it is reported as an error.
pub fn handle_event(state: &mut AppState, event: Option<AppEvent>) -> Result<()> {
    match event {
        Some(AppEvent::Key(key)) => handle_key(state, key),
        Some(AppEvent::Resize(_, height)) => handle_resize(state, height),
        Some(AppEvent::Tick) => {}
        None => bail!("terminal event reader stopped"),
    }
    Ok(())
}

/// Keep the selection visible after the terminal height changes.
pub fn handle_resize(state: &mut AppState, height: u16) {
    let body = height.saturating_sub(TABLE_CHROME_HEIGHT) as usize;
    state.table_state.clamp_scroll(body);
}

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match state.active_view {
        ActiveView::Table => handle_table_key(state, key),
        ActiveView::Help => handle_help_key(state, key),
    }
}

fn handle_help_key(state: &mut AppState, key: KeyEvent) {
    let closes = key.code == KeyCode::Esc
        || matches!(
            state.config.match_key(key),
            Some(Action::ShowHelp | Action::Quit)
        );
    if closes {
        state.active_view = ActiveView::Table;
    }
}

fn handle_table_key(state: &mut AppState, key: KeyEvent) {
    // Navigation keys that should always work in table view.
    match key.code {
        KeyCode::Home => {
            state.table_state.selected = 0;
            return;
        }
        KeyCode::End => {
            state.table_state.selected = state.table.len().saturating_sub(1);
            return;
        }
        _ => {}
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };
    state.status_message = None;

    match action {
        Action::Quit => state.should_quit = true,
        Action::ShowHelp => state.active_view = ActiveView::Help,
        Action::MoveUp => state.table_state.select_prev(),
        Action::MoveDown => state.table_state.select_next(state.table.len()),
        Action::ClearMarkers => {
            state.table.clear_sort_markers();
            state.status_message = Some("sort markers cleared".into());
        }
        Action::ToggleAutoSort => {
            if state.auto_sort.is_running() {
                state.auto_sort.stop();
                state.status_message = Some("auto-sort stopped".into());
            } else {
                start_auto_sort(state);
            }
        }
        Action::SortId | Action::SortTitle | Action::SortYear | Action::SortImdb => {
            if let Some(field) = action.sort_field() {
                sort_manually(state, field);
            }
        }
    }
}

/// Start auto-sort and apply its entry sort before returning.
pub fn start_auto_sort(state: &mut AppState) {
    let (field, direction) = state.auto_sort.start();
    sort_by(state, field, direction);
}

fn sort_by(state: &mut AppState, field: Field, direction: SortDirection) {
    match direction {
        SortDirection::Ascending => state.table.sort_ascending(field),
        SortDirection::Descending => state.table.sort_descending(field),
    }
}

/// Sort by `field`, ascending on first press and flipping direction when the
/// same column is pressed again.  A manual sort takes over from auto-sort.
fn sort_manually(state: &mut AppState, field: Field) {
    if state.auto_sort.is_running() {
        state.auto_sort.stop();
    }
    let direction = match state.table.active_sort() {
        Some((active, direction)) if active == field => direction.flipped(),
        _ => SortDirection::Ascending,
    };
    sort_by(state, field, direction);
    tracing::debug!(%field, ?direction, "manual sort");
}

/// Apply one auto-sort step if it belongs to the running auto-sort.
/// Returns whether the table changed.
pub fn apply_sort_command(state: &mut AppState, command: SortCommand) -> bool {
    if !state.auto_sort.accepts(&command) {
        tracing::trace!(?command, "dropping stale auto-sort step");
        return false;
    }
    sort_by(state, command.field, command.direction);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::core::record::Record;
    use crate::core::table::RecordTable;
    use tokio::sync::mpsc;

    fn state() -> (AppState, mpsc::UnboundedReceiver<SortCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let table = RecordTable::new(vec![
            Record::new(1, "B", 2000, 5.0),
            Record::new(2, "A", 1999, 9.5),
            Record::new(3, "C", 2005, 7.0),
        ]);
        (AppState::new(table, "test".into(), AppConfig::default(), tx), rx)
    }

    fn press(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn record_ids(state: &AppState) -> Vec<i64> {
        state.table.rows().iter().map(|r| r.record.id).collect()
    }

    #[test]
    fn repeated_column_key_flips_direction() {
        let (mut state, _rx) = state();
        handle_key(&mut state, press('3'));
        assert_eq!(record_ids(&state), vec![2, 1, 3]);
        assert_eq!(
            state.table.active_sort(),
            Some((Field::Year, SortDirection::Ascending))
        );

        handle_key(&mut state, press('3'));
        assert_eq!(record_ids(&state), vec![3, 1, 2]);

        // Switching column starts ascending again.
        handle_key(&mut state, press('2'));
        assert_eq!(
            state.table.active_sort(),
            Some((Field::Title, SortDirection::Ascending))
        );
    }

    #[test]
    fn clear_key_removes_markers() {
        let (mut state, _rx) = state();
        handle_key(&mut state, press('4'));
        handle_key(&mut state, press('c'));
        handle_key(&mut state, press('c'));
        assert_eq!(state.table.active_sort(), None);
    }

    #[test]
    fn help_opens_and_closes() {
        let (mut state, _rx) = state();
        handle_key(&mut state, press('?'));
        assert_eq!(state.active_view, ActiveView::Help);
        // Sort keys are inert while help is open.
        handle_key(&mut state, press('1'));
        assert_eq!(state.table.active_sort(), None);
        handle_key(&mut state, KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(state.active_view, ActiveView::Table);
    }

    #[test]
    fn navigation_and_quit() {
        let (mut state, _rx) = state();
        handle_key(&mut state, press('j'));
        handle_key(&mut state, press('j'));
        handle_key(&mut state, press('j'));
        assert_eq!(state.table_state.selected, 2);
        handle_key(&mut state, KeyEvent::new(KeyCode::Home, KeyModifiers::NONE));
        assert_eq!(state.table_state.selected, 0);

        handle_key(&mut state, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(state.should_quit);
    }

    #[tokio::test(start_paused = true)]
    async fn starting_auto_sort_sorts_immediately() {
        let (mut state, _rx) = state();
        handle_key(&mut state, press('4'));
        assert_eq!(record_ids(&state), vec![1, 3, 2]);

        handle_key(&mut state, press('a'));
        assert!(state.auto_sort.is_running());
        assert_eq!(
            state.table.active_sort(),
            Some((Field::Id, SortDirection::Ascending))
        );
        assert_eq!(record_ids(&state), vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn start_then_stop_keeps_the_entry_sort() {
        let (mut state, mut rx) = state();
        handle_key(&mut state, press('4'));
        handle_key(&mut state, press('a'));
        handle_key(&mut state, press('a'));
        assert!(!state.auto_sort.is_running());

        tokio::time::sleep(std::time::Duration::from_secs(10)).await;
        let mut applied = 0;
        while let Ok(cmd) = rx.try_recv() {
            if apply_sort_command(&mut state, cmd) {
                applied += 1;
            }
        }
        assert!(applied <= 1);
        assert_eq!(
            state.table.active_sort(),
            Some((Field::Id, SortDirection::Ascending))
        );
        assert_eq!(record_ids(&state), vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_sort_stops_auto_sort_and_drops_its_steps() {
        let (mut state, mut rx) = state();
        handle_key(&mut state, press('a'));

        let descend = rx.recv().await.unwrap();
        assert!(apply_sort_command(&mut state, descend));
        assert_eq!(
            state.table.active_sort(),
            Some((Field::Id, SortDirection::Descending))
        );
        assert_eq!(record_ids(&state), vec![3, 2, 1]);

        handle_key(&mut state, press('2'));
        assert!(!state.auto_sort.is_running());

        // Anything still queued from the stopped run is ignored.
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        while let Ok(cmd) = rx.try_recv() {
            assert!(!apply_sort_command(&mut state, cmd));
        }
        assert_eq!(
            state.table.active_sort(),
            Some((Field::Title, SortDirection::Ascending))
        );
    }

    #[test]
    fn resize_keeps_selection_visible() {
        let (mut state, _rx) = state();
        state.table_state.selected = 2;
        // Four rows of chrome leave a single body row.
        handle_event(&mut state, Some(AppEvent::Resize(80, 5))).unwrap();
        assert_eq!(state.table_state.offset, 2);

        state.table_state.selected = 0;
        handle_event(&mut state, Some(AppEvent::Resize(80, 24))).unwrap();
        assert_eq!(state.table_state.offset, 0);
    }

    #[test]
    fn closed_event_stream_is_an_error() {
        let (mut state, _rx) = state();
        handle_event(&mut state, Some(AppEvent::Tick)).unwrap();
        handle_event(&mut state, Some(AppEvent::Key(press('q')))).unwrap();
        assert!(state.should_quit);

        let err = handle_event(&mut state, None).unwrap_err();
        assert!(err.to_string().contains("event reader stopped"));
    }

    #[tokio::test(start_paused = true)]
    async fn status_line_reports_auto_sort() {
        let (mut state, _rx) = state();
        assert!(state.status_line().contains("auto-sort"));
        handle_key(&mut state, press('a'));
        assert!(state.status_line().starts_with("auto-sort every 2000 ms"));
        handle_key(&mut state, press('a'));
        assert_eq!(state.status_line(), "auto-sort stopped");
    }
}
