//! User configuration — keybindings, auto-sort timing, and persistence.
//!
//! Settings are stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/movie-table/config.toml` (default
//! `~/.config/movie-table/config.toml`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::record::Field;

pub const DEFAULT_STEP_MS: u64 = 2000;
const STEP_MS_RANGE: (u64, u64) = (100, 60_000);

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions in the table view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    SortId,
    SortTitle,
    SortYear,
    SortImdb,
    ToggleAutoSort,
    ClearMarkers,
    MoveUp,
    MoveDown,
    ShowHelp,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for the help popup).
    pub const ALL: &[Action] = &[
        Action::SortId,
        Action::SortTitle,
        Action::SortYear,
        Action::SortImdb,
        Action::ToggleAutoSort,
        Action::ClearMarkers,
        Action::MoveUp,
        Action::MoveDown,
        Action::ShowHelp,
        Action::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Action::SortId => "Sort by id",
            Action::SortTitle => "Sort by title",
            Action::SortYear => "Sort by year",
            Action::SortImdb => "Sort by imdb",
            Action::ToggleAutoSort => "Start / stop auto-sort",
            Action::ClearMarkers => "Clear sort markers",
            Action::MoveUp => "Move Up",
            Action::MoveDown => "Move Down",
            Action::ShowHelp => "Show help",
            Action::Quit => "Quit",
        }
    }

    /// The column a sort action targets.
    pub fn sort_field(self) -> Option<Field> {
        match self {
            Action::SortId => Some(Field::Id),
            Action::SortTitle => Some(Field::Title),
            Action::SortYear => Some(Field::Year),
            Action::SortImdb => Some(Field::Imdb),
            _ => None,
        }
    }

    fn config_key(self) -> &'static str {
        match self {
            Action::SortId => "sort_id",
            Action::SortTitle => "sort_title",
            Action::SortYear => "sort_year",
            Action::SortImdb => "sort_imdb",
            Action::ToggleAutoSort => "toggle_auto_sort",
            Action::ClearMarkers => "clear_markers",
            Action::MoveUp => "move_up",
            Action::MoveDown => "move_down",
            Action::ShowHelp => "help",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding — key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

fn modifier_mask() -> KeyModifiers {
    KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Only CTRL/ALT/SHIFT are compared; SUPER and friends are ignored.
    /// SHIFT is also ignored for characters, since terminals report `?` as
    /// Shift+`?` on some layouts.
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mut mask = modifier_mask();
        if matches!(self.code, KeyCode::Char(_)) {
            mask.remove(KeyModifiers::SHIFT);
        }
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// Short form for the UI (e.g. `"Ctrl+c"`, `"↑"`).
    pub fn display(&self) -> String {
        self.render(true)
    }

    /// Config-file form (e.g. `"Ctrl+c"`, `"Up"`).
    fn to_config_string(&self) -> String {
        self.render(false)
    }

    fn render(&self, pretty: bool) -> String {
        let mut s = String::new();
        for (flag, name) in [
            (KeyModifiers::CONTROL, "Ctrl+"),
            (KeyModifiers::ALT, "Alt+"),
            (KeyModifiers::SHIFT, "Shift+"),
        ] {
            if self.modifiers.contains(flag) {
                s.push_str(name);
            }
        }
        let key = match (self.code, pretty) {
            (KeyCode::Char(' '), _) => "Space".to_string(),
            (KeyCode::Char(c), _) => c.to_string(),
            (KeyCode::Up, true) => "↑".into(),
            (KeyCode::Down, true) => "↓".into(),
            (KeyCode::Up, false) => "Up".into(),
            (KeyCode::Down, false) => "Down".into(),
            (KeyCode::Left, _) => "Left".into(),
            (KeyCode::Right, _) => "Right".into(),
            (KeyCode::Enter, _) => "Enter".into(),
            (KeyCode::Esc, _) => "Esc".into(),
            (KeyCode::Tab, _) => "Tab".into(),
            (KeyCode::Home, _) => "Home".into(),
            (KeyCode::End, _) => "End".into(),
            (KeyCode::F(n), _) => format!("F{n}"),
            (other, _) => format!("{other:?}"),
        };
        s.push_str(&key);
        s
    }

    /// Parse a key string like `"Ctrl+c"`, `"Up"`, `"1"`, `"Space"`.
    fn parse(s: &str) -> Option<Self> {
        let (mods, key) = match s.rsplit_once('+') {
            // A bare "+" is the plus key, not an empty modifier list.
            Some((mods, key)) if !key.is_empty() => (mods, key),
            _ => ("", s),
        };

        let mut modifiers = KeyModifiers::NONE;
        for part in mods.split('+').filter(|p| !p.is_empty()) {
            modifiers |= match part.to_lowercase().as_str() {
                "ctrl" => KeyModifiers::CONTROL,
                "alt" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                _ => return None,
            };
        }

        let code = match key.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "space" => KeyCode::Char(' '),
            lower if lower.starts_with('f') && lower.len() > 1 => KeyCode::F(lower[1..].parse().ok()?),
            _ if key.chars().count() == 1 => KeyCode::Char(key.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── config ────────────

/// Application configuration — keybindings and auto-sort timing.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Delay between the ascending and descending sort of one auto-sort field.
    pub auto_sort_step_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            auto_sort_step_ms: DEFAULT_STEP_MS,
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(SortId, vec![KeyBind::new(Char('1'), n)]);
        m.insert(SortTitle, vec![KeyBind::new(Char('2'), n)]);
        m.insert(SortYear, vec![KeyBind::new(Char('3'), n)]);
        m.insert(SortImdb, vec![KeyBind::new(Char('4'), n)]);
        m.insert(ToggleAutoSort, vec![KeyBind::new(Char('a'), n)]);
        m.insert(ClearMarkers, vec![KeyBind::new(Char('c'), n)]);
        m.insert(MoveUp, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(MoveDown, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(ShowHelp, vec![KeyBind::new(Char('?'), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n)]);

        m
    }

    pub fn auto_sort_step(&self) -> Duration {
        Duration::from_millis(self.auto_sort_step_ms)
    }

    pub fn set_auto_sort_step_ms(&mut self, ms: u64) {
        self.auto_sort_step_ms = ms.clamp(STEP_MS_RANGE.0, STEP_MS_RANGE.1);
    }

    /// Find the action bound to a key event.  When several bindings match,
    /// the one with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .flat_map(|(&action, binds)| binds.iter().map(move |b| (action, b)))
            .filter(|(_, bind)| bind.matches(event))
            .max_by_key(|(_, bind)| bind.modifiers.bits().count_ones())
            .map(|(action, _)| action)
    }

    /// Format the binding list for a given action (e.g. `"↑/k"`).
    pub fn display_bindings(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => {
                binds.iter().map(|b| b.display()).collect::<Vec<_>>().join("/")
            }
            _ => "unbound".into(),
        }
    }

    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action).and_then(|b| b.first()) {
            Some(bind) => bind.display(),
            None => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}-{}: sort | {}: auto-sort | {}: clear | {}: help | {}: quit",
            self.short_binding(Action::SortId),
            self.short_binding(Action::SortImdb),
            self.short_binding(Action::ToggleAutoSort),
            self.short_binding(Action::ClearMarkers),
            self.short_binding(Action::ShowHelp),
            self.short_binding(Action::Quit),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from the default location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "unreadable config, using defaults");
                Self::default()
            }
        }
    }

    /// Persist the config to the default location and return where it went.
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let path = config_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.serialise())?;
        Ok(())
    }

    fn parse(s: &str) -> Self {
        let mut config = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            if key == "auto_sort_step_ms" {
                match value.parse::<u64>() {
                    Ok(ms) => config.set_auto_sort_step_ms(ms),
                    Err(_) => tracing::warn!(value, "ignoring invalid auto_sort_step_ms"),
                }
                continue;
            }

            let Some(action) = Action::from_config_key(key) else {
                tracing::debug!(key, "ignoring unknown config key");
                continue;
            };

            let parsed: Vec<KeyBind> = value
                .split(',')
                .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                .collect();
            if !parsed.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }

        config
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# movie-table configuration".to_string(),
            String::new(),
            "# Milliseconds between the ascending and descending auto-sort step".to_string(),
            format!("auto_sort_step_ms = {}", self.auto_sort_step_ms),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(|b| b.to_config_string()).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/movie-table/config.toml`).
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("movie-table").join("config.toml")
}
