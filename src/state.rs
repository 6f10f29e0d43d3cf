//! Application state - single source of truth

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;

use crate::query::{search_pattern, SearchMode};
use crate::route::Route;
use crate::sprite::SpriteData;

/// Decoded artwork keyed by sprite URL
pub type SpriteCache = HashMap<String, DataResource<SpriteData>>;

/// One card in the catalog grid
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SummaryRecord {
    pub id: String,
    pub name: Option<String>,
    /// One slot per type association; `None` where the type has no English name
    pub types: Vec<Option<String>>,
    pub sprite: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StatEntry {
    pub name: Option<String>,
    pub base_stat: Option<u32>,
}

/// Full record shown in the detail overlay
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetailRecord {
    pub id: String,
    pub name: Option<String>,
    pub types: Vec<Option<String>>,
    pub sprite: Option<String>,
    /// Tenths of a kilogram
    pub weight: u32,
    /// Tenths of a meter
    pub height: u32,
    pub capture_rate: Option<u32>,
    pub stats: Vec<StatEntry>,
}

impl SummaryRecord {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn types_label(&self) -> String {
        types_label(&self.types)
    }
}

impl DetailRecord {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn types_label(&self) -> String {
        types_label(&self.types)
    }

    pub fn height_label(&self) -> String {
        format!("{} m", format_tenths(self.height))
    }

    pub fn weight_label(&self) -> String {
        format!("{} kg", format_tenths(self.weight))
    }

    pub fn capture_rate_label(&self) -> String {
        self.capture_rate
            .map(|rate| rate.to_string())
            .unwrap_or_default()
    }
}

impl StatEntry {
    /// Stat name with its first character upper-cased (`special-attack` -> `Special-attack`)
    pub fn label(&self) -> String {
        let name = self.name.as_deref().unwrap_or("");
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn value_label(&self) -> String {
        self.base_stat
            .map(|value| value.to_string())
            .unwrap_or_default()
    }
}

/// Joins the named types, skipping gaps; `Unknown` when nothing is left
pub fn types_label(types: &[Option<String>]) -> String {
    let names: Vec<&str> = types
        .iter()
        .filter_map(|name| name.as_deref())
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        "Unknown".to_string()
    } else {
        names.join(", ")
    }
}

/// Renders a tenths value the way a plain division would print it: `7` -> `0.7`, `100` -> `10`
pub fn format_tenths(value: u32) -> String {
    let whole = value / 10;
    let frac = value % 10;
    if frac == 0 {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    }
}

/// Search text buffers
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchState {
    /// Uncommitted input buffer, updated on every edit
    pub pending: String,
    /// Value the list query is filtered by, updated only on submit
    pub committed: String,
    pub mode: SearchMode,
}

impl SearchState {
    /// Filter pattern for the list query
    pub fn pattern(&self) -> String {
        search_pattern(&self.committed, self.mode)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum FocusArea {
    SearchInput,
    SearchButton,
    #[default]
    Cards,
}

impl FocusArea {
    pub fn next(self) -> Self {
        match self {
            FocusArea::SearchInput => FocusArea::SearchButton,
            FocusArea::SearchButton => FocusArea::Cards,
            FocusArea::Cards => FocusArea::SearchInput,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FocusArea::SearchInput => FocusArea::Cards,
            FocusArea::SearchButton => FocusArea::SearchInput,
            FocusArea::Cards => FocusArea::SearchButton,
        }
    }
}

pub const SPINNER_TICK_MS: u64 = 90;

/// Application state - everything the UI needs to render
#[derive(Clone, Debug, tui_dispatch::DebugState, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppState {
    /// Current location path; the selected id is read from it on demand
    #[debug(section = "Route", label = "Location")]
    pub location: String,

    #[debug(section = "Search", label = "Search", debug_fmt)]
    pub search: SearchState,

    /// List query lifecycle
    #[debug(section = "Queries", label = "Summaries", debug_fmt)]
    pub summaries: DataResource<Vec<SummaryRecord>>,

    /// Detail query lifecycle; stays `Empty` while nothing is selected
    #[debug(section = "Queries", label = "Detail", debug_fmt)]
    pub detail: DataResource<Vec<DetailRecord>>,

    #[debug(section = "Status", label = "Message", debug_fmt)]
    pub message: Option<String>,

    /// Artwork lifecycle per sprite URL, shared by cards and the overlay
    #[debug(skip)]
    pub sprites: SpriteCache,

    // --- Presentation internals ---
    #[debug(section = "Ui", label = "Focus", debug_fmt)]
    pub focus: FocusArea,

    #[debug(section = "Ui", label = "Cursor")]
    pub cursor: usize,

    #[debug(skip)]
    pub tick: u64,
}

impl AppState {
    pub fn new(location: impl Into<String>, mode: SearchMode) -> Self {
        Self {
            location: location.into(),
            search: SearchState {
                mode,
                ..SearchState::default()
            },
            summaries: DataResource::Empty,
            detail: DataResource::Empty,
            message: None,
            sprites: SpriteCache::new(),
            focus: FocusArea::default(),
            cursor: 0,
            tick: 0,
        }
    }

    pub fn route(&self) -> Route {
        Route::parse(&self.location)
    }

    /// Selected record id, derived from the location every time it is asked for
    pub fn selected_id(&self) -> Option<String> {
        self.route().selected_id().map(str::to_string)
    }

    pub fn records(&self) -> &[SummaryRecord] {
        self.summaries.data().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn details(&self) -> &[DetailRecord] {
        self.detail.data().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cursor_record(&self) -> Option<&SummaryRecord> {
        self.records().get(self.cursor)
    }

    pub fn sprite(&self, url: Option<&str>) -> Option<&DataResource<SpriteData>> {
        self.sprites.get(url?)
    }

    pub fn is_loading(&self) -> bool {
        self.summaries.is_loading() || self.detail.is_loading()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Route::List.path(), SearchMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_label_falls_back_to_unknown() {
        assert_eq!(types_label(&[]), "Unknown");
        assert_eq!(types_label(&[None]), "Unknown");
        assert_eq!(types_label(&[Some(String::new()), None]), "Unknown");
        assert_eq!(
            types_label(&[None, Some("Fire".into()), Some("Flying".into())]),
            "Fire, Flying"
        );
    }

    #[test]
    fn test_tenths_formatting() {
        let detail = DetailRecord {
            weight: 100,
            height: 7,
            ..Default::default()
        };
        assert_eq!(detail.weight_label(), "10 kg");
        assert_eq!(detail.height_label(), "0.7 m");
        assert_eq!(format_tenths(0), "0");
    }
}
