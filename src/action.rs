//! Actions: user intents and query results

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::sprite::SpriteData;
use crate::state::{DetailRecord, FocusArea, SummaryRecord};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    /// Mount: issue the list query, plus the detail query if the location carries an id
    Init,

    // ===== Search category =====
    /// Pending search text changed (no fetch)
    SearchInput(String),

    /// Promote pending text to committed and re-run the list query
    SearchCommit,

    // ===== Navigation =====
    /// Go to a location path; the selected id is re-read from it
    Navigate(String),

    // ===== Query results =====
    SummariesDidLoad {
        search: String,
        records: Vec<SummaryRecord>,
    },
    SummariesDidError {
        search: String,
        error: String,
    },
    DetailDidLoad {
        id: String,
        records: Vec<DetailRecord>,
    },
    DetailDidError {
        id: String,
        error: String,
    },
    SpriteDidLoad {
        url: String,
        sprite: SpriteData,
    },
    SpriteDidError {
        url: String,
        error: String,
    },

    // ===== Focus / cursor =====
    FocusNext,
    FocusPrev,
    FocusSet(FocusArea),
    CursorMove(i32),
    CursorSet(usize),

    /// Force a re-render (for text cursor movement, etc.)
    Render,

    /// Spinner animation tick
    Tick,

    Quit,
}
