pub mod card_grid;
pub mod catalog_page;
pub mod detail_overlay;
pub mod search_bar;
pub mod sprite_view;

// Re-export core Component trait
pub use tui_dispatch::Component;

pub use card_grid::{open_record, CardGrid, CardGridProps, GridLayout};
pub use catalog_page::{
    page_title, CatalogPage, PageAreas, EMPTY_PAGE_TITLE, EMPTY_TEXT, LOADING_TEXT, PAGE_TITLE,
};
pub use detail_overlay::{dismiss_detail, DetailOverlayProps, DetailOverlayView, OverlayContent};
pub use search_bar::{SearchBar, SearchBarProps};
pub use sprite_view::SpriteView;

use crossterm::event::{KeyCode, KeyModifiers};
use tui_dispatch::EventKind;

/// Shared palette
pub mod theme {
    use ratatui::style::Color;

    pub const BG_BASE: Color = Color::Rgb(18, 20, 26);
    pub const BG_PANEL: Color = Color::Rgb(30, 33, 42);
    pub const BG_MODAL: Color = Color::Rgb(36, 40, 52);
    pub const TEXT_MAIN: Color = Color::Rgb(226, 228, 236);
    pub const TEXT_DIM: Color = Color::Rgb(128, 134, 150);
    pub const ACCENT_TEAL: Color = Color::Rgb(92, 200, 190);
    pub const ACCENT_GOLD: Color = Color::Rgb(236, 196, 92);
    pub const ACCENT_RED: Color = Color::Rgb(232, 96, 88);
}

/// Braille spinner frame for a tick count
pub fn spinner_frame(tick: u64) -> &'static str {
    const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    FRAMES[(tick % FRAMES.len() as u64) as usize]
}

/// Ctrl+C; no component consumes it so the global quit handler always sees it
pub fn is_quit_chord(event: &EventKind) -> bool {
    matches!(
        event,
        EventKind::Key(key)
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
    )
}
