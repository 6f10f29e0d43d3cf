use artbox::{
    integrations::ratatui::ArtBox, Alignment as ArtAlignment, Color as ArtColor, ColorStop, Fill,
    LinearGradient, Renderer, fonts,
};
use crossterm::event::{KeyCode, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};
use tui_dispatch::{DataResource, EventKind};
use tui_dispatch_components::{
    BaseStyle, Padding, StatusBar, StatusBarHint, StatusBarProps, StatusBarSection, StatusBarStyle,
};

use super::{
    spinner_frame, theme, CardGrid, CardGridProps, Component, DetailOverlayProps,
    DetailOverlayView, OverlayContent, SearchBar, SearchBarProps,
};
use crate::action::Action;
use crate::sprite::SpriteData;
use crate::state::{AppState, FocusArea};
use crate::view::{derive_view, with_view, DetailOverlay, ViewInputs, ViewState};

pub const PAGE_TITLE: &str = "Pokémon List";
/// The empty-result screen keeps the unaccented heading
pub const EMPTY_PAGE_TITLE: &str = "Pokemon List";
pub const EMPTY_TEXT: &str = "No Pokémon Found";
pub const LOADING_TEXT: &str = "Loading Pokémon...";

const TITLE_HEIGHT: u16 = 5;
const SEARCH_HEIGHT: u16 = 3;

/// Screen regions from the last render, for mouse hit-testing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageAreas {
    pub search: Option<Rect>,
    pub cards: Option<Rect>,
    pub overlay: Option<Rect>,
}

/// The whole catalog screen: title, search row, card grid, status bar, detail overlay
pub struct CatalogPage {
    search: SearchBar,
    grid: CardGrid,
    overlay: DetailOverlayView,
    status_bar: StatusBar,
}

impl Default for CatalogPage {
    fn default() -> Self {
        Self {
            search: SearchBar::new(),
            grid: CardGrid::new(),
            overlay: DetailOverlayView::new(),
            status_bar: StatusBar::new(),
        }
    }
}

fn title_fill() -> Fill {
    let stops = vec![
        ColorStop::new(0.0, ArtColor::rgb(236, 196, 92)),
        ColorStop::new(0.5, ArtColor::rgb(240, 120, 90)),
        ColorStop::new(1.0, ArtColor::rgb(92, 200, 190)),
    ];
    Fill::Linear(LinearGradient::new(0.0, stops))
}

fn status_bar_style() -> StatusBarStyle {
    StatusBarStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: Some(theme::BG_PANEL),
            fg: None,
        },
        text: Style::default().fg(theme::TEXT_MAIN),
        hint_key: Style::default()
            .fg(theme::ACCENT_GOLD)
            .add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(theme::TEXT_DIM),
        separator: Style::default().fg(theme::TEXT_DIM),
    }
}

fn status_hints(view: &ViewState<'_>, focus: FocusArea) -> Vec<StatusBarHint<'static>> {
    let hint = |key: &'static str, label: &'static str| StatusBarHint::new(key, label);
    if view.is_modal() {
        return vec![hint("Esc", "Close"), hint("Ctrl+C", "Quit")];
    }
    match focus {
        FocusArea::SearchInput => vec![
            hint("Enter", "Search"),
            hint("Tab", "Focus"),
            hint("Esc", "Cards"),
        ],
        FocusArea::SearchButton => vec![
            hint("Enter/Space", "Search"),
            hint("Tab", "Focus"),
            hint("Esc", "Cards"),
        ],
        FocusArea::Cards => vec![
            hint("Arrows", "Move"),
            hint("Enter", "Open"),
            hint("/", "Search"),
            hint("Tab", "Focus"),
            hint("q", "Quit"),
        ],
    }
}

fn overlay_content<'a>(view: &ViewState<'a>, tick: u64) -> Option<OverlayContent<'a>> {
    match *view {
        ViewState::DetailLoading => Some(OverlayContent::Loading { tick }),
        ViewState::DetailError(message) => Some(OverlayContent::Error(message)),
        ViewState::Populated {
            overlay: Some(overlay),
            ..
        } => Some(OverlayContent::Record(overlay)),
        _ => None,
    }
}

pub fn page_title(view: &ViewState<'_>) -> &'static str {
    match view {
        ViewState::Empty => EMPTY_PAGE_TITLE,
        _ => PAGE_TITLE,
    }
}

fn overlay_artwork<'a>(
    content: &OverlayContent<'a>,
    state: &'a AppState,
) -> Option<&'a DataResource<SpriteData>> {
    match content {
        OverlayContent::Record(DetailOverlay {
            detail: Some(detail),
            ..
        }) => state.sprite(detail.sprite.as_deref()),
        _ => None,
    }
}

fn centered_line(frame: &mut Frame, area: Rect, line: Line<'_>) {
    let rows = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .split(area);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), rows[1]);
}

impl CatalogPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, state: &AppState) -> PageAreas {
        let selected = state.selected_id();
        let view = derive_view(&ViewInputs::from_state(state, selected.as_deref()));
        self.render_view(frame, area, state, view)
    }

    /// Draws `view` using the buffers, focus and artwork in `state`
    pub fn render_view(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        view: ViewState<'_>,
    ) -> PageAreas {
        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_BASE).fg(theme::TEXT_MAIN)),
            area,
        );

        let chunks = Layout::vertical([
            Constraint::Length(TITLE_HEIGHT),
            Constraint::Length(SEARCH_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);
        let mut areas = PageAreas::default();

        let renderer = Renderer::new(fonts::stack(&["terminus", "miniwi"]))
            .with_plain_fallback()
            .with_alignment(ArtAlignment::Center)
            .with_fill(title_fill());
        frame.render_widget(ArtBox::new(&renderer, page_title(&view)), chunks[0]);

        match view {
            ViewState::ListLoading => {
                let line = Line::from(vec![
                    Span::styled(
                        format!("{} ", spinner_frame(state.tick)),
                        Style::default().fg(theme::ACCENT_TEAL),
                    ),
                    Span::raw(LOADING_TEXT),
                ]);
                centered_line(frame, chunks[2], line);
            }
            ViewState::ListError(message) => {
                let line = Line::from(Span::styled(
                    format!("Error: {message}"),
                    Style::default().fg(theme::ACCENT_RED),
                ));
                centered_line(frame, chunks[2], line);
            }
            _ => {
                let focus = if view.shows_search() {
                    state.focus
                } else {
                    FocusArea::Cards
                };
                self.search.render(
                    frame,
                    chunks[1],
                    SearchBarProps {
                        value: &state.search.pending,
                        focus,
                    },
                );
                areas.search = Some(chunks[1]);

                let records = state.records();
                if records.is_empty() {
                    let line = Line::from(Span::styled(
                        EMPTY_TEXT,
                        Style::default().fg(theme::TEXT_DIM),
                    ));
                    centered_line(frame, chunks[2], line);
                } else {
                    self.grid.render(
                        frame,
                        chunks[2],
                        CardGridProps {
                            records,
                            sprites: &state.sprites,
                            cursor: state.cursor,
                            is_focused: focus == FocusArea::Cards && !view.is_modal(),
                        },
                    );
                    areas.cards = Some(chunks[2]);
                }
            }
        }

        self.render_status(frame, chunks[3], &view, state);

        if let Some(content) = overlay_content(&view, state.tick) {
            self.overlay.render(
                frame,
                area,
                DetailOverlayProps {
                    artwork: overlay_artwork(&content, state),
                    content,
                    is_focused: true,
                },
            );
            areas.overlay = Some(area);
        }
        areas
    }

    fn render_status(&mut self, frame: &mut Frame, area: Rect, view: &ViewState<'_>, state: &AppState) {
        let message_width = state
            .message
            .as_ref()
            .map(|message| (message.chars().count() as u16 + 2).min(area.width / 2))
            .unwrap_or(0);
        let chunks =
            Layout::horizontal([Constraint::Min(1), Constraint::Length(message_width)]).split(area);

        let hints = status_hints(view, state.focus);
        let props = StatusBarProps {
            left: StatusBarSection::hints(&hints),
            center: StatusBarSection::hints(&[]),
            right: StatusBarSection::hints(&[]),
            style: status_bar_style(),
            is_focused: false,
        };
        <StatusBar as Component<Action>>::render(&mut self.status_bar, frame, chunks[0], props);

        if let Some(message) = &state.message {
            let text = Paragraph::new(message.as_str())
                .alignment(Alignment::Right)
                .style(Style::default().fg(theme::ACCENT_RED).bg(theme::BG_PANEL));
            frame.render_widget(text, chunks[1]);
        }
    }

    pub fn handle_search_event(&mut self, event: &EventKind, state: &AppState) -> Vec<Action> {
        // Hidden search controls take no input
        if !with_view(state, |view| view.shows_search()) {
            return Vec::new();
        }
        self.search
            .handle_event(
                event,
                SearchBarProps {
                    value: &state.search.pending,
                    focus: state.focus,
                },
            )
            .into_iter()
            .collect()
    }

    pub fn handle_cards_event(&mut self, event: &EventKind, state: &AppState) -> Vec<Action> {
        let is_focused = state.focus == FocusArea::Cards;
        if let EventKind::Key(key) = event {
            if !is_focused || key.kind == KeyEventKind::Release {
                return Vec::new();
            }
            match key.code {
                KeyCode::Char('q') => return vec![Action::Quit],
                KeyCode::Char('/') => return vec![Action::FocusSet(FocusArea::SearchInput)],
                KeyCode::Tab => return vec![Action::FocusNext],
                KeyCode::BackTab => return vec![Action::FocusPrev],
                _ => {}
            }
        }
        self.grid
            .handle_event(
                event,
                CardGridProps {
                    records: state.records(),
                    sprites: &state.sprites,
                    cursor: state.cursor,
                    is_focused,
                },
            )
            .into_iter()
            .collect()
    }

    pub fn handle_overlay_event(&mut self, event: &EventKind, state: &AppState) -> Vec<Action> {
        let selected = state.selected_id();
        let view = derive_view(&ViewInputs::from_state(state, selected.as_deref()));
        let Some(content) = overlay_content(&view, state.tick) else {
            return Vec::new();
        };
        self.overlay
            .handle_event(
                event,
                DetailOverlayProps {
                    artwork: overlay_artwork(&content, state),
                    content,
                    is_focused: true,
                },
            )
            .into_iter()
            .collect()
    }
}
