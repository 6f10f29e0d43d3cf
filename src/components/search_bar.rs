use crossterm::event::{KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::{Modifier, Style},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    BaseStyle, BorderStyle, Padding, TextInput, TextInputProps, TextInputStyle,
};

use super::{is_quit_chord, theme, Component};
use crate::action::Action;
use crate::state::FocusArea;

pub const SEARCH_PLACEHOLDER: &str = "Search Pokémon by name...";
pub const SEARCH_BUTTON_LABEL: &str = "Search";
const BUTTON_WIDTH: u16 = 12;

pub struct SearchBarProps<'a> {
    pub value: &'a str,
    pub focus: FocusArea,
}

/// Text input plus a search button; only an explicit commit re-runs the query
pub struct SearchBar {
    input: TextInput,
    input_area: Option<Rect>,
    button_area: Option<Rect>,
}

impl Default for SearchBar {
    fn default() -> Self {
        Self {
            input: TextInput::new(),
            input_area: None,
            button_area: None,
        }
    }
}

fn submit_search(_: String) -> Action {
    Action::SearchCommit
}

fn render_cursor(_: usize) -> Action {
    Action::Render
}

fn input_style() -> TextInputStyle {
    TextInputStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(theme::TEXT_DIM),
                focused_style: Some(Style::default().fg(theme::ACCENT_TEAL)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(theme::BG_PANEL),
            fg: Some(theme::TEXT_MAIN),
        },
        placeholder_style: Some(Style::default().fg(theme::TEXT_DIM)),
        cursor_style: Some(Style::default().bg(theme::ACCENT_GOLD).fg(theme::BG_BASE)),
    }
}

fn contains(area: Option<Rect>, column: u16, row: u16) -> bool {
    area.is_some_and(|area| area.contains(Position::new(column, row)))
}

impl SearchBar {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle_click(&self, column: u16, row: u16) -> Vec<Action> {
        if contains(self.button_area, column, row) {
            vec![Action::SearchCommit]
        } else if contains(self.input_area, column, row) {
            vec![Action::FocusSet(FocusArea::SearchInput)]
        } else {
            Vec::new()
        }
    }
}

impl Component<Action> for SearchBar {
    type Props<'a> = SearchBarProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        let key = match event {
            EventKind::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                return self.handle_click(mouse.column, mouse.row);
            }
            EventKind::Key(key) if key.kind != KeyEventKind::Release && !is_quit_chord(event) => {
                key
            }
            _ => return Vec::new(),
        };

        match (props.focus, key.code) {
            (FocusArea::Cards, _) => Vec::new(),
            (_, KeyCode::Tab) => vec![Action::FocusNext],
            (_, KeyCode::BackTab) => vec![Action::FocusPrev],
            (_, KeyCode::Esc) => vec![Action::FocusSet(FocusArea::Cards)],
            (_, KeyCode::Enter) => vec![Action::SearchCommit],
            (FocusArea::SearchButton, KeyCode::Char(' ')) => vec![Action::SearchCommit],
            (FocusArea::SearchButton, _) => Vec::new(),
            (FocusArea::SearchInput, _) => {
                let input_props = TextInputProps {
                    value: props.value,
                    placeholder: SEARCH_PLACEHOLDER,
                    is_focused: true,
                    style: input_style(),
                    on_change: Action::SearchInput,
                    on_submit: submit_search,
                    on_cursor_move: Some(render_cursor),
                };
                self.input
                    .handle_event(event, input_props)
                    .into_iter()
                    .collect()
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let chunks = Layout::horizontal([
            Constraint::Min(10),
            Constraint::Length(1),
            Constraint::Length(BUTTON_WIDTH),
        ])
        .split(area);
        self.input_area = Some(chunks[0]);
        self.button_area = Some(chunks[2]);

        let input_props = TextInputProps {
            value: props.value,
            placeholder: SEARCH_PLACEHOLDER,
            is_focused: props.focus == FocusArea::SearchInput,
            style: input_style(),
            on_change: Action::SearchInput,
            on_submit: submit_search,
            on_cursor_move: Some(render_cursor),
        };
        self.input.render(frame, chunks[0], input_props);

        let button_focused = props.focus == FocusArea::SearchButton;
        let (border, label) = if button_focused {
            (
                Style::default().fg(theme::ACCENT_GOLD),
                Style::default()
                    .fg(theme::BG_BASE)
                    .bg(theme::ACCENT_GOLD)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            (
                Style::default().fg(theme::TEXT_DIM),
                Style::default()
                    .fg(theme::ACCENT_GOLD)
                    .add_modifier(Modifier::BOLD),
            )
        };
        let button = Paragraph::new(SEARCH_BUTTON_LABEL)
            .alignment(Alignment::Center)
            .style(label)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(border),
            );
        frame.render_widget(button, chunks[2]);
    }
}
