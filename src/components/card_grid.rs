use crossterm::event::{KeyCode, MouseButton, MouseEventKind};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use tui_dispatch::EventKind;

use super::{theme, Component, SpriteView};
use crate::action::Action;
use crate::route::Route;
use crate::state::{SpriteCache, SummaryRecord};

pub const CARD_MIN_WIDTH: u16 = 36;
pub const CARD_HEIGHT: u16 = 7;
/// Columns reserved for artwork on the left of each card
const CARD_ART_WIDTH: u16 = 10;

/// Where each visible card sits for a given area and cursor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    pub area: Rect,
    pub columns: usize,
    pub card_width: u16,
    pub visible_rows: usize,
    pub first_row: usize,
}

impl GridLayout {
    /// Lays out the grid so the cursor row is always on screen
    pub fn compute(area: Rect, cursor: usize) -> Self {
        let columns = (area.width / CARD_MIN_WIDTH).max(1) as usize;
        let card_width = (area.width / columns as u16).max(1);
        let visible_rows = (area.height / CARD_HEIGHT).max(1) as usize;
        let cursor_row = cursor / columns;
        let first_row = cursor_row.saturating_sub(visible_rows - 1);
        Self {
            area,
            columns,
            card_width,
            visible_rows,
            first_row,
        }
    }

    pub fn cells(&self, count: usize) -> Vec<(usize, Rect)> {
        let mut cells = Vec::new();
        for row in 0..self.visible_rows {
            for column in 0..self.columns {
                let index = (self.first_row + row) * self.columns + column;
                if index >= count {
                    return cells;
                }
                let y = self.area.y + row as u16 * CARD_HEIGHT;
                let height = CARD_HEIGHT.min(self.area.bottom().saturating_sub(y));
                cells.push((
                    index,
                    Rect {
                        x: self.area.x + column as u16 * self.card_width,
                        y,
                        width: self.card_width,
                        height,
                    },
                ));
            }
        }
        cells
    }

    /// Index of the card under a terminal cell
    pub fn index_at(&self, column: u16, row: u16, count: usize) -> Option<usize> {
        self.cells(count)
            .into_iter()
            .find(|(_, rect)| {
                column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
            })
            .map(|(index, _)| index)
    }
}

pub struct CardGridProps<'a> {
    pub records: &'a [SummaryRecord],
    pub sprites: &'a SpriteCache,
    pub cursor: usize,
    pub is_focused: bool,
}

/// The card list; activating a card navigates to its detail path
#[derive(Default)]
pub struct CardGrid {
    layout: Option<GridLayout>,
}

impl CardGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout(&self) -> Option<GridLayout> {
        self.layout
    }

    fn record_at<'a>(
        &self,
        column: u16,
        row: u16,
        records: &'a [SummaryRecord],
    ) -> Option<&'a SummaryRecord> {
        let index = self.layout?.index_at(column, row, records.len())?;
        records.get(index)
    }

    fn columns(&self) -> i32 {
        self.layout.map(|layout| layout.columns as i32).unwrap_or(1)
    }
}

/// Navigation for activating a card, by pointer or keyboard alike
pub fn open_record(record: &SummaryRecord) -> Action {
    Action::Navigate(Route::pokemon(record.id.clone()).path())
}

impl Component<Action> for CardGrid {
    type Props<'a> = CardGridProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        match event {
            EventKind::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                self.record_at(mouse.column, mouse.row, props.records)
                    .map(open_record)
            }
            EventKind::Scroll { delta, .. } => {
                Some(Action::CursorMove((*delta).signum() as i32 * self.columns()))
            }
            EventKind::Key(key) if props.is_focused => match key.code {
                KeyCode::Enter => props.records.get(props.cursor).map(open_record),
                KeyCode::Left | KeyCode::Char('h') => Some(Action::CursorMove(-1)),
                KeyCode::Right | KeyCode::Char('l') => Some(Action::CursorMove(1)),
                KeyCode::Up | KeyCode::Char('k') => Some(Action::CursorMove(-self.columns())),
                KeyCode::Down | KeyCode::Char('j') => Some(Action::CursorMove(self.columns())),
                KeyCode::Home => Some(Action::CursorSet(0)),
                KeyCode::End => Some(Action::CursorSet(props.records.len().saturating_sub(1))),
                _ => None,
            },
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let layout = GridLayout::compute(area, props.cursor);
        self.layout = Some(layout);

        for (index, rect) in layout.cells(props.records.len()) {
            let record = &props.records[index];
            let selected = props.is_focused && index == props.cursor;
            render_card(frame, rect, record, props.sprites, selected);
        }
    }
}

fn render_card(
    frame: &mut Frame,
    area: Rect,
    record: &SummaryRecord,
    sprites: &SpriteCache,
    selected: bool,
) {
    let border = if selected {
        Style::default().fg(theme::ACCENT_TEAL)
    } else {
        Style::default().fg(theme::TEXT_DIM)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .style(Style::default().bg(theme::BG_PANEL).fg(theme::TEXT_MAIN));

    let label = Style::default()
        .fg(theme::ACCENT_GOLD)
        .add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(vec![
            Span::styled("Number: ", label),
            Span::raw(record.id.clone()),
        ]),
        Line::from(vec![
            Span::styled("Name: ", label),
            Span::raw(record.display_name().to_string()),
        ]),
        Line::from(vec![
            Span::styled("Types: ", label),
            Span::raw(record.types_label()),
        ]),
    ];
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [art, _, text] = Layout::horizontal([
        Constraint::Length(CARD_ART_WIDTH),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(inner);
    let sprite = record
        .sprite
        .as_deref()
        .and_then(|url| sprites.get(url))
        .and_then(|resource| resource.data());
    if let Some(sprite) = sprite {
        frame.render_widget(SpriteView::new(sprite), art);
    }
    let offset = text.height.saturating_sub(lines.len() as u16) / 2;
    let text = Rect {
        y: text.y + offset,
        height: text.height - offset,
        ..text
    };
    frame.render_widget(Paragraph::new(lines), text);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_columns_follow_width() {
        let layout = GridLayout::compute(Rect::new(0, 0, 112, 28), 0);
        assert_eq!(layout.columns, 3);
        assert_eq!(layout.card_width, 37);
        assert_eq!(layout.visible_rows, 4);

        let narrow = GridLayout::compute(Rect::new(0, 0, 10, 20), 0);
        assert_eq!(narrow.columns, 1);
    }

    #[test]
    fn test_layout_scrolls_to_cursor() {
        let layout = GridLayout::compute(Rect::new(0, 0, 72, 14), 9);
        // 2 columns, 2 visible rows, cursor on row 4
        assert_eq!(layout.first_row, 3);
        let cells = layout.cells(20);
        assert_eq!(cells.first().map(|(i, _)| *i), Some(6));
        assert_eq!(cells.len(), 4);
    }

    #[test]
    fn test_index_at_hits_cards() {
        let layout = GridLayout::compute(Rect::new(2, 4, 72, 14), 0);
        assert_eq!(layout.index_at(3, 5, 3), Some(0));
        assert_eq!(layout.index_at(39, 5, 3), Some(1));
        assert_eq!(layout.index_at(3, 12, 3), Some(2));
        assert_eq!(layout.index_at(39, 12, 3), None);
        assert_eq!(layout.index_at(0, 0, 3), None);
    }
}
