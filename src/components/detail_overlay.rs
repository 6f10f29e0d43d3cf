use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_dispatch::{DataResource, EventKind};
use tui_dispatch_components::{
    centered_rect, BaseStyle, BorderStyle, Modal, ModalBehavior, ModalProps, ModalStyle, Padding,
};

use super::{is_quit_chord, spinner_frame, theme, Component, SpriteView};
use crate::action::Action;
use crate::route::Route;
use crate::sprite::SpriteData;
use crate::state::DetailRecord;
use crate::view::DetailOverlay;

const MODAL_WIDTH: u16 = 56;
/// Border and padding rows, plus title, spacer and close hint
const MODAL_CHROME: u16 = 7;
/// Tallest the artwork block gets, in rows
const ART_ROWS: u16 = 12;
pub const ARTWORK_LOADING_TEXT: &str = "Loading artwork...";

/// What the overlay body shows
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OverlayContent<'a> {
    Loading { tick: u64 },
    Error(&'a str),
    Record(DetailOverlay<'a>),
}

pub struct DetailOverlayProps<'a> {
    pub content: OverlayContent<'a>,
    /// Artwork for the record's sprite URL, if one was requested
    pub artwork: Option<&'a DataResource<SpriteData>>,
    pub is_focused: bool,
}

pub struct DetailOverlayView {
    modal: Modal,
    last_area: Rect,
}

impl Default for DetailOverlayView {
    fn default() -> Self {
        Self {
            modal: Modal::new(),
            last_area: Rect::default(),
        }
    }
}

/// Dismissal goes back to the bare list location
pub fn dismiss_detail() -> Action {
    Action::Navigate(Route::List.path())
}

fn modal_style() -> ModalStyle {
    ModalStyle {
        dim_factor: 0.6,
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(theme::TEXT_DIM),
                focused_style: Some(Style::default().fg(theme::ACCENT_TEAL)),
            }),
            padding: Padding::xy(2, 1),
            bg: Some(theme::BG_MODAL),
            fg: Some(theme::TEXT_MAIN),
        },
    }
}

fn behavior() -> ModalBehavior {
    ModalBehavior {
        close_on_esc: true,
        close_on_backdrop: true,
    }
}

fn field(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            label,
            Style::default()
                .fg(theme::ACCENT_GOLD)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(value),
    ])
}

fn record_lines(id: &str, detail: &DetailRecord) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            detail.display_name().to_string(),
            Style::default()
                .fg(theme::ACCENT_TEAL)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        field("Number: ", id.to_string()),
        field("Types: ", detail.types_label()),
        field("Height: ", detail.height_label()),
        field("Weight: ", detail.weight_label()),
        field("Capture Rate: ", detail.capture_rate_label()),
    ];

    if !detail.stats.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Stats",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.extend(detail.stats.iter().map(|stat| {
            Line::from(vec![
                Span::styled(
                    format!("  {}: ", stat.label()),
                    Style::default().fg(theme::TEXT_DIM),
                ),
                Span::raw(stat.value_label()),
            ])
        }));
    }
    lines
}

/// Body lines for an overlay, without the artwork or close hint
pub fn content_lines(content: &OverlayContent<'_>) -> Vec<Line<'static>> {
    match content {
        OverlayContent::Loading { tick } => vec![Line::from(vec![
            Span::styled(
                format!("{} ", spinner_frame(*tick)),
                Style::default().fg(theme::ACCENT_TEAL),
            ),
            Span::raw("Loading details..."),
        ])],
        OverlayContent::Error(message) => vec![Line::from(Span::styled(
            format!("Error: {message}"),
            Style::default().fg(theme::ACCENT_RED),
        ))],
        OverlayContent::Record(DetailOverlay {
            id,
            detail: Some(detail),
        }) => record_lines(id, detail),
        OverlayContent::Record(DetailOverlay { detail: None, .. }) => Vec::new(),
    }
}

/// Artwork shown above a populated record
#[derive(Clone, Copy, Debug, PartialEq)]
enum Artwork<'a> {
    None,
    Loading,
    Ready(&'a SpriteData),
}

fn artwork<'a>(props: &DetailOverlayProps<'a>) -> Artwork<'a> {
    let has_record = matches!(
        props.content,
        OverlayContent::Record(DetailOverlay {
            detail: Some(_),
            ..
        })
    );
    match props.artwork {
        Some(DataResource::Loaded(sprite)) if has_record => Artwork::Ready(sprite),
        Some(DataResource::Loading) if has_record => Artwork::Loading,
        _ => Artwork::None,
    }
}

/// Rows for the artwork block, spacer included; shrinks so the body fits `area`
fn artwork_height(art: Artwork<'_>, text_rows: u16, area: Rect) -> u16 {
    let spare = area
        .height
        .saturating_sub(MODAL_CHROME + text_rows + 1);
    match art {
        Artwork::None => 0,
        Artwork::Loading => 2,
        Artwork::Ready(_) if spare == 0 => 0,
        Artwork::Ready(sprite) => {
            let inner_width = MODAL_WIDTH.min(area.width).saturating_sub(6);
            let (_, rows) = sprite.fit(inner_width, ART_ROWS.min(spare));
            if rows == 0 {
                0
            } else {
                rows + 1
            }
        }
    }
}

fn close_hint() -> Line<'static> {
    Line::from(vec![
        Span::styled(
            "Esc/Enter",
            Style::default()
                .fg(theme::ACCENT_GOLD)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" Close", Style::default().fg(theme::TEXT_DIM)),
    ])
}

fn modal_area(area: Rect, body_height: u16) -> Rect {
    let height = (body_height + MODAL_CHROME).min(area.height);
    centered_rect(MODAL_WIDTH.min(area.width), height, area)
}

impl DetailOverlayView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component<Action> for DetailOverlayView {
    type Props<'a> = DetailOverlayProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused || is_quit_chord(event) {
            return Vec::new();
        }

        let text_rows = content_lines(&props.content).len() as u16;
        let body_height = text_rows + artwork_height(artwork(&props), text_rows, self.last_area);
        let mut noop_render = |_frame: &mut Frame, _area: Rect| {};
        let modal_props = ModalProps {
            is_open: true,
            is_focused: true,
            area: modal_area(self.last_area, body_height),
            style: modal_style(),
            behavior: behavior(),
            on_close: dismiss_detail,
            render_content: &mut noop_render,
        };
        let actions: Vec<_> = self
            .modal
            .handle_event(event, modal_props)
            .into_iter()
            .collect();
        if !actions.is_empty() {
            return actions;
        }

        match event {
            EventKind::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Enter => vec![dismiss_detail()],
                KeyCode::Char('c') if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    vec![dismiss_detail()]
                }
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        self.last_area = area;
        let art = artwork(&props);
        let mut lines = content_lines(&props.content);
        let text_rows = lines.len() as u16;
        let art_height = artwork_height(art, text_rows, area);
        lines.push(Line::default());
        lines.push(close_hint());

        let title = match props.content {
            OverlayContent::Record(overlay) => format!(" #{} ", overlay.id),
            _ => " Pokémon ".to_string(),
        };
        let mut render_content = |frame: &mut Frame, content_area: Rect| {
            let block = Block::default().title(title.clone());
            let inner = block.inner(content_area);
            frame.render_widget(block, content_area);

            let [art_area, text_area] =
                Layout::vertical([Constraint::Length(art_height), Constraint::Min(0)])
                    .areas(inner);
            match art {
                Artwork::Ready(sprite) if art_height > 1 => {
                    let sprite_area = Rect {
                        height: art_height - 1,
                        ..art_area
                    };
                    frame.render_widget(SpriteView::new(sprite), sprite_area);
                }
                Artwork::Loading => {
                    let line = Line::from(Span::styled(
                        ARTWORK_LOADING_TEXT,
                        Style::default().fg(theme::TEXT_DIM),
                    ));
                    frame.render_widget(Paragraph::new(line), art_area);
                }
                _ => {}
            }
            frame.render_widget(Paragraph::new(lines.clone()), text_area);
        };

        self.modal.render(
            frame,
            area,
            ModalProps {
                is_open: true,
                is_focused: props.is_focused,
                area: modal_area(area, text_rows + art_height),
                style: modal_style(),
                behavior: behavior(),
                on_close: dismiss_detail,
                render_content: &mut render_content,
            },
        );
    }
}
