use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

use crate::sprite::SpriteData;

const UPPER_HALF: char = '▀';
const LOWER_HALF: char = '▄';

/// Draws a sprite with half-block cells, centered in its area; the upper
/// half of a cell is one pixel and the background the pixel below it
pub struct SpriteView<'a> {
    sprite: &'a SpriteData,
}

impl<'a> SpriteView<'a> {
    pub fn new(sprite: &'a SpriteData) -> Self {
        Self { sprite }
    }
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

impl Widget for SpriteView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (cols, rows) = self.sprite.fit(area.width, area.height);
        if cols == 0 || rows == 0 {
            return;
        }
        let x0 = area.x + (area.width - cols) / 2;
        let y0 = area.y + (area.height - rows) / 2;
        let pixel_rows = u32::from(rows) * 2;

        // Nearest-neighbour: map each target pixel back to the source grid
        let sample = |col: u16, pixel_row: u32| {
            let x = u32::from(col) * self.sprite.width / u32::from(cols);
            let y = pixel_row * self.sprite.height / pixel_rows;
            self.sprite.pixel(x, y)
        };

        for row in 0..rows {
            for col in 0..cols {
                let top = sample(col, u32::from(row) * 2);
                let bottom = sample(col, u32::from(row) * 2 + 1);
                let Some(cell) = buf.cell_mut((x0 + col, y0 + row)) else {
                    continue;
                };
                match (top, bottom) {
                    (Some(top), Some(bottom)) => {
                        cell.set_char(UPPER_HALF).set_fg(rgb(top)).set_bg(rgb(bottom));
                    }
                    (Some(top), None) => {
                        cell.set_char(UPPER_HALF).set_fg(rgb(top));
                    }
                    (None, Some(bottom)) => {
                        cell.set_char(LOWER_HALF).set_fg(rgb(bottom));
                    }
                    (None, None) => {}
                }
            }
        }
    }
}
