//! The countdown read-out rendered into the scene.
//!
//! A fixed-size RGBA raster holds the `MM:SS` label. Whenever the displayed
//! second changes the raster is repainted in place and flagged for a GPU
//! re-upload; the allocation, the quad geometry and the texture object are
//! created once and never replaced.

use image::{Rgba, RgbaImage};

pub const TIMER_RASTER_WIDTH: u32 = 128;
pub const TIMER_RASTER_HEIGHT: u32 = 64;

const GLYPH_ROWS: u32 = 7;
const GLYPH_COLS: u32 = 5;
const GLYPH_SCALE: u32 = 4;
/// Glyph cell plus one column of spacing, in raster pixels.
const GLYPH_ADVANCE: u32 = (GLYPH_COLS + 1) * GLYPH_SCALE;

const BACKGROUND: Rgba<u8> = Rgba([10, 12, 16, 255]);
const DIGIT_COLOR: Rgba<u8> = Rgba([236, 58, 48, 255]);

/// 5x7 bitmaps for `0..=9`, one byte per row, bit 4 = leftmost column.
const DIGIT_GLYPHS: [[u8; 7]; 10] = [
    [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E], // 0
    [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E], // 1
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F], // 2
    [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E], // 3
    [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02], // 4
    [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E], // 5
    [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E], // 6
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08], // 7
    [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E], // 8
    [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C], // 9
];
const COLON_GLYPH: [u8; 7] = [0x00, 0x04, 0x04, 0x00, 0x04, 0x04, 0x00];

/// The raster plus the bookkeeping to repaint it only when needed.
#[derive(Debug)]
pub struct TimerDisplay {
    raster: RgbaImage,
    last_seconds: Option<u32>,
    dirty: bool,
}

impl TimerDisplay {
    pub fn new() -> Self {
        let raster = RgbaImage::from_pixel(TIMER_RASTER_WIDTH, TIMER_RASTER_HEIGHT, BACKGROUND);
        let mut display = Self {
            raster,
            last_seconds: None,
            dirty: true,
        };
        display.repaint(0);
        display
    }

    /// Zero-padded `MM:SS`. Minutes do not roll over into hours: 3661
    /// seconds reads `61:01`, and past 100 minutes the field simply widens.
    pub fn format(seconds: u32) -> String {
        format!("{:02}:{:02}", seconds / 60, seconds % 60)
    }

    /// Redraw the label if `seconds` differs from what is on screen.
    /// Returns whether anything was painted.
    pub fn repaint(&mut self, seconds: u32) -> bool {
        if self.last_seconds == Some(seconds) {
            return false;
        }
        let label = Self::format(seconds);

        for pixel in self.raster.pixels_mut() {
            *pixel = BACKGROUND;
        }
        let total_width = label.len() as u32 * GLYPH_ADVANCE;
        // Centre what fits; an oversized label is clipped at the raster edge
        // rather than rescaled.
        let x0 = TIMER_RASTER_WIDTH.saturating_sub(total_width) / 2;
        let y0 = (TIMER_RASTER_HEIGHT - GLYPH_ROWS * GLYPH_SCALE) / 2;
        for (i, ch) in label.chars().enumerate() {
            let glyph = match ch {
                ':' => &COLON_GLYPH,
                _ => {
                    let digit = ch.to_digit(10).unwrap_or(0) as usize;
                    &DIGIT_GLYPHS[digit]
                }
            };
            self.draw_glyph(glyph, x0 + i as u32 * GLYPH_ADVANCE, y0);
        }

        self.last_seconds = Some(seconds);
        self.dirty = true;
        true
    }

    fn draw_glyph(&mut self, glyph: &[u8; 7], x0: u32, y0: u32) {
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_COLS {
                if bits & (1 << (GLYPH_COLS - 1 - col)) == 0 {
                    continue;
                }
                for dy in 0..GLYPH_SCALE {
                    for dx in 0..GLYPH_SCALE {
                        let x = x0 + col * GLYPH_SCALE + dx;
                        let y = y0 + row as u32 * GLYPH_SCALE + dy;
                        if x < TIMER_RASTER_WIDTH && y < TIMER_RASTER_HEIGHT {
                            self.raster.put_pixel(x, y, DIGIT_COLOR);
                        }
                    }
                }
            }
        }
    }

    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }

    pub fn last_seconds(&self) -> Option<u32> {
        self.last_seconds
    }

    /// Consume the dirty flag. True means the texture needs a re-upload.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl Default for TimerDisplay {
    fn default() -> Self {
        Self::new()
    }
}
