//! Rendering seam: a pixel-buffer backend presented with half-blocks.
//!
//! The scene draws against the [`Renderer`] trait; [`TermRenderer`] is the
//! terminal implementation. Each terminal cell shows two vertically stacked
//! pixels via `▀`, so the pixel viewport is `cols x rows*2`.

use crate::sprite::{Rgb, Sprite};
use ratatui::buffer::Buffer;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;

/// Axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// What the scene needs from a rendering backend.
pub trait Renderer {
    /// Current frame's viewport. May change between frames (terminal
    /// resize, fullscreen toggle).
    fn viewport(&self) -> Rect;

    /// Draw a sprite into `dst`, nearest-neighbour scaled, optionally
    /// flipped horizontally. Transparent pixels leave the buffer untouched.
    fn draw_sprite(&mut self, sprite: &Sprite, dst: Rect, flip: bool);

    /// Draw text with the built-in bitmap font. Glyphs the font lacks are
    /// skipped for that frame.
    fn draw_text(&mut self, text: &str, x: i32, y: i32, colour: Rgb);

    fn set_fullscreen(&mut self, on: bool);
}

/// Colour of pixels nothing was drawn over.
const CLEAR: Rgb = Rgb(12, 12, 18);

/// 3x5 bitmap glyphs, row-major.
#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

#[rustfmt::skip]
const MINUS: [u8; 15] = [0,0,0, 0,0,0, 1,1,1, 0,0,0, 0,0,0];

fn glyph(c: char) -> Option<&'static [u8; 15]> {
    match c {
        '0'..='9' => Some(&DIGITS[c as usize - '0' as usize]),
        '-' => Some(&MINUS),
        _ => None,
    }
}

/// Pixel width of `text` in the bitmap font (3 px per glyph, 1 px gap).
pub fn text_width(text: &str) -> i32 {
    let n = text.chars().count() as i32;
    if n == 0 { 0 } else { n * 4 - 1 }
}

/// RGB pixel grid, row-major, reused across frames.
#[derive(Debug)]
struct PixelBuf {
    w: i32,
    h: i32,
    px: Vec<Rgb>,
}

impl PixelBuf {
    fn new(w: i32, h: i32) -> Self {
        Self {
            w,
            h,
            px: vec![CLEAR; (w * h) as usize],
        }
    }

    fn reset(&mut self, w: i32, h: i32) {
        self.w = w;
        self.h = h;
        self.px.clear();
        self.px.resize((w * h) as usize, CLEAR);
    }

    fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && x < self.w && y < self.h {
            self.px[(y * self.w + x) as usize] = c;
        }
    }

    fn get(&self, x: i32, y: i32) -> Rgb {
        self.px[(y * self.w + x) as usize]
    }
}

/// Terminal backend. "Fullscreen" uses the whole terminal; otherwise the
/// pixel viewport is capped at the configured width x height.
pub struct TermRenderer {
    buf: PixelBuf,
    max_w: i32,
    max_h: i32,
    fullscreen: bool,
}

impl TermRenderer {
    pub fn new(max_w: u32, max_h: u32) -> Self {
        Self {
            buf: PixelBuf::new(1, 2),
            max_w: max_w.max(1) as i32,
            max_h: max_h.max(2) as i32,
            fullscreen: false,
        }
    }

    /// Size the pixel viewport for this frame and clear it.
    pub fn begin_frame(&mut self, term_cols: u16, term_rows: u16) {
        let mut w = i32::from(term_cols.max(1));
        // Pixel height must stay even so every terminal row maps to a
        // full top/bottom pixel pair.
        let mut h = i32::from(term_rows.max(1)) * 2;
        if !self.fullscreen {
            w = w.min(self.max_w);
            h = h.min(self.max_h) & !1;
            h = h.max(2);
        }
        self.buf.reset(w, h);
    }

    /// Widget painting this frame's pixels; render it with `Frame::render_widget`.
    pub fn widget(&self) -> HalfBlocks<'_> {
        HalfBlocks { buf: &self.buf }
    }
}

impl Renderer for TermRenderer {
    fn viewport(&self) -> Rect {
        Rect {
            x: 0,
            y: 0,
            w: self.buf.w,
            h: self.buf.h,
        }
    }

    fn draw_sprite(&mut self, sprite: &Sprite, dst: Rect, flip: bool) {
        let (sw, sh) = sprite.size();
        if dst.w <= 0 || dst.h <= 0 || sw <= 0 || sh <= 0 {
            return;
        }
        for dy in 0..dst.h {
            let sy = dy * sh / dst.h;
            for dx in 0..dst.w {
                let mut sx = dx * sw / dst.w;
                if flip {
                    sx = sw - 1 - sx;
                }
                if let Some(c) = sprite.pixel(sx, sy) {
                    self.buf.set(dst.x + dx, dst.y + dy, c);
                }
            }
        }
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, colour: Rgb) {
        for (i, c) in text.chars().enumerate() {
            let Some(g) = glyph(c) else {
                log::debug!("no glyph for {c:?}, skipping");
                continue;
            };
            let gx = x + i as i32 * 4;
            for row in 0..5 {
                for col in 0..3 {
                    if g[row * 3 + col] == 1 {
                        self.buf.set(gx + col as i32, y + row as i32, colour);
                    }
                }
            }
        }
    }

    fn set_fullscreen(&mut self, on: bool) {
        self.fullscreen = on;
    }
}

/// Paints the pixel buffer as `▀` cells, one terminal cell carrying the
/// pixel colour above in the foreground and the one below in the background.
pub struct HalfBlocks<'a> {
    buf: &'a PixelBuf,
}

impl Widget for HalfBlocks<'_> {
    fn render(self, area: ratatui::layout::Rect, buf: &mut Buffer) {
        let cols = (self.buf.w as u16).min(area.width);
        let rows = ((self.buf.h / 2) as u16).min(area.height);
        for y in 0..rows {
            for x in 0..cols {
                let top = self.buf.get(i32::from(x), i32::from(y) * 2);
                let bot = self.buf.get(i32::from(x), i32::from(y) * 2 + 1);
                buf[(area.x + x, area.y + y)].set_symbol("▀").set_style(
                    Style::default()
                        .fg(Color::Rgb(top.0, top.1, top.2))
                        .bg(Color::Rgb(bot.0, bot.1, bot.2)),
                );
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{Rect, Renderer};
    use crate::sprite::{Rgb, Sprite};

    /// Test double that records draw calls instead of painting.
    pub struct RecordingRenderer {
        pub viewport: Rect,
        pub sprites: Vec<(Rect, bool)>,
        pub texts: Vec<(String, i32, i32)>,
    }

    impl RecordingRenderer {
        pub fn new(w: i32, h: i32) -> Self {
            Self {
                viewport: Rect { x: 0, y: 0, w, h },
                sprites: Vec::new(),
                texts: Vec::new(),
            }
        }
    }

    impl Renderer for RecordingRenderer {
        fn viewport(&self) -> Rect {
            self.viewport
        }

        fn draw_sprite(&mut self, _sprite: &Sprite, dst: Rect, flip: bool) {
            self.sprites.push((dst, flip));
        }

        fn draw_text(&mut self, text: &str, x: i32, y: i32, _colour: Rgb) {
            self.texts.push((text.to_string(), x, y));
        }

        fn set_fullscreen(&mut self, _on: bool) {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tone() -> Sprite {
        Sprite::parse("a 255 0 0\nb 0 255 0\n---\nab\n").unwrap()
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width(""), 0);
        assert_eq!(text_width("5"), 3);
        assert_eq!(text_width("-15"), 11);
    }

    #[test]
    fn test_begin_frame_caps_viewport() {
        let mut r = TermRenderer::new(10, 8);
        r.begin_frame(80, 24);
        assert_eq!(r.viewport(), Rect { x: 0, y: 0, w: 10, h: 8 });

        r.set_fullscreen(true);
        r.begin_frame(80, 24);
        assert_eq!(r.viewport(), Rect { x: 0, y: 0, w: 80, h: 48 });
    }

    #[test]
    fn test_draw_sprite_flip() {
        let sprite = two_tone();
        let mut r = TermRenderer::new(4, 2);
        r.begin_frame(80, 24);
        r.draw_sprite(&sprite, Rect { x: 0, y: 0, w: 2, h: 1 }, false);
        assert_eq!(r.buf.get(0, 0), Rgb(255, 0, 0));
        assert_eq!(r.buf.get(1, 0), Rgb(0, 255, 0));

        r.begin_frame(80, 24);
        r.draw_sprite(&sprite, Rect { x: 0, y: 0, w: 2, h: 1 }, true);
        assert_eq!(r.buf.get(0, 0), Rgb(0, 255, 0));
        assert_eq!(r.buf.get(1, 0), Rgb(255, 0, 0));
    }

    #[test]
    fn test_draw_sprite_scales_nearest() {
        let sprite = two_tone();
        let mut r = TermRenderer::new(8, 2);
        r.begin_frame(80, 24);
        r.draw_sprite(&sprite, Rect { x: 0, y: 0, w: 4, h: 2 }, false);
        assert_eq!(r.buf.get(0, 1), Rgb(255, 0, 0));
        assert_eq!(r.buf.get(1, 0), Rgb(255, 0, 0));
        assert_eq!(r.buf.get(2, 0), Rgb(0, 255, 0));
        assert_eq!(r.buf.get(3, 1), Rgb(0, 255, 0));
    }

    #[test]
    fn test_draw_text_skips_unknown_glyphs() {
        let mut r = TermRenderer::new(20, 6);
        r.begin_frame(80, 24);
        r.draw_text("1x", 0, 0, Rgb(255, 0, 0));
        // '1' drew something, 'x' did not.
        assert_eq!(r.buf.get(1, 0), Rgb(255, 0, 0));
        assert_eq!(r.buf.get(4, 0), CLEAR);
        assert_eq!(r.buf.get(5, 0), CLEAR);
    }

    #[test]
    fn test_half_blocks_widget() {
        let mut r = TermRenderer::new(2, 2);
        r.begin_frame(80, 24);
        r.draw_sprite(&two_tone(), Rect { x: 0, y: 0, w: 2, h: 1 }, false);
        let area = ratatui::layout::Rect::new(0, 0, 2, 1);
        let mut buf = Buffer::empty(area);
        r.widget().render(area, &mut buf);
        assert_eq!(buf[(0u16, 0u16)].symbol(), "▀");
        assert_eq!(buf[(0u16, 0u16)].fg, Color::Rgb(255, 0, 0));
        assert_eq!(buf[(0u16, 0u16)].bg, Color::Rgb(12, 12, 18));
    }
}
