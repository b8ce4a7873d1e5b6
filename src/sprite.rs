//! Sprite assets: a small text-art format and series loading.
//!
//! A sprite file has a palette header (one `<char> <r> <g> <b>` entry per
//! line), a `---` separator, then the pixel grid. `.` and space are
//! transparent. All grid rows must have the same width.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

/// 24-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Error)]
pub enum SpriteError {
    #[error("missing `---` separator between palette and pixel rows")]
    MissingSeparator,

    #[error("bad palette entry {0:?} (expected `<char> <r> <g> <b>`)")]
    BadPaletteEntry(String),

    #[error("palette must not redefine the transparent character `.`")]
    ReservedChar,

    #[error("pixel row {row} has width {got}, expected {want}")]
    RaggedRow { row: usize, got: usize, want: usize },

    #[error("pixel {0:?} not declared in the palette")]
    UnknownPixel(char),

    #[error("sprite has no pixel rows")]
    Empty,
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid sprite {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: SpriteError,
    },
}

/// A parsed sprite: fixed size, row-major pixels, `None` = transparent.
#[derive(Debug, Clone)]
pub struct Sprite {
    w: i32,
    h: i32,
    px: Vec<Option<Rgb>>,
}

impl Sprite {
    pub fn parse(text: &str) -> Result<Self, SpriteError> {
        let mut palette: Vec<(char, Rgb)> = Vec::new();
        let mut lines = text.lines();
        let mut seen_separator = false;
        for line in lines.by_ref() {
            if line.trim() == "---" {
                seen_separator = true;
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            let key = parts.next().and_then(|p| {
                let mut chars = p.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => None,
                }
            });
            let rgb: Option<Vec<u8>> = parts.map(|p| p.parse().ok()).collect();
            match (key, rgb.as_deref()) {
                (Some('.'), _) => return Err(SpriteError::ReservedChar),
                (Some(c), Some([r, g, b])) => palette.push((c, Rgb(*r, *g, *b))),
                _ => return Err(SpriteError::BadPaletteEntry(line.to_string())),
            }
        }
        if !seen_separator {
            return Err(SpriteError::MissingSeparator);
        }

        let mut px = Vec::new();
        let mut width = None;
        let mut rows = 0usize;
        for line in lines {
            let got = line.chars().count();
            let want = *width.get_or_insert(got);
            if got != want {
                return Err(SpriteError::RaggedRow { row: rows, got, want });
            }
            for c in line.chars() {
                if c == '.' || c == ' ' {
                    px.push(None);
                } else {
                    let colour = palette
                        .iter()
                        .find(|(k, _)| *k == c)
                        .map(|(_, rgb)| *rgb)
                        .ok_or(SpriteError::UnknownPixel(c))?;
                    px.push(Some(colour));
                }
            }
            rows += 1;
        }
        let width = width.unwrap_or(0);
        if rows == 0 || width == 0 {
            return Err(SpriteError::Empty);
        }
        Ok(Self {
            w: width as i32,
            h: rows as i32,
            px,
        })
    }

    /// Width and height in pixels.
    pub fn size(&self) -> (i32, i32) {
        (self.w, self.h)
    }

    /// Pixel at (x, y); `None` when transparent or out of bounds.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb> {
        if x < 0 || y < 0 || x >= self.w || y >= self.h {
            return None;
        }
        self.px[(y * self.w + x) as usize]
    }
}

/// Load a single sprite file.
pub fn load(path: &Path) -> Result<Sprite, AssetError> {
    let text = fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Sprite::parse(&text).map_err(|source| AssetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load `{prefix}1.txt`, `{prefix}2.txt`, … from `dir` until the first
/// failure. The series fails as a whole only when no sprite loads at all.
pub fn load_series(dir: &Path, prefix: &str) -> Result<Vec<Rc<Sprite>>, AssetError> {
    let mut sprites = Vec::new();
    loop {
        let path = dir.join(format!("{prefix}{}.txt", sprites.len() + 1));
        match load(&path) {
            Ok(sprite) => sprites.push(Rc::new(sprite)),
            Err(err) if sprites.is_empty() => return Err(err),
            Err(_) => break,
        }
    }
    Ok(sprites)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKER: &str = "\
a 255 0 0
b 0 0 255
---
ab
b.
";

    #[test]
    fn test_parse_dimensions_and_pixels() {
        let s = Sprite::parse(CHECKER).unwrap();
        assert_eq!(s.size(), (2, 2));
        assert_eq!(s.pixel(0, 0), Some(Rgb(255, 0, 0)));
        assert_eq!(s.pixel(1, 0), Some(Rgb(0, 0, 255)));
        assert_eq!(s.pixel(0, 1), Some(Rgb(0, 0, 255)));
        assert_eq!(s.pixel(1, 1), None);
    }

    #[test]
    fn test_parse_out_of_bounds_is_transparent() {
        let s = Sprite::parse(CHECKER).unwrap();
        assert_eq!(s.pixel(-1, 0), None);
        assert_eq!(s.pixel(0, 2), None);
    }

    #[test]
    fn test_parse_missing_separator() {
        assert!(matches!(
            Sprite::parse("a 1 2 3\naa\n"),
            Err(SpriteError::MissingSeparator)
        ));
    }

    #[test]
    fn test_parse_ragged_rows() {
        let err = Sprite::parse("a 1 2 3\n---\naa\na\n").unwrap_err();
        assert!(matches!(
            err,
            SpriteError::RaggedRow {
                row: 1,
                got: 1,
                want: 2
            }
        ));
    }

    #[test]
    fn test_parse_unknown_pixel() {
        assert!(matches!(
            Sprite::parse("a 1 2 3\n---\nax\n"),
            Err(SpriteError::UnknownPixel('x'))
        ));
    }

    #[test]
    fn test_parse_reserved_transparent_char() {
        assert!(matches!(
            Sprite::parse(". 1 2 3\n---\n..\n"),
            Err(SpriteError::ReservedChar)
        ));
    }

    #[test]
    fn test_parse_empty_grid() {
        assert!(matches!(Sprite::parse("---\n"), Err(SpriteError::Empty)));
    }

    #[test]
    fn test_load_series_stops_at_first_gap() {
        let dir = std::env::temp_dir().join(format!("catfall-sprites-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("drop_1.txt"), CHECKER).unwrap();
        fs::write(dir.join("drop_2.txt"), CHECKER).unwrap();
        // no drop_3.txt
        fs::write(dir.join("drop_4.txt"), CHECKER).unwrap();

        let series = load_series(&dir, "drop_").unwrap();
        assert_eq!(series.len(), 2);

        assert!(matches!(
            load_series(&dir, "missing_"),
            Err(AssetError::Io { .. })
        ));
        fs::remove_dir_all(&dir).ok();
    }
}
