//! Text font description parsing
//!
//! Parses the line-oriented font description format: an `info` line with
//! glyph padding, a `common` line with global metrics, one `page` line per
//! atlas image, `char` lines with per-glyph metrics, optional `kerning`
//! lines, and an optional `metrics` line that overrides every derived
//! vertical metric. Metrics not present in the file (cap height, x height,
//! ascent, descent, space advance) are derived from probe characters.

use crate::glyph::{Glyph, MAX_CHAR};

use super::{BitmapFont, FontPage};

/// Errors from parsing a font description or resolving its pages.
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    /// A required field is absent from the description header.
    #[error("font description is missing field: {0}")]
    MissingField(&'static str),
    /// The padding field did not contain four comma-separated integers.
    #[error("invalid padding in font description")]
    InvalidPadding,
    /// The common line is too short to hold lineHeight and base.
    #[error("invalid common header in font description")]
    InvalidCommonHeader,
    /// Page ids must be indices in declaration order starting at 0.
    #[error("page ids must be indices starting at 0, got: {0}")]
    InvalidPageId(String),
    /// A line held a non-numeric value or ended mid-field.
    #[error("malformed font description line: {0}")]
    MalformedLine(String),
    /// The description ended before the header was complete.
    #[error("font description ended unexpectedly")]
    UnexpectedEof,
    /// A glyph referenced a page index with no matching page line.
    #[error("glyph {id} references undeclared page {page}")]
    UndeclaredPage {
        /// Character code of the offending glyph.
        id: i64,
        /// Page index the glyph claimed.
        page: usize,
    },
    /// The description defined no usable glyphs to derive metrics from.
    #[error("font description defines no glyphs")]
    NoGlyphs,
    /// Page region count did not match the declared page count.
    #[error("expected {expected} page regions, got {actual}")]
    PageCountMismatch {
        /// Pages declared by the description.
        expected: usize,
        /// Regions supplied by the caller.
        actual: usize,
    },
}

/// Result alias for font loading and page resolution.
pub type FontResult<T> = Result<T, FontError>;

/// Probe characters for deriving the x height, in preference order.
const X_CHARS: [char; 13] = [
    'x', 'e', 'a', 'o', 'n', 's', 'r', 'c', 'u', 'm', 'v', 'w', 'z',
];

/// Probe characters for deriving the cap height, in preference order.
const CAP_CHARS: [char; 26] = [
    'M', 'N', 'B', 'D', 'C', 'E', 'F', 'K', 'A', 'G', 'H', 'I', 'J', 'L', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

struct MetricsOverride {
    ascent: f32,
    descent: f32,
    down: f32,
    cap_height: f32,
    line_height: f32,
    space_xadvance: f32,
    x_height: f32,
}

impl BitmapFont {
    /// Parses a font description into a ready-to-shape font.
    ///
    /// `flipped` selects a y-down coordinate system; it flips the sign of
    /// the vertical metrics and the glyph UVs. Glyph UV coordinates remain
    /// zero until [`resolve_page_regions`](Self::resolve_page_regions) is
    /// called with the loaded page textures.
    ///
    /// # Errors
    ///
    /// Fails on a malformed header, out-of-order page ids, glyphs that
    /// reference undeclared pages, or a description without any glyph to
    /// derive metrics from.
    pub fn from_description(text: &str, flipped: bool) -> FontResult<BitmapFont> {
        let mut font = BitmapFont::new(flipped);
        let lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
        let mut i = 0usize;

        // Info line: only the padding matters here.
        let info = *lines.get(i).ok_or(FontError::UnexpectedEof)?;
        i += 1;
        let padding = info
            .split_once("padding=")
            .ok_or(FontError::MissingField("padding"))?
            .1;
        let padding = padding.split(' ').next().unwrap_or(padding);
        let padding: Vec<i32> = padding
            .split(',')
            .map(|v| v.parse())
            .collect::<Result<_, _>>()
            .map_err(|_| FontError::InvalidPadding)?;
        if padding.len() != 4 {
            return Err(FontError::InvalidPadding);
        }
        font.pad_top = padding[0] as f32;
        font.pad_right = padding[1] as f32;
        font.pad_bottom = padding[2] as f32;
        font.pad_left = padding[3] as f32;
        let pad_y = font.pad_top + font.pad_bottom;

        // Common line: lineHeight and base are required, pages is optional.
        let common: Vec<&str> = lines
            .get(i)
            .ok_or(FontError::UnexpectedEof)?
            .splitn(9, ' ')
            .collect();
        i += 1;
        if common.len() < 3 {
            return Err(FontError::InvalidCommonHeader);
        }
        let line_height: f32 = common[1]
            .strip_prefix("lineHeight=")
            .and_then(|v| v.parse::<i32>().ok())
            .ok_or(FontError::MissingField("lineHeight"))? as f32;
        let base_line: f32 = common[2]
            .strip_prefix("base=")
            .and_then(|v| v.parse::<i32>().ok())
            .ok_or(FontError::MissingField("base"))? as f32;
        let page_count = common
            .get(5)
            .and_then(|t| t.strip_prefix("pages="))
            .and_then(|v| v.parse::<usize>().ok())
            .map_or(1, |n| n.max(1));

        // One page line per declared page, ids in order.
        for p in 0..page_count {
            let line = *lines.get(i).ok_or(FontError::UnexpectedEof)?;
            i += 1;
            let id = line
                .split_once('=')
                .map(|(_, rest)| rest.trim_start())
                .and_then(|rest| rest.split(' ').next())
                .ok_or_else(|| FontError::MalformedLine(line.to_owned()))?;
            match id.parse::<usize>() {
                Ok(page_id) if page_id == p => {}
                _ => return Err(FontError::InvalidPageId(id.to_owned())),
            }
            let image_path = line
                .split_once('"')
                .map(|(_, rest)| rest.split('"').next().unwrap_or(rest))
                .unwrap_or("")
                .to_owned();
            font.pages.push(FontPage {
                image_path,
                region: Default::default(),
            });
        }

        // Glyph lines, until the kernings or metrics block (or EOF).
        font.descent = 0.0;
        let mut break_line: Option<&str> = None;
        while let Some(&line) = lines.get(i) {
            i += 1;
            if line.starts_with("kernings ") || line.starts_with("metrics ") {
                break_line = Some(line);
                break;
            }
            if !line.starts_with("char ") {
                continue;
            }
            let mut tokens = Tokens::new(line);
            tokens.skip(); // char
            let ch = tokens.value_i64()?;
            let mut glyph = Glyph {
                id: ch.max(0) as u32,
                ..Glyph::default()
            };
            if ch > i64::from(MAX_CHAR) {
                continue;
            }
            glyph.src_x = tokens.value_i32()?;
            glyph.src_y = tokens.value_i32()?;
            glyph.width = tokens.value_i32()?;
            glyph.height = tokens.value_i32()?;
            glyph.xoffset = tokens.value_i32()?;
            let yoffset = tokens.value_i32()?;
            glyph.yoffset = if flipped {
                yoffset
            } else {
                -(glyph.height + yoffset)
            };
            glyph.xadvance = tokens.value_i32()?;
            // Page may be omitted or invalid; default to the first page.
            tokens.skip();
            if let Some(page) = tokens.next().and_then(|v| v.parse::<usize>().ok()) {
                glyph.page = page;
            }
            if glyph.page >= font.pages.len() {
                return Err(FontError::UndeclaredPage {
                    id: ch,
                    page: glyph.page,
                });
            }
            if glyph.width > 0 && glyph.height > 0 {
                font.descent = font.descent.min(base_line + glyph.yoffset as f32);
            }
            if ch <= 0 {
                font.missing_glyph = Some(glyph);
            } else {
                font.set_glyph(ch as u32, glyph);
            }
        }
        font.descent += font.pad_bottom;

        // Kerning lines.
        if break_line.map_or(true, |l| l.starts_with("kernings ")) {
            while let Some(&line) = lines.get(i) {
                i += 1;
                if !line.starts_with("kerning ") {
                    break_line = Some(line);
                    break;
                }
                let mut tokens = Tokens::new(line);
                tokens.skip(); // kerning
                let first = tokens.value_i64()?;
                let second = tokens.value_i64()?;
                if !(0..=i64::from(MAX_CHAR)).contains(&first)
                    || !(0..=i64::from(MAX_CHAR)).contains(&second)
                {
                    log::debug!("skipping out-of-range kerning pair {first}/{second}");
                    continue;
                }
                let amount = tokens.value_i32()?;
                let glyph = char::from_u32(first as u32).and_then(|ch| font.glyph_mut(ch));
                if let Some(glyph) = glyph {
                    glyph.set_kerning(second as u32, amount.clamp(-32768, 32767) as i16);
                }
            }
        }

        // Optional metrics override.
        let mut metrics_override = None;
        if let Some(line) = break_line.filter(|l| l.starts_with("metrics ")) {
            let mut tokens = Tokens::new(line);
            tokens.skip(); // metrics
            metrics_override = Some(MetricsOverride {
                ascent: tokens.value_f32()?,
                descent: tokens.value_f32()?,
                down: tokens.value_f32()?,
                cap_height: tokens.value_f32()?,
                line_height: tokens.value_f32()?,
                space_xadvance: tokens.value_f32()?,
                x_height: tokens.value_f32()?,
            });
        }

        // Synthesize a space glyph if the description lacks one.
        if font.glyph(' ').is_none() {
            let xadvance = font
                .glyph('l')
                .or_else(|| font.first_glyph())
                .ok_or(FontError::NoGlyphs)?
                .xadvance;
            font.set_glyph(
                ' ' as u32,
                Glyph {
                    id: ' ' as u32,
                    xadvance,
                    ..Glyph::default()
                },
            );
        }
        {
            // Give a zero-width space a drawable rect spanning its advance
            // so wrapping math sees a real visible width.
            let pad_left = font.pad_left;
            let pad_right = font.pad_right;
            let space = font.glyph_mut(' ').ok_or(FontError::NoGlyphs)?;
            if space.width == 0 {
                space.width = (pad_left + space.xadvance as f32 + pad_right) as i32;
                space.xoffset = -pad_left as i32;
            }
            font.space_xadvance = font.glyph(' ').map_or(0.0, |g| g.xadvance as f32);
        }

        // Derive x height and cap height from probe characters.
        let x_glyph_height = X_CHARS
            .iter()
            .find_map(|&ch| font.glyph(ch))
            .or_else(|| font.first_glyph())
            .ok_or(FontError::NoGlyphs)?
            .height;
        font.x_height = x_glyph_height as f32 - pad_y;

        let cap_glyph = CAP_CHARS.iter().find_map(|&ch| font.glyph(ch));
        font.cap_height = match cap_glyph {
            Some(glyph) => glyph.height as f32,
            None => {
                let mut cap_height = font.cap_height;
                for glyph in font.all_glyphs() {
                    if glyph.width == 0 || glyph.height == 0 {
                        continue;
                    }
                    cap_height = cap_height.max(glyph.height as f32);
                }
                cap_height
            }
        };
        font.cap_height -= pad_y;

        font.ascent = base_line - font.cap_height;
        font.set_line_height(line_height);
        if flipped {
            font.ascent = -font.ascent;
        }

        if let Some(m) = metrics_override {
            // Line height first: its setter rederives `down`, which the
            // override then replaces.
            font.set_line_height(m.line_height);
            font.ascent = m.ascent;
            font.descent = m.descent;
            font.down = m.down;
            font.cap_height = m.cap_height;
            font.space_xadvance = m.space_xadvance;
            font.x_height = m.x_height;
        }

        log::info!(
            "loaded font: {} glyphs, {} pages, line height {}",
            font.glyph_count(),
            font.pages.len(),
            font.line_height()
        );
        Ok(font)
    }
}

/// Key/value tokens of a description line: whitespace and `=` both separate
/// tokens, runs of separators collapse.
struct Tokens<'a> {
    inner: std::str::Split<'a, [char; 2]>,
    line: &'a str,
}

impl<'a> Tokens<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            inner: line.split([' ', '=']),
            line,
        }
    }

    fn next(&mut self) -> Option<&'a str> {
        self.inner.by_ref().find(|t| !t.is_empty())
    }

    /// Discards the next token (a field key).
    fn skip(&mut self) {
        let _ = self.next();
    }

    fn value<T: std::str::FromStr>(&mut self) -> FontResult<T> {
        self.skip(); // key
        self.next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| FontError::MalformedLine(self.line.to_owned()))
    }

    fn value_i64(&mut self) -> FontResult<i64> {
        self.value()
    }

    fn value_i32(&mut self) -> FontResult<i32> {
        self.value()
    }

    fn value_f32(&mut self) -> FontResult<f32> {
        self.value()
    }
}
