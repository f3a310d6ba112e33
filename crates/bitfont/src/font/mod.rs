//! Bitmap font metrics and shaping
//!
//! A [`BitmapFont`] owns the glyph metric tables parsed from a font
//! description plus the global line metrics derived from them. It shapes
//! character runs into glyph/advance sequences ([`BitmapFont::shape`]) and
//! answers wrap-point queries for the layout engine. Glyphs are stored in a
//! two-level sparse table (128 lazily allocated leaves of 512 slots), so
//! lookup is O(1) without preallocating the full 65536-entry range.

mod description;

pub use description::{FontError, FontResult};

use crate::batch::{Batch, TextureRegion};
use crate::cache::BitmapFontCache;
use crate::glyph::{Glyph, LOG2_PAGE_SIZE, MAX_CHAR, PAGES, PAGE_SIZE};
use crate::layout::{Align, GlyphLayout, GlyphRun};

/// Sentinel glyph code stored in runs for characters resolved through the
/// font's missing-glyph fallback. Real glyph ids at or below zero become the
/// missing glyph at parse time, so table slot 0 is never occupied.
pub const MISSING_GLYPH_CODE: u32 = 0;

/// One texture page of a font: the image path from the description and the
/// texture region filled in once the image is loaded.
#[derive(Debug, Clone, Default)]
pub struct FontPage {
    /// Image file name as declared in the font description.
    pub image_path: String,
    /// Resolved page texture region; default until
    /// [`BitmapFont::resolve_page_regions`] runs.
    pub region: TextureRegion,
}

type GlyphPage = Box<[Option<Glyph>]>;

/// Glyph metric tables and global metrics for one bitmap font.
///
/// The metric fields are read-only once loading finishes except through
/// [`set_scale`](Self::set_scale) and
/// [`set_fixed_width_glyphs`](Self::set_fixed_width_glyphs); layout and
/// caching only ever take `&BitmapFont`, so independent layouts may be
/// computed concurrently from a shared font.
#[derive(Debug)]
pub struct BitmapFont {
    /// True if the font was loaded for a y-down coordinate system.
    pub flipped: bool,
    /// When set, a literal `[[` in shaped text produces one `[` glyph.
    pub markup_enabled: bool,
    /// Whether caches created for this font round positions to integers.
    pub integer: bool,
    /// Padding above glyphs, scaled.
    pub pad_top: f32,
    /// Padding right of glyphs, scaled.
    pub pad_right: f32,
    /// Padding below glyphs, scaled.
    pub pad_bottom: f32,
    /// Padding left of glyphs, scaled.
    pub pad_left: f32,
    /// Distance from the drawing position down to the cap line of the first
    /// line of text.
    pub cap_height: f32,
    /// Distance from the cap height to the top of the tallest glyph.
    pub ascent: f32,
    /// Distance from the lowest glyph extent to the baseline (negative).
    pub descent: f32,
    /// Signed distance to move for each `\n`; sign follows [`flipped`](Self::flipped).
    pub down: f32,
    /// Multiplier applied to [`down`](Self::down) for blank lines.
    pub blank_line_scale: f32,
    /// Advance of the space character, scaled.
    pub space_xadvance: f32,
    /// Distance from the top of most lowercase characters to the baseline.
    pub x_height: f32,
    /// Fallback glyph for characters missing from the font, if configured.
    pub missing_glyph: Option<Glyph>,
    /// Characters besides whitespace where lines may wrap, e.g. a hyphen.
    pub break_chars: Vec<char>,
    /// Texture pages, in declaration order.
    pub pages: Vec<FontPage>,
    line_height: f32,
    scale_x: f32,
    scale_y: f32,
    glyphs: Vec<Option<GlyphPage>>,
}

impl BitmapFont {
    /// Creates an empty font with default metrics. Populated by the
    /// description parser; tests may fill it by hand.
    pub fn new(flipped: bool) -> Self {
        Self {
            flipped,
            markup_enabled: false,
            integer: true,
            pad_top: 0.0,
            pad_right: 0.0,
            pad_bottom: 0.0,
            pad_left: 0.0,
            cap_height: 1.0,
            ascent: 0.0,
            descent: 0.0,
            down: 0.0,
            blank_line_scale: 1.0,
            space_xadvance: 0.0,
            x_height: 1.0,
            missing_glyph: None,
            break_chars: Vec::new(),
            pages: Vec::new(),
            line_height: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            glyphs: (0..PAGES).map(|_| None).collect(),
        }
    }

    /// Distance from one line of text to the next, scaled.
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Sets the line height and rederives [`down`](Self::down) from the flip
    /// orientation.
    pub fn set_line_height(&mut self, value: f32) {
        self.line_height = value * self.scale_y;
        self.down = if self.flipped {
            self.line_height
        } else {
            -self.line_height
        };
    }

    /// Current horizontal scale.
    pub fn scale_x(&self) -> f32 {
        self.scale_x
    }

    /// Current vertical scale.
    pub fn scale_y(&self) -> f32 {
        self.scale_y
    }

    /// Scales the font on both axes. Every call is relative to the current
    /// scale (metrics are multiplied by `new / old`), never an absolute
    /// reset.
    ///
    /// # Panics
    ///
    /// Panics if either scale is zero, which would collapse all subsequent
    /// size math.
    pub fn set_scale(&mut self, scale_x: f32, scale_y: f32) {
        assert!(scale_x != 0.0, "scale_x cannot be 0");
        assert!(scale_y != 0.0, "scale_y cannot be 0");
        let x = scale_x / self.scale_x;
        let y = scale_y / self.scale_y;
        self.line_height *= y;
        self.space_xadvance *= x;
        self.x_height *= y;
        self.cap_height *= y;
        self.ascent *= y;
        self.descent *= y;
        self.down *= y;
        self.pad_left *= x;
        self.pad_right *= x;
        self.pad_top *= y;
        self.pad_bottom *= y;
        self.scale_x = scale_x;
        self.scale_y = scale_y;
    }

    /// Scales the font uniformly. See [`set_scale`](Self::set_scale).
    pub fn set_scale_xy(&mut self, scale: f32) {
        self.set_scale(scale, scale);
    }

    /// Adds `amount` to both scales. See [`set_scale`](Self::set_scale).
    pub fn scale(&mut self, amount: f32) {
        self.set_scale(self.scale_x + amount, self.scale_y + amount);
    }

    /// Stores a glyph in the sparse table, allocating its leaf page lazily.
    pub fn set_glyph(&mut self, code: u32, glyph: Glyph) {
        if code > MAX_CHAR {
            return;
        }
        let page = self.glyphs[code as usize >> LOG2_PAGE_SIZE]
            .get_or_insert_with(|| (0..PAGE_SIZE).map(|_| None).collect());
        page[code as usize & (PAGE_SIZE - 1)] = Some(glyph);
    }

    /// Returns the glyph for `ch`, or `None` if the font has no such glyph.
    /// Use [`shape`](Self::shape) to convert whole strings, which applies
    /// the missing-glyph fallback.
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        let code = ch as usize;
        if code > MAX_CHAR as usize {
            return None;
        }
        self.glyphs[code >> LOG2_PAGE_SIZE]
            .as_ref()
            .and_then(|page| page[code & (PAGE_SIZE - 1)].as_ref())
    }

    /// Mutable access to the glyph for `ch`.
    pub fn glyph_mut(&mut self, ch: char) -> Option<&mut Glyph> {
        let code = ch as usize;
        if code > MAX_CHAR as usize {
            return None;
        }
        self.glyphs[code >> LOG2_PAGE_SIZE]
            .as_mut()
            .and_then(|page| page[code & (PAGE_SIZE - 1)].as_mut())
    }

    /// Resolves a glyph code stored in a [`GlyphRun`], mapping the
    /// [`MISSING_GLYPH_CODE`] sentinel to the fallback glyph.
    pub fn resolve(&self, code: u32) -> Option<&Glyph> {
        if code == MISSING_GLYPH_CODE {
            return self.missing_glyph.as_ref();
        }
        char::from_u32(code).and_then(|ch| self.glyph(ch))
    }

    /// True if the font has a glyph for `ch` or a missing-glyph fallback.
    pub fn has_glyph(&self, ch: char) -> bool {
        self.missing_glyph.is_some() || self.glyph(ch).is_some()
    }

    /// First glyph in the table with non-empty pixels, if any.
    pub fn first_glyph(&self) -> Option<&Glyph> {
        self.glyphs
            .iter()
            .flatten()
            .flat_map(|page| page.iter().flatten())
            .find(|glyph| glyph.width != 0 && glyph.height != 0)
    }

    /// Number of glyphs stored in the table (missing glyph not counted).
    pub fn glyph_count(&self) -> usize {
        self.all_glyphs().count()
    }

    pub(crate) fn all_glyphs(&self) -> impl Iterator<Item = &Glyph> {
        self.glyphs
            .iter()
            .flatten()
            .flat_map(|page| page.iter().flatten())
    }

    /// Shapes `chars[start..end]` into `run`, appending glyph codes and pen
    /// advances.
    ///
    /// The slice must not contain newlines. `\r` is skipped; characters
    /// without a glyph fall back to the missing glyph or are dropped. With
    /// markup enabled a literal `[[` produces one `[` glyph. `last_glyph` is
    /// the glyph immediately before this run, or `None` at a line start,
    /// where the first advance compensates the glyph's left offset so
    /// nothing draws left of the origin. On return
    /// `run.x_advances.len() == run.glyphs.len() + 1`; the trailing entry is
    /// the last glyph's visible width.
    pub fn shape(
        &self,
        run: &mut GlyphRun,
        chars: &[char],
        start: usize,
        end: usize,
        last_glyph: Option<u32>,
    ) {
        let mut index = start;
        let mut last = last_glyph;
        let scale_x = self.scale_x;
        run.glyphs.reserve(end - index);
        run.x_advances.reserve(end - index + 1);
        while index < end {
            let ch = chars[index];
            index += 1;
            if ch == '\r' {
                continue;
            }
            let (code, glyph) = match self.glyph(ch) {
                Some(glyph) => (ch as u32, glyph),
                None => match self.missing_glyph.as_ref() {
                    Some(glyph) => (MISSING_GLYPH_CODE, glyph),
                    None => continue,
                },
            };
            run.glyphs.push(code);
            match last.and_then(|code| self.resolve(code)) {
                // First glyph on the line; keep it from drawing left of 0.
                None => run.x_advances.push(if glyph.fixed_width {
                    0.0
                } else {
                    -(glyph.xoffset as f32) * scale_x - self.pad_left
                }),
                Some(prev) => run
                    .x_advances
                    .push((prev.xadvance as f32 + prev.kerning(ch) as f32) * scale_x),
            }
            last = Some(code);
            // "[[" is an escaped left square bracket, skip the second one.
            if self.markup_enabled && ch == '[' && index < end && chars[index] == '[' {
                index += 1;
            }
        }
        if let Some(last) = last.and_then(|code| self.resolve(code)) {
            let last_width = if last.fixed_width {
                last.xadvance as f32 * scale_x
            } else {
                (last.width + last.xoffset) as f32 * scale_x - self.pad_right
            };
            run.x_advances.push(last_width);
        }
    }

    /// First valid glyph index at which to wrap to the next line, scanning
    /// backwards from `start` for whitespace or a configured break
    /// character. Returns 0 when no wrap point exists before the run start.
    pub fn wrap_index(&self, glyphs: &[u32], start: usize) -> usize {
        let mut i = start - 1;
        let mut ch = code_char(glyphs[i]);
        if Self::is_whitespace(ch) {
            return i;
        }
        if self.is_break_char(ch) {
            i -= 1;
        }
        while i > 0 {
            ch = code_char(glyphs[i]);
            if self.is_break_char(ch) || Self::is_whitespace(ch) {
                return i + 1;
            }
            i -= 1;
        }
        0
    }

    /// True if `c` is one of the configured break characters.
    pub fn is_break_char(&self, c: char) -> bool {
        self.break_chars.contains(&c)
    }

    /// True for the whitespace characters considered wrap points.
    pub fn is_whitespace(c: char) -> bool {
        matches!(c, '\n' | '\r' | '\t' | ' ')
    }

    /// Makes the glyphs for `chars` fixed width, e.g. to keep numbers from
    /// jumping around as a score changes. Widens every glyph's advance to
    /// the widest of the set, recenters the draw offset, and clears kerning.
    pub fn set_fixed_width_glyphs(&mut self, chars: &str) {
        let mut max_advance = 0;
        for ch in chars.chars() {
            if let Some(glyph) = self.glyph(ch) {
                max_advance = max_advance.max(glyph.xadvance);
            }
        }
        for ch in chars.chars() {
            if let Some(glyph) = self.glyph_mut(ch) {
                glyph.xoffset += (((max_advance - glyph.xadvance) as f32) * 0.5).round() as i32;
                glyph.xadvance = max_advance;
                glyph.kerning = None;
                glyph.fixed_width = true;
            }
        }
    }

    /// Fills every glyph's UV coordinates from the given page regions, one
    /// region per declared page in order. Call once the page textures are
    /// loaded.
    ///
    /// # Errors
    ///
    /// Fails if the number of regions does not match the declared page
    /// count.
    pub fn resolve_page_regions(&mut self, regions: &[TextureRegion]) -> FontResult<()> {
        if regions.len() != self.pages.len() {
            return Err(FontError::PageCountMismatch {
                expected: self.pages.len(),
                actual: regions.len(),
            });
        }
        for (page, region) in self.pages.iter_mut().zip(regions) {
            page.region = *region;
        }
        let flipped = self.flipped;
        for page in self.glyphs.iter_mut().flatten() {
            for glyph in page.iter_mut().flatten() {
                set_glyph_region(glyph, &regions[glyph.page], flipped);
            }
        }
        if let Some(glyph) = self.missing_glyph.as_mut() {
            set_glyph_region(glyph, &regions[glyph.page], flipped);
        }
        Ok(())
    }

    /// Lays out and draws `text` at the given position, returning the
    /// layout. For repeated drawing of static text, keep a
    /// [`BitmapFontCache`] instead.
    pub fn draw(&self, batch: &mut dyn Batch, text: &str, x: f32, y: f32) -> GlyphLayout {
        let mut cache = BitmapFontCache::new(self);
        let layout = cache.set_text(self, text, x, y).clone();
        cache.draw(self, batch);
        layout
    }

    /// Lays out and draws `text` with wrapping and alignment against
    /// `target_width`, returning the layout.
    pub fn draw_block(
        &self,
        batch: &mut dyn Batch,
        text: &str,
        x: f32,
        y: f32,
        target_width: f32,
        halign: Align,
        wrap: bool,
    ) -> GlyphLayout {
        let mut cache = BitmapFontCache::new(self);
        let end = text.chars().count();
        let layout = cache
            .set_text_block(self, text, x, y, 0, end, target_width, halign, wrap, None)
            .clone();
        cache.draw(self, batch);
        layout
    }
}

/// Character for a stored glyph code; the missing-glyph sentinel maps to NUL,
/// which is neither whitespace nor a break character.
pub(crate) fn code_char(code: u32) -> char {
    char::from_u32(code).unwrap_or('\0')
}

fn set_glyph_region(glyph: &mut Glyph, region: &TextureRegion, flipped: bool) {
    let inv_width = 1.0 / region.texture_width as f32;
    let inv_height = 1.0 / region.texture_height as f32;
    let x = glyph.src_x as f32;
    let x2 = (glyph.src_x + glyph.width) as f32;
    let y = glyph.src_y as f32;
    let y2 = (glyph.src_y + glyph.height) as f32;
    glyph.u = region.u + x * inv_width;
    glyph.u2 = region.u + x2 * inv_width;
    if flipped {
        glyph.v = region.v + y * inv_height;
        glyph.v2 = region.v + y2 * inv_height;
    } else {
        glyph.v2 = region.v + y * inv_height;
        glyph.v = region.v + y2 * inv_height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::TextureHandle;
    use crate::test_util::{test_font, TEST_DESCRIPTION};
    use approx::assert_relative_eq;

    fn shape_str(font: &BitmapFont, text: &str) -> GlyphRun {
        let chars: Vec<char> = text.chars().collect();
        let mut run = GlyphRun::new(crate::color::white());
        font.shape(&mut run, &chars, 0, chars.len(), None);
        run
    }

    #[test]
    fn test_lookup_and_has_glyph() {
        let font = test_font();
        assert!(font.glyph('H').is_some());
        assert!(font.glyph('!').is_none());
        assert!(!font.has_glyph('!'));
        assert!(font.has_glyph('H'));
    }

    #[test]
    fn test_shape_advances_count() {
        let font = test_font();
        let run = shape_str(&font, "Hello");
        assert_eq!(run.glyphs.len(), 5);
        assert_eq!(run.x_advances.len(), 6);
    }

    #[test]
    fn test_shape_first_advance_compensates_offset() {
        let font = test_font();
        let run = shape_str(&font, "H");
        // H has xoffset=1, no padding in the fixture.
        assert_relative_eq!(run.x_advances[0], -1.0);
        // Trailing advance is the visible width: width + xoffset.
        assert_relative_eq!(run.x_advances[1], 9.0);
    }

    #[test]
    fn test_shape_skips_carriage_return() {
        let font = test_font();
        let run = shape_str(&font, "H\re");
        assert_eq!(run.glyphs.len(), 2);
    }

    #[test]
    fn test_shape_drops_unmapped_without_fallback() {
        let font = test_font();
        let run = shape_str(&font, "H!e");
        assert_eq!(run.glyphs.len(), 2);
    }

    #[test]
    fn test_shape_uses_missing_glyph_fallback() {
        let mut font = test_font();
        font.missing_glyph = Some(Glyph {
            id: 0,
            xadvance: 4,
            width: 4,
            height: 4,
            ..Glyph::default()
        });
        let run = shape_str(&font, "H!e");
        assert_eq!(run.glyphs.len(), 3);
        assert_eq!(run.glyphs[1], MISSING_GLYPH_CODE);
    }

    #[test]
    fn test_shape_applies_kerning() {
        let mut font = test_font();
        font.glyph_mut('H').unwrap().set_kerning('e' as u32, -2);
        let run = shape_str(&font, "He");
        // Advance to 'e' is H.xadvance + kerning = 9 - 2.
        assert_relative_eq!(run.x_advances[1], 7.0);
    }

    #[test]
    fn test_markup_escape_emits_single_bracket() {
        let mut font = test_font();
        font.markup_enabled = true;
        font.set_glyph(
            '[' as u32,
            Glyph {
                id: '[' as u32,
                width: 3,
                height: 10,
                xadvance: 4,
                ..Glyph::default()
            },
        );
        let run = shape_str(&font, "[[H");
        assert_eq!(run.glyphs.len(), 2);
        assert_eq!(run.glyphs[0], '[' as u32);
    }

    #[test]
    fn test_set_scale_is_relative() {
        let mut font = test_font();
        let base_line_height = font.line_height();
        font.set_scale(2.0, 2.0);
        assert_relative_eq!(font.line_height(), base_line_height * 2.0);
        font.set_scale(1.0, 1.0);
        assert_relative_eq!(font.line_height(), base_line_height);
    }

    #[test]
    #[should_panic(expected = "scale_x cannot be 0")]
    fn test_set_scale_rejects_zero() {
        let mut font = test_font();
        font.set_scale(0.0, 1.0);
    }

    #[test]
    fn test_fixed_width_glyphs() {
        let mut font = test_font();
        font.glyph_mut('l').unwrap().set_kerning('o' as u32, -1);
        font.set_fixed_width_glyphs("lo");
        let l = font.glyph('l').unwrap();
        let o = font.glyph('o').unwrap();
        assert_eq!(l.xadvance, o.xadvance);
        assert!(l.fixed_width);
        assert!(l.kerning.is_none());
        // Fixed-width glyphs shape with a zero leading advance.
        let run = shape_str(&font, "l");
        assert_relative_eq!(run.x_advances[0], 0.0);
    }

    #[test]
    fn test_wrap_index_prefers_whitespace() {
        let font = test_font();
        let glyphs: Vec<u32> = "Hello World".chars().map(|c| c as u32).collect();
        // Overflow at 'r' (index 8); nearest preceding whitespace is index 5.
        assert_eq!(font.wrap_index(&glyphs, 8), 6);
        // No whitespace before index 3 in "Hello".
        assert_eq!(font.wrap_index(&glyphs, 3), 0);
    }

    #[test]
    fn test_wrap_index_honors_break_chars() {
        let mut font = test_font();
        font.break_chars.push('-');
        let glyphs: Vec<u32> = "He-lo".chars().map(|c| c as u32).collect();
        assert_eq!(font.wrap_index(&glyphs, 4), 3);
    }

    #[test]
    fn test_resolve_page_regions_fills_uvs() {
        let mut font = BitmapFont::from_description(TEST_DESCRIPTION, false).unwrap();
        let region = TextureRegion::new(TextureHandle::new(1), 64, 64);
        font.resolve_page_regions(&[region]).unwrap();
        let h = font.glyph('H').unwrap();
        assert_relative_eq!(h.u, 0.0);
        assert_relative_eq!(h.u2, 8.0 / 64.0);
        // Unflipped: v comes from the bottom edge of the source rect.
        assert!(h.v > h.v2);
    }

    #[test]
    fn test_resolve_page_regions_count_mismatch() {
        let mut font = test_font();
        assert!(font.resolve_page_regions(&[]).is_err());
    }
}
