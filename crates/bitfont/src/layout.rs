//! Line layout: run segmentation, wrapping, truncation, and alignment
//!
//! A [`GlyphLayout`] turns a character range into positioned [`GlyphRun`]s.
//! Runs are delimited by newlines; within a run the engine walks the shaped
//! advances and either sums them directly (no wrapping), splits the run at
//! the nearest preceding wrap point when a glyph's visible edge would cross
//! the target width, or truncates the run with a marker string. Layout is
//! recomputed in full on every call; there is no incremental re-layout.

use crate::color::{white, Color};
use crate::font::{code_char, BitmapFont};

/// Horizontal alignment of laid-out text inside the target width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Lines start at x = 0; the alignment pass is skipped.
    #[default]
    Left,
    /// Lines are centered inside the target width.
    Center,
    /// Lines end at the target width.
    Right,
}

/// A contiguous sequence of shaped glyphs sharing one color and one visual
/// line segment.
///
/// Glyphs are stored as character codes indexing the font's glyph table
/// (code 0 is the missing-glyph sentinel); the font owns the metrics and
/// outlives any layout. `x_advances` always holds `glyphs.len() + 1`
/// entries: the offset of the first glyph from the run anchor, the kerned
/// advance to each subsequent glyph, and the trailing visible width of the
/// final glyph.
#[derive(Debug, Clone)]
pub struct GlyphRun {
    /// Glyph codes, resolvable through [`BitmapFont::resolve`].
    pub glyphs: Vec<u32>,
    /// Pen advances; see the type-level docs for the layout.
    pub x_advances: Vec<f32>,
    /// X of the run anchor relative to the layout origin.
    pub x: f32,
    /// Y of the run anchor relative to the layout origin.
    pub y: f32,
    /// Total advance width of the run.
    pub width: f32,
    /// Color applied to every glyph in the run.
    pub color: Color,
}

impl GlyphRun {
    /// Creates an empty run with the given color.
    pub fn new(color: Color) -> Self {
        Self {
            glyphs: Vec::new(),
            x_advances: Vec::new(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            color,
        }
    }
}

/// Positioned glyph runs for a piece of text, with the aggregate size of the
/// laid-out block.
#[derive(Debug, Clone, Default)]
pub struct GlyphLayout {
    /// Runs in layout order.
    pub runs: Vec<GlyphRun>,
    /// Width of the widest line.
    pub width: f32,
    /// Height derived from line counts and font line metrics, not from
    /// glyph bounds.
    pub height: f32,
}

impl GlyphLayout {
    /// Creates an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lays out `text` with no wrapping or alignment and a white color.
    pub fn from_text(font: &BitmapFont, text: &str) -> Self {
        let mut layout = Self::new();
        layout.set_text(font, text);
        layout
    }

    /// Replaces this layout with `text`, unwrapped, white, left-aligned.
    pub fn set_text(&mut self, font: &BitmapFont, text: &str) {
        let end = text.chars().count();
        self.set_text_block(font, text, 0, end, white(), 0.0, Align::Left, false, None);
    }

    /// Replaces this layout with `text[start..end]` (char indices), laid out
    /// against `target_width`.
    ///
    /// `target_width` is used for wrapping, truncation, and alignment; it
    /// may be zero when none of those apply. Wrapping is disabled whenever
    /// the target width would fit at most a character per line (at or below
    /// three space advances). A non-`None` `truncate` string overrides
    /// wrapping: once a glyph overflows, the run is cut and the marker's
    /// glyphs are appended instead. An empty marker truncates without
    /// appending.
    ///
    /// A run that shapes to zero glyphs (unmapped characters and no fallback
    /// glyph) terminates layout at that point; everything laid out so far is
    /// kept.
    pub fn set_text_block(
        &mut self,
        font: &BitmapFont,
        text: &str,
        start: usize,
        end: usize,
        color: Color,
        target_width: f32,
        halign: Align,
        wrap: bool,
        truncate: Option<&str>,
    ) {
        let chars: Vec<char> = text.chars().collect();
        let end = end.min(chars.len());
        let mut start = start.min(end);

        let wrap = if truncate.is_some() {
            // Runs the overflow detection; the action taken is truncation.
            true
        } else if target_width <= font.space_xadvance * 3.0 {
            // Avoid one line per character, which is very inefficient.
            false
        } else {
            wrap
        };

        self.runs.clear();
        let mut x = 0.0f32;
        let mut y = 0.0f32;
        let mut width = 0.0f32;
        let mut lines = 0usize;
        let mut blank_lines = 0usize;
        let mut last_glyph: Option<u32> = None;
        let mut run_start = start;

        'outer: loop {
            // Each run is delimited by a newline or the end of the range.
            let mut run_end: Option<usize> = None;
            let mut newline = false;
            if start == end {
                if run_start == end {
                    break; // End of string with no run to process.
                }
                run_end = Some(end);
            } else {
                let ch = chars[start];
                start += 1;
                if ch == '\n' {
                    run_end = Some(start - 1);
                    newline = true;
                }
            }
            if let Some(run_end) = run_end {
                if run_end != run_start {
                    // Store the run that has ended.
                    let mut run = GlyphRun::new(color);
                    font.shape(&mut run, &chars, run_start, run_end, last_glyph);
                    if run.glyphs.is_empty() {
                        break; // Nothing shapeable; layout ends here.
                    }
                    last_glyph = run.glyphs.last().copied();
                    run.x = x;
                    run.y = y;
                    if newline || run_end == end {
                        Self::adjust_last_glyph(font, &mut run);
                    }
                    self.runs.push(run);
                    let mut run_idx = self.runs.len() - 1;

                    if !wrap {
                        let run = &mut self.runs[run_idx];
                        let run_width: f32 = run.x_advances.iter().sum();
                        x += run_width;
                        run.width = run_width;
                    } else {
                        // Wrap or truncate.
                        {
                            let run = &mut self.runs[run_idx];
                            x += run.x_advances[0];
                            run.width = run.x_advances[0];
                            if run.x_advances.len() > 1 {
                                x += run.x_advances[1];
                                run.width += run.x_advances[1];
                            }
                        }
                        let mut i = 2;
                        while i < self.runs[run_idx].x_advances.len() {
                            let run = &self.runs[run_idx];
                            let glyph_width = match font.resolve(run.glyphs[i - 1]) {
                                Some(glyph) => {
                                    (glyph.width + glyph.xoffset) as f32 * font.scale_x()
                                        - font.pad_right
                                }
                                None => 0.0,
                            };
                            if x + glyph_width <= target_width {
                                // Glyph fits.
                                let advance = run.x_advances[i];
                                x += advance;
                                self.runs[run_idx].width += advance;
                                i += 1;
                                continue;
                            }
                            if let Some(truncate) = truncate {
                                self.truncate_run(font, run_idx, target_width, truncate, i);
                                let run = &self.runs[run_idx];
                                x = run.x + run.width;
                                break 'outer;
                            }
                            // Wrap.
                            let mut wrap_index =
                                font.wrap_index(&self.runs[run_idx].glyphs, i);
                            let run = &self.runs[run_idx];
                            if (run.x == 0.0 && wrap_index == 0)
                                || wrap_index >= run.glyphs.len()
                            {
                                // Wrap at least the glyph that didn't fit.
                                wrap_index = i - 1;
                            }
                            if wrap_index == 0 {
                                // Move the entire run to the next line.
                                {
                                    let run = &mut self.runs[run_idx];
                                    run.width = 0.0;
                                    let mut skip = 0;
                                    while skip < run.glyphs.len()
                                        && BitmapFont::is_whitespace(code_char(run.glyphs[skip]))
                                    {
                                        skip += 1;
                                    }
                                    if skip > 0 {
                                        run.glyphs.drain(0..skip);
                                        run.x_advances.drain(1..=skip);
                                    }
                                    if let Some(glyph) =
                                        run.glyphs.first().and_then(|&code| font.resolve(code))
                                    {
                                        run.x_advances[0] = -(glyph.xoffset as f32)
                                            * font.scale_x()
                                            - font.pad_left;
                                    }
                                }
                                if self.runs.len() > 1 {
                                    // The previous run now ends a line: strip
                                    // its trailing whitespace and restore the
                                    // final advance to a visible width.
                                    let previous = &mut self.runs[run_idx - 1];
                                    let mut last_index = previous.glyphs.len() - 1;
                                    while last_index > 0
                                        && BitmapFont::is_whitespace(code_char(
                                            previous.glyphs[last_index],
                                        ))
                                    {
                                        previous.width -= previous.x_advances[last_index + 1];
                                        last_index -= 1;
                                    }
                                    previous.glyphs.truncate(last_index + 1);
                                    previous.x_advances.truncate(last_index + 2);
                                    Self::adjust_last_glyph(font, previous);
                                    width = width.max(previous.x + previous.width);
                                }
                            } else {
                                match self.wrap_run(font, run_idx, wrap_index, i, &mut width) {
                                    None => {
                                        // All wrapped glyphs were whitespace.
                                        x = 0.0;
                                        y += font.down;
                                        lines += 1;
                                        last_glyph = None;
                                        break;
                                    }
                                    Some(next) => self.runs.push(next),
                                }
                            }
                            // Start over with the current run on a new line.
                            run_idx = self.runs.len() - 1;
                            let run = &mut self.runs[run_idx];
                            x = run.x_advances[0];
                            if run.x_advances.len() > 1 {
                                x += run.x_advances[1];
                            }
                            run.width += x;
                            y += font.down;
                            lines += 1;
                            run.x = 0.0;
                            run.y = y;
                            i = 2;
                            last_glyph = None;
                        }
                    }
                }
                if newline {
                    // The next run will be on the next line.
                    width = width.max(x);
                    x = 0.0;
                    let mut down = font.down;
                    if run_end == run_start {
                        // Blank line.
                        down *= font.blank_line_scale;
                        blank_lines += 1;
                    } else {
                        lines += 1;
                    }
                    y += down;
                    last_glyph = None;
                }
                run_start = start;
            }
        }
        width = width.max(x);

        // Align runs to the center or right of the target width.
        if halign != Align::Left {
            let center = halign == Align::Center;
            let mut line_width = 0.0f32;
            let mut line_y = f32::MIN;
            let mut line_start = 0usize;
            for i in 0..self.runs.len() {
                if self.runs[i].y != line_y {
                    line_y = self.runs[i].y;
                    let mut shift = target_width - line_width;
                    if center {
                        shift *= 0.5;
                    }
                    while line_start < i {
                        self.runs[line_start].x += shift;
                        line_start += 1;
                    }
                    line_width = 0.0;
                }
                line_width = line_width.max(self.runs[i].x + self.runs[i].width);
            }
            let mut shift = target_width - line_width;
            if center {
                shift *= 0.5;
            }
            while line_start < self.runs.len() {
                self.runs[line_start].x += shift;
                line_start += 1;
            }
        }

        self.width = width;
        let line_advance = if font.flipped { font.down } else { -font.down };
        self.height = font.cap_height
            + lines as f32 * line_advance
            + blank_lines as f32 * line_advance * font.blank_line_scale;
    }

    /// Cuts the run at `run_idx` to fit `target_width` with the shaped
    /// `truncate` marker appended. `width_index` is the advance index at
    /// which overflow was detected.
    fn truncate_run(
        &mut self,
        font: &BitmapFont,
        run_idx: usize,
        target_width: f32,
        truncate: &str,
        _width_index: usize,
    ) {
        // Shape the marker separately to learn its width.
        let mut truncate_run = GlyphRun::new(self.runs[run_idx].color);
        let marker_chars: Vec<char> = truncate.chars().collect();
        font.shape(&mut truncate_run, &marker_chars, 0, marker_chars.len(), None);
        let mut truncate_width = 0.0f32;
        if !truncate_run.x_advances.is_empty() {
            Self::adjust_last_glyph(font, &mut truncate_run);
            // Skip the first advance for tight bounds.
            for advance in &truncate_run.x_advances[1..] {
                truncate_width += advance;
            }
        }
        let target_width = target_width - truncate_width;

        // Determine how many of the run's glyphs fit in the reduced budget.
        let run = &mut self.runs[run_idx];
        let mut count = 0usize;
        let mut width = run.x;
        while count < run.x_advances.len() {
            let advance = run.x_advances[count];
            width += advance;
            if width > target_width {
                run.width = width - run.x - advance;
                break;
            }
            count += 1;
        }

        if count > 1 {
            // Some run glyphs fit; append the marker glyphs after them.
            run.glyphs.truncate(count - 1);
            run.x_advances.truncate(count);
            Self::adjust_last_glyph(font, run);
            if truncate_run.x_advances.len() > 1 {
                run.x_advances
                    .extend_from_slice(&truncate_run.x_advances[1..]);
            }
        } else {
            // No run glyphs fit; the run becomes the marker alone.
            run.glyphs.clear();
            run.x_advances.clear();
            run.x_advances.extend_from_slice(&truncate_run.x_advances);
            if let Some(&first) = truncate_run.x_advances.first() {
                run.width += first;
            }
        }
        run.glyphs.extend_from_slice(&truncate_run.glyphs);
        run.width += truncate_width;
    }

    /// Splits the run at `run_idx` (always the last run) at `wrap_index`,
    /// returning the remainder run to continue on the next line, or `None`
    /// if the remainder was all whitespace. `width_index` is the advance
    /// index where overflow was detected; the first run's width is rebuilt
    /// from its advances rather than approximated. Updates `layout_width`
    /// with the first run's final extent, and drops the first run entirely
    /// if the split leaves it empty.
    fn wrap_run(
        &mut self,
        font: &BitmapFont,
        run_idx: usize,
        wrap_index: usize,
        mut width_index: usize,
        layout_width: &mut f32,
    ) -> Option<GlyphRun> {
        let glyph_count = self.runs[run_idx].glyphs.len();

        // Skip whitespace before the wrap index.
        let mut first_end = wrap_index;
        {
            let run = &self.runs[run_idx];
            while first_end > 0
                && BitmapFont::is_whitespace(code_char(run.glyphs[first_end - 1]))
            {
                first_end -= 1;
            }
        }
        // Skip whitespace after the wrap index.
        let mut second_start = wrap_index;
        {
            let run = &self.runs[run_idx];
            while second_start < glyph_count
                && BitmapFont::is_whitespace(code_char(run.glyphs[second_start]))
            {
                second_start += 1;
            }
        }

        // Rebuild the first run's width so nothing is double counted: grow
        // it up to the end index, then peel off any advances past it that
        // had already contributed.
        {
            let run = &mut self.runs[run_idx];
            while width_index < first_end {
                run.width += run.x_advances[width_index];
                width_index += 1;
            }
            while width_index > first_end + 1 {
                width_index -= 1;
                run.width -= run.x_advances[width_index];
            }
        }

        // Move the remainder into a new run.
        let second = if second_start < glyph_count {
            let run = &mut self.runs[run_idx];
            let mut second = GlyphRun::new(run.color);
            second.glyphs = run.glyphs.split_off(second_start);
            run.glyphs.truncate(first_end);
            let first_offset = second
                .glyphs
                .first()
                .and_then(|&code| font.resolve(code))
                .map_or(0.0, |glyph| {
                    -(glyph.xoffset as f32) * font.scale_x() - font.pad_left
                });
            second.x_advances.reserve(glyph_count + 1 - second_start);
            second.x_advances.push(first_offset);
            second
                .x_advances
                .extend_from_slice(&run.x_advances[second_start + 1..]);
            run.x_advances.truncate(first_end + 1);
            Some(second)
        } else {
            // The remainder is empty; just trim trailing whitespace.
            let run = &mut self.runs[run_idx];
            run.glyphs.truncate(first_end);
            run.x_advances.truncate(first_end + 1);
            None
        };

        if first_end == 0 {
            // The first run is now empty; remove it.
            if let Some(removed) = self.runs.pop() {
                *layout_width = layout_width.max(removed.x + removed.width);
            }
        } else {
            let run = &mut self.runs[run_idx];
            Self::adjust_last_glyph(font, run);
            *layout_width = layout_width.max(run.x + run.width);
        }
        second
    }

    /// Replaces the final advance of `run` with the last glyph's visible
    /// width so line-end width math reflects what is drawn, not the raw
    /// advance.
    fn adjust_last_glyph(font: &BitmapFont, run: &mut GlyphRun) {
        let Some(last) = run.glyphs.last().and_then(|&code| font.resolve(code)) else {
            return;
        };
        if last.fixed_width {
            return;
        }
        let width = (last.width + last.xoffset) as f32 * font.scale_x() - font.pad_right;
        let n = run.x_advances.len();
        run.width += width - run.x_advances[n - 1];
        run.x_advances[n - 1] = width;
    }

    /// Clears the layout without releasing backing storage.
    pub fn reset(&mut self) {
        self.runs.clear();
        self.width = 0.0;
        self.height = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::test_font;
    use approx::assert_relative_eq;

    fn codes(text: &str) -> Vec<u32> {
        text.chars().map(|c| c as u32).collect()
    }

    #[test]
    fn test_unwrapped_width_is_sum_of_advances() {
        let font = test_font();
        let layout = GlyphLayout::from_text(&font, "Hello");
        assert_eq!(layout.runs.len(), 1);
        let run = &layout.runs[0];
        assert_eq!(run.glyphs, codes("Hello"));
        let advance_sum: f32 = run.x_advances.iter().sum();
        assert_relative_eq!(layout.width, advance_sum);
        // a0 = -xoffset, four advances of 9, trailing visible width 9.
        assert_relative_eq!(layout.width, -1.0 + 9.0 * 4.0 + 9.0);
    }

    #[test]
    fn test_unwrapped_width_ignores_target_width() {
        let font = test_font();
        let mut narrow = GlyphLayout::new();
        narrow.set_text_block(
            &font, "Hello", 0, 5, white(), 10_000.0, Align::Left, false, None,
        );
        let plain = GlyphLayout::from_text(&font, "Hello");
        assert_relative_eq!(narrow.width, plain.width);
    }

    #[test]
    fn test_single_line_height_is_cap_height() {
        let font = test_font();
        let layout = GlyphLayout::from_text(&font, "Hello");
        assert_relative_eq!(layout.height, font.cap_height);
    }

    #[test]
    fn test_newline_starts_new_run() {
        let font = test_font();
        let layout = GlyphLayout::from_text(&font, "He\nlo");
        assert_eq!(layout.runs.len(), 2);
        assert_relative_eq!(layout.runs[0].y, 0.0);
        assert_relative_eq!(layout.runs[1].y, font.down);
        assert_relative_eq!(layout.height, font.cap_height - font.down);
    }

    #[test]
    fn test_blank_line_accounting() {
        let font = test_font();
        let layout = GlyphLayout::from_text(&font, "H\n\no");
        assert_eq!(layout.runs.len(), 2);
        // One normal line break plus one blank line (scale 1.0).
        assert_relative_eq!(layout.runs[1].y, font.down * 2.0);
        let line_advance = -font.down;
        assert_relative_eq!(layout.height, font.cap_height + 2.0 * line_advance);
    }

    #[test]
    fn test_blank_line_scale() {
        let mut font = test_font();
        font.blank_line_scale = 0.5;
        let layout = GlyphLayout::from_text(&font, "H\n\no");
        let line_advance = -font.down;
        assert_relative_eq!(
            layout.height,
            font.cap_height + 1.0 * line_advance + 1.0 * line_advance * 0.5,
        );
        assert_relative_eq!(layout.runs[1].y, font.down + font.down * 0.5);
    }

    #[test]
    fn test_wrap_breaks_at_space() {
        let font = test_font();
        let mut layout = GlyphLayout::new();
        layout.set_text_block(
            &font,
            "Hello World",
            0,
            11,
            white(),
            50.0,
            Align::Left,
            true,
            None,
        );
        assert_eq!(layout.runs.len(), 2);
        assert_eq!(layout.runs[0].glyphs, codes("Hello"));
        // Leading whitespace stripped from the wrapped remainder.
        assert_eq!(layout.runs[1].glyphs, codes("World"));
        assert_relative_eq!(layout.runs[1].y, font.down);
        assert_relative_eq!(layout.runs[1].x, 0.0);
    }

    #[test]
    fn test_wrapped_lines_fit_target_width() {
        let font = test_font();
        let mut layout = GlyphLayout::new();
        layout.set_text_block(
            &font,
            "Hello World Hello World",
            0,
            23,
            white(),
            50.0,
            Align::Left,
            true,
            None,
        );
        for run in &layout.runs {
            assert!(
                run.x + run.width <= 50.0 + 1e-3,
                "line extent {} exceeds target",
                run.x + run.width
            );
        }
    }

    #[test]
    fn test_wrap_forces_single_glyph_lines_when_unsplittable() {
        let font = test_font();
        let mut layout = GlyphLayout::new();
        // No whitespace anywhere; each line keeps at least one glyph even
        // though every glyph alone overflows the tiny width.
        layout.set_text_block(
            &font, "Hooo", 0, 4, white(), 16.0, Align::Left, true, None,
        );
        assert!(layout.runs.len() > 1);
        for run in &layout.runs {
            assert!(!run.glyphs.is_empty());
        }
    }

    #[test]
    fn test_wrap_disabled_below_space_threshold() {
        let font = test_font();
        let mut layout = GlyphLayout::new();
        // Target width <= 3 * space advance (15): wrapping must not run.
        layout.set_text_block(
            &font,
            "Hello World",
            0,
            11,
            white(),
            15.0,
            Align::Left,
            true,
            None,
        );
        assert_eq!(layout.runs.len(), 1);
    }

    #[test]
    fn test_wrap_rebuilds_width_from_advances() {
        let font = test_font();
        let mut layout = GlyphLayout::new();
        layout.set_text_block(
            &font,
            "Hello World",
            0,
            11,
            white(),
            50.0,
            Align::Left,
            true,
            None,
        );
        for run in &layout.runs {
            let advance_sum: f32 = run.x_advances.iter().sum();
            assert_relative_eq!(run.width, advance_sum, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_truncate_fits_target_width() {
        let font = test_font();
        let mut layout = GlyphLayout::new();
        layout.set_text_block(
            &font,
            "Hello World",
            0,
            11,
            white(),
            40.0,
            Align::Left,
            false,
            Some("d"),
        );
        assert_eq!(layout.runs.len(), 1);
        assert!(layout.width <= 40.0 + 1e-3);
        // The marker glyph ends the run.
        assert_eq!(*layout.runs[0].glyphs.last().unwrap(), 'd' as u32);
    }

    #[test]
    fn test_truncate_with_empty_marker() {
        let font = test_font();
        let mut layout = GlyphLayout::new();
        layout.set_text_block(
            &font,
            "Hello World",
            0,
            11,
            white(),
            40.0,
            Align::Left,
            false,
            Some(""),
        );
        assert!(layout.width <= 40.0 + 1e-3);
    }

    #[test]
    fn test_truncate_marker_only_when_nothing_fits() {
        let font = test_font();
        let mut layout = GlyphLayout::new();
        layout.set_text_block(
            &font,
            "Hello",
            0,
            5,
            white(),
            16.0,
            Align::Left,
            false,
            Some("d"),
        );
        assert_eq!(layout.runs.len(), 1);
        assert_eq!(*layout.runs[0].glyphs.last().unwrap(), 'd' as u32);
    }

    #[test]
    fn test_truncate_skipped_when_text_fits() {
        let font = test_font();
        let mut layout = GlyphLayout::new();
        layout.set_text_block(
            &font,
            "Hello",
            0,
            5,
            white(),
            500.0,
            Align::Left,
            false,
            Some("d"),
        );
        assert_eq!(layout.runs[0].glyphs, codes("Hello"));
    }

    #[test]
    fn test_center_alignment_shifts_half_slack() {
        let font = test_font();
        let plain = GlyphLayout::from_text(&font, "Hello");
        let mut centered = GlyphLayout::new();
        centered.set_text_block(
            &font, "Hello", 0, 5, white(), 200.0, Align::Center, false, None,
        );
        let shift = (200.0 - plain.width) * 0.5;
        assert_relative_eq!(centered.runs[0].x, plain.runs[0].x + shift);
    }

    #[test]
    fn test_right_alignment_shifts_full_slack() {
        let font = test_font();
        let plain = GlyphLayout::from_text(&font, "Hello");
        let mut right = GlyphLayout::new();
        right.set_text_block(
            &font, "Hello", 0, 5, white(), 200.0, Align::Right, false, None,
        );
        assert_relative_eq!(right.runs[0].x, plain.runs[0].x + 200.0 - plain.width);
    }

    #[test]
    fn test_alignment_is_per_line() {
        let font = test_font();
        let mut layout = GlyphLayout::new();
        layout.set_text_block(
            &font, "H\nHe", 0, 4, white(), 100.0, Align::Right, false, None,
        );
        assert_eq!(layout.runs.len(), 2);
        // The shorter first line is shifted further right.
        assert!(layout.runs[0].x > layout.runs[1].x);
    }

    #[test]
    fn test_unshapeable_run_terminates_layout() {
        let font = test_font(); // no missing glyph configured
        let layout = GlyphLayout::from_text(&font, "!!\nHe");
        // The first run shapes to zero glyphs and layout stops there.
        assert!(layout.runs.is_empty());
    }

    #[test]
    fn test_kerning_does_not_cross_lines() {
        let mut font = test_font();
        font.glyph_mut('H').unwrap().set_kerning('e' as u32, -5);
        let same_line = GlyphLayout::from_text(&font, "He");
        let split = GlyphLayout::from_text(&font, "H\ne");
        // On its own line, 'e' starts from the line origin, not a kerned pen.
        assert_relative_eq!(split.runs[1].x_advances[0], -1.0);
        assert_relative_eq!(same_line.runs[0].x_advances[1], 4.0);
    }

    #[test]
    fn test_range_layout_uses_char_indices() {
        let font = test_font();
        let mut layout = GlyphLayout::new();
        layout.set_text_block(
            &font, "Hello", 1, 3, white(), 0.0, Align::Left, false, None,
        );
        assert_eq!(layout.runs[0].glyphs, codes("el"));
    }

    #[test]
    fn test_reset() {
        let font = test_font();
        let mut layout = GlyphLayout::from_text(&font, "Hello");
        layout.reset();
        assert!(layout.runs.is_empty());
        assert_relative_eq!(layout.width, 0.0);
    }
}
