//! Cached glyph quad geometry
//!
//! A [`BitmapFontCache`] converts layouts into per-page vertex buffers once,
//! so static text costs nothing to draw each frame. Each glyph becomes one
//! quad of four vertices, five floats each (x, y, packed color, u, v), in
//! bottom-left, top-left, top-right, bottom-right order. Buffers are grouped
//! by atlas page; a multi-page cache additionally records which cached glyph
//! each page quad belongs to, so ranged recoloring and ranged drawing work
//! across pages.
//!
//! The cache never borrows the font: every operation that needs metrics or
//! page data takes `&BitmapFont`, which keeps caches storable in components
//! and containers without lifetime plumbing.

use crate::batch::Batch;
use crate::color::{float_to_int_color, int_to_float_color, to_float_bits, white, Color};
use crate::font::BitmapFont;
use crate::layout::{Align, GlyphLayout};

const FLOATS_PER_GLYPH: usize = 20;

/// Per-page vertex buffers for one or more cached layouts.
#[derive(Debug)]
pub struct BitmapFontCache {
    layouts: Vec<GlyphLayout>,
    /// Color applied to text added after this point; text already in the
    /// cache is unaffected (use [`tint`](Self::tint) or the `set_colors`
    /// family for that).
    pub color: Color,
    glyph_count: usize,
    x: f32,
    y: f32,
    current_tint: f32,
    integer: bool,
    page_vertices: Vec<Vec<f32>>,
    /// Floats in use per page; the buffers may be larger.
    idx: Vec<usize>,
    /// For each page, the cache-wide glyph index of every quad in that
    /// page's buffer. Only kept for multi-page fonts.
    page_glyph_indices: Option<Vec<Vec<usize>>>,
    temp_glyph_count: Vec<usize>,
}

impl BitmapFontCache {
    /// Creates an empty cache sized for the font's atlas pages.
    ///
    /// # Panics
    ///
    /// Panics if the font declares no pages.
    pub fn new(font: &BitmapFont) -> Self {
        let page_count = font.pages.len();
        assert!(page_count > 0, "font must have at least one texture page");
        Self {
            layouts: Vec::new(),
            color: white(),
            glyph_count: 0,
            x: 0.0,
            y: 0.0,
            current_tint: 0.0,
            integer: font.integer,
            page_vertices: (0..page_count).map(|_| Vec::new()).collect(),
            idx: vec![0; page_count],
            page_glyph_indices: (page_count > 1)
                .then(|| (0..page_count).map(|_| Vec::new()).collect()),
            temp_glyph_count: vec![0; page_count],
        }
    }

    /// X position of the cached text relative to where it was cached.
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Y position of the cached text relative to where it was cached.
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Moves the cached text to an absolute offset from its cached position.
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.translate(x - self.x, y - self.y);
    }

    /// Moves the cached text relative to its current position by adjusting
    /// every cached vertex.
    pub fn translate(&mut self, mut x_amount: f32, mut y_amount: f32) {
        if x_amount == 0.0 && y_amount == 0.0 {
            return;
        }
        if self.integer {
            x_amount = x_amount.round();
            y_amount = y_amount.round();
        }
        self.x += x_amount;
        self.y += y_amount;
        for (vertices, &used) in self.page_vertices.iter_mut().zip(&self.idx) {
            for vertex in vertices[..used].chunks_exact_mut(5) {
                vertex[0] += x_amount;
                vertex[1] += y_amount;
            }
        }
    }

    /// Multiplies the color of all cached text by `tint`. Does not affect
    /// subsequently added text. Each run keeps its own base color; tinting
    /// twice with the same value is a no-op.
    pub fn tint(&mut self, font: &BitmapFont, tint: &Color) {
        let new_tint = to_float_bits(tint);
        if self.current_tint.to_bits() == new_tint.to_bits() {
            return;
        }
        self.current_tint = new_tint;
        self.temp_glyph_count.fill(0);
        for layout in &self.layouts {
            for run in &layout.runs {
                let color_float = to_float_bits(&Color::new(
                    run.color.x * tint.x,
                    run.color.y * tint.y,
                    run.color.z * tint.z,
                    run.color.w * tint.w,
                ));
                for &code in &run.glyphs {
                    let Some(glyph) = font.resolve(code) else {
                        continue;
                    };
                    let page = glyph.page;
                    let offset = self.temp_glyph_count[page] * FLOATS_PER_GLYPH + 2;
                    self.temp_glyph_count[page] += 1;
                    let vertices = &mut self.page_vertices[page];
                    for v in 0..4 {
                        vertices[offset + v * 5] = color_float;
                    }
                }
            }
        }
    }

    /// Replaces the alpha of all cached text. Does not affect subsequently
    /// added text.
    pub fn set_alphas(&mut self, alpha: f32) {
        let alpha_bits = ((254.0 * alpha) as u32) << 24;
        let mut prev = 0.0f32;
        let mut new_color = 0.0f32;
        for (vertices, &used) in self.page_vertices.iter_mut().zip(&self.idx) {
            for (i, vertex) in vertices[..used].chunks_exact_mut(5).enumerate() {
                let c = vertex[2];
                // Packed colors repeat heavily, so reuse the last conversion.
                if c.to_bits() == prev.to_bits() && i != 0 {
                    vertex[2] = new_color;
                } else {
                    prev = c;
                    let rgba = float_to_int_color(c) & 0x00ff_ffff | alpha_bits;
                    new_color = int_to_float_color(rgba);
                    vertex[2] = new_color;
                }
            }
        }
    }

    /// Replaces the color of all cached text with an already packed vertex
    /// color. Does not affect subsequently added text.
    pub fn set_colors_float(&mut self, color: f32) {
        for (vertices, &used) in self.page_vertices.iter_mut().zip(&self.idx) {
            for vertex in vertices[..used].chunks_exact_mut(5) {
                vertex[2] = color;
            }
        }
    }

    /// Replaces the color of all cached text. Does not affect subsequently
    /// added text.
    pub fn set_colors(&mut self, color: &Color) {
        self.set_colors_float(to_float_bits(color));
    }

    /// Replaces the color of all cached text from RGBA components. Does not
    /// affect subsequently added text.
    pub fn set_colors_rgba(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.set_colors_float(crate::color::rgba_to_float_bits(r, g, b, a));
    }

    /// Replaces the color of the cached glyphs in `start..end` (indices over
    /// all glyphs in cache order). Out-of-range bounds are clamped. The
    /// indices reset every time text is set.
    pub fn set_colors_range(&mut self, color: &Color, start: usize, end: usize) {
        let color = to_float_bits(color);
        match &self.page_glyph_indices {
            None => {
                // One page: glyph index maps straight to the buffer.
                let used = self.idx[0];
                let from = (start * FLOATS_PER_GLYPH).min(used);
                let to = (end * FLOATS_PER_GLYPH).clamp(from, used);
                for vertex in self.page_vertices[0][from..to].chunks_exact_mut(5) {
                    vertex[2] = color;
                }
            }
            Some(page_glyph_indices) => {
                for (page, glyph_indices) in page_glyph_indices.iter().enumerate() {
                    let vertices = &mut self.page_vertices[page];
                    for (j, &glyph_index) in glyph_indices.iter().enumerate() {
                        // Indices are in cache order per page.
                        if glyph_index >= end {
                            break;
                        }
                        if glyph_index >= start {
                            let offset = j * FLOATS_PER_GLYPH + 2;
                            for v in 0..4 {
                                vertices[offset + v * 5] = color;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Draws all cached glyphs, one batch call per page that has any.
    pub fn draw(&self, font: &BitmapFont, batch: &mut dyn Batch) {
        for (page, (vertices, &used)) in self.page_vertices.iter().zip(&self.idx).enumerate() {
            if used > 0 {
                batch.draw(font.pages[page].region.texture, vertices, 0, used);
            }
        }
    }

    /// Draws the cached glyphs in `start..end` (indices over all glyphs in
    /// cache order). Out-of-range bounds are clamped.
    pub fn draw_range(&self, font: &BitmapFont, batch: &mut dyn Batch, start: usize, end: usize) {
        match &self.page_glyph_indices {
            None => {
                let used = self.idx[0];
                let offset = (start * FLOATS_PER_GLYPH).min(used);
                let count = (end * FLOATS_PER_GLYPH).min(used).saturating_sub(offset);
                if count > 0 {
                    batch.draw(
                        font.pages[0].region.texture,
                        &self.page_vertices[0],
                        offset,
                        count,
                    );
                }
            }
            Some(page_glyph_indices) => {
                // Per page, find the contiguous quad span inside the bounds.
                for (page, glyph_indices) in page_glyph_indices.iter().enumerate() {
                    let mut offset = None;
                    let mut count = 0;
                    for (ii, &glyph_index) in glyph_indices.iter().enumerate() {
                        if glyph_index >= end {
                            break;
                        }
                        if glyph_index >= start {
                            offset.get_or_insert(ii);
                            count += 1;
                        }
                    }
                    if let Some(offset) = offset.filter(|_| count > 0) {
                        batch.draw(
                            font.pages[page].region.texture,
                            &self.page_vertices[page],
                            offset * FLOATS_PER_GLYPH,
                            count * FLOATS_PER_GLYPH,
                        );
                    }
                }
            }
        }
    }

    /// Draws all cached glyphs with their alpha scaled by
    /// `alpha_modulation`, restoring the cached colors afterwards.
    pub fn draw_alpha(&mut self, font: &BitmapFont, batch: &mut dyn Batch, alpha_modulation: f32) {
        if alpha_modulation == 1.0 {
            self.draw(font, batch);
            return;
        }
        let old = self.color;
        let mut modulated = old;
        modulated.w *= alpha_modulation;
        self.set_colors(&modulated);
        self.draw(font, batch);
        self.set_colors(&old);
    }

    /// Removes all cached glyphs.
    pub fn clear(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
        self.glyph_count = 0;
        self.layouts.clear();
        self.idx.fill(0);
        if let Some(page_glyph_indices) = &mut self.page_glyph_indices {
            for indices in page_glyph_indices {
                indices.clear();
            }
        }
    }

    /// Clears the cache and caches `text` at the given position. `y` is the
    /// top of most capital letters; the baseline lands at `y + ascent`.
    pub fn set_text(&mut self, font: &BitmapFont, text: &str, x: f32, y: f32) -> &GlyphLayout {
        self.clear();
        self.add_text(font, text, x, y)
    }

    /// Clears the cache and caches `text` wrapped and aligned against
    /// `target_width`.
    pub fn set_text_block(
        &mut self,
        font: &BitmapFont,
        text: &str,
        x: f32,
        y: f32,
        start: usize,
        end: usize,
        target_width: f32,
        halign: Align,
        wrap: bool,
        truncate: Option<&str>,
    ) -> &GlyphLayout {
        self.clear();
        self.add_text_block(
            font,
            text,
            x,
            y,
            start,
            end,
            target_width,
            halign,
            wrap,
            truncate,
        )
    }

    /// Clears the cache and caches an existing layout.
    pub fn set_layout(&mut self, font: &BitmapFont, layout: GlyphLayout, x: f32, y: f32) {
        self.clear();
        self.add_layout(font, layout, x, y);
    }

    /// Caches `text` after any text already in the cache.
    pub fn add_text(&mut self, font: &BitmapFont, text: &str, x: f32, y: f32) -> &GlyphLayout {
        let end = text.chars().count();
        self.add_text_block(font, text, x, y, 0, end, 0.0, Align::Left, false, None)
    }

    /// Caches `text[start..end]` (char indices) after any text already in
    /// the cache, wrapped and aligned against `target_width`.
    pub fn add_text_block(
        &mut self,
        font: &BitmapFont,
        text: &str,
        x: f32,
        y: f32,
        start: usize,
        end: usize,
        target_width: f32,
        halign: Align,
        wrap: bool,
        truncate: Option<&str>,
    ) -> &GlyphLayout {
        let mut layout = GlyphLayout::new();
        layout.set_text_block(
            font,
            text,
            start,
            end,
            self.color,
            target_width,
            halign,
            wrap,
            truncate,
        );
        self.add_layout(font, layout, x, y);
        &self.layouts[self.layouts.len() - 1]
    }

    /// Caches an existing layout after any text already in the cache.
    pub fn add_layout(&mut self, font: &BitmapFont, layout: GlyphLayout, x: f32, y: f32) {
        self.add_to_cache(font, layout, x, y + font.ascent);
    }

    /// Sets whether cached quads are snapped to integer positions, which
    /// keeps texture filtering from blurring pixel fonts. Defaults to the
    /// font's setting.
    pub fn use_integer_positions(&mut self, integer: bool) {
        self.integer = integer;
    }

    /// Whether cached quads are snapped to integer positions.
    pub fn uses_integer_positions(&self) -> bool {
        self.integer
    }

    /// The layouts cached since the last clear.
    pub fn layouts(&self) -> &[GlyphLayout] {
        &self.layouts
    }

    /// Vertex buffer for one page. Only the first
    /// [`vertex_count`](Self::vertex_count) floats are meaningful.
    pub fn vertices(&self, page: usize) -> &[f32] {
        &self.page_vertices[page]
    }

    /// Floats in use for one page.
    pub fn vertex_count(&self, page: usize) -> usize {
        self.idx[page]
    }

    /// The in-use vertex data of one page as raw bytes, for uploading to a
    /// GPU buffer.
    pub fn vertices_bytes(&self, page: usize) -> &[u8] {
        bytemuck::cast_slice(&self.page_vertices[page][..self.idx[page]])
    }

    fn add_to_cache(&mut self, font: &BitmapFont, layout: GlyphLayout, x: f32, y: f32) {
        self.ensure_pages(font);
        self.require_glyphs(font, &layout);
        for run in &layout.runs {
            let color = to_float_bits(&run.color);
            let mut gx = x + run.x;
            let gy = y + run.y;
            for (ii, &code) in run.glyphs.iter().enumerate() {
                gx += run.x_advances[ii];
                let Some(glyph) = font.resolve(code) else {
                    continue;
                };
                self.add_glyph(font, glyph, gx, gy, color);
            }
        }
        self.layouts.push(layout);
        // Cached glyphs changed, reset the current tint.
        self.current_tint = to_float_bits(&white());
    }

    fn add_glyph(&mut self, font: &BitmapFont, glyph: &crate::glyph::Glyph, x: f32, y: f32, color: f32) {
        let mut x = x + glyph.xoffset as f32 * font.scale_x();
        let mut y = y + glyph.yoffset as f32 * font.scale_y();
        let mut width = glyph.width as f32 * font.scale_x();
        let mut height = glyph.height as f32 * font.scale_y();
        if self.integer {
            x = x.round();
            y = y.round();
            width = width.round();
            height = height.round();
        }
        let x2 = x + width;
        let y2 = y + height;
        let page = glyph.page;
        let idx = self.idx[page];
        self.idx[page] += FLOATS_PER_GLYPH;
        if let Some(page_glyph_indices) = &mut self.page_glyph_indices {
            page_glyph_indices[page].push(self.glyph_count);
        }
        self.glyph_count += 1;
        let v = &mut self.page_vertices[page][idx..idx + FLOATS_PER_GLYPH];
        v.copy_from_slice(&[
            x, y, color, glyph.u, glyph.v, // bottom left
            x, y2, color, glyph.u, glyph.v2, // top left
            x2, y2, color, glyph.u2, glyph.v2, // top right
            x2, y, color, glyph.u2, glyph.v, // bottom right
        ]);
    }

    /// Grows the per-page bookkeeping if the font gained pages since this
    /// cache was created.
    fn ensure_pages(&mut self, font: &BitmapFont) {
        let page_count = font.pages.len();
        if self.page_vertices.len() >= page_count {
            return;
        }
        self.page_vertices.resize_with(page_count, Vec::new);
        self.idx.resize(page_count, 0);
        self.temp_glyph_count.resize(page_count, 0);
        if page_count > 1 {
            let indices = self.page_glyph_indices.get_or_insert_with(Vec::new);
            indices.resize_with(page_count, Vec::new);
        }
    }

    /// Grows the vertex buffers to hold a layout's glyphs.
    fn require_glyphs(&mut self, font: &BitmapFont, layout: &GlyphLayout) {
        if self.page_vertices.len() == 1 {
            let new_glyphs: usize = layout.runs.iter().map(|run| run.glyphs.len()).sum();
            self.require_page_glyphs(0, new_glyphs);
        } else {
            self.temp_glyph_count.fill(0);
            for run in &layout.runs {
                for &code in &run.glyphs {
                    if let Some(glyph) = font.resolve(code) {
                        self.temp_glyph_count[glyph.page] += 1;
                    }
                }
            }
            for page in 0..self.temp_glyph_count.len() {
                self.require_page_glyphs(page, self.temp_glyph_count[page]);
            }
        }
    }

    fn require_page_glyphs(&mut self, page: usize, glyph_count: usize) {
        let vertex_count = self.idx[page] + glyph_count * FLOATS_PER_GLYPH;
        if self.page_vertices[page].len() < vertex_count {
            self.page_vertices[page].resize(vertex_count, 0.0);
        }
    }
}
