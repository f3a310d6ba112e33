//! Glyph metric records and sparse kerning tables
//!
//! A [`Glyph`] describes one character on one atlas page: where its pixels
//! live in the page, how to place the quad relative to the pen position, and
//! how far to advance afterwards. Kerning is stored per glyph as a sparse
//! two-level table keyed by the following character's code, so fonts with a
//! handful of kerning pairs never allocate a 65536-entry array.

/// Log2 of the leaf size of the two-level character tables.
pub const LOG2_PAGE_SIZE: usize = 9;
/// Leaf size of the two-level character tables (512 entries).
pub const PAGE_SIZE: usize = 1 << LOG2_PAGE_SIZE;
/// Number of top-level slots covering the supported character range.
pub const PAGES: usize = 0x10000 / PAGE_SIZE;
/// Highest character code a font description may define a glyph for.
pub const MAX_CHAR: u32 = 0xFFFF;

/// Metrics and atlas coordinates for one character on one atlas page.
///
/// Created when a font description is parsed. UV coordinates start at zero
/// and are filled in once the page textures are known (see
/// [`BitmapFont::resolve_page_regions`](crate::BitmapFont::resolve_page_regions)).
#[derive(Debug, Clone, Default)]
pub struct Glyph {
    /// Character code this glyph renders.
    pub id: u32,
    /// X of the glyph's pixel rect in the atlas page.
    pub src_x: i32,
    /// Y of the glyph's pixel rect in the atlas page.
    pub src_y: i32,
    /// Pixel width of the glyph rect.
    pub width: i32,
    /// Pixel height of the glyph rect.
    pub height: i32,
    /// Left UV coordinate in the page texture.
    pub u: f32,
    /// Bottom UV coordinate in the page texture.
    pub v: f32,
    /// Right UV coordinate in the page texture.
    pub u2: f32,
    /// Top UV coordinate in the page texture.
    pub v2: f32,
    /// Horizontal draw offset from the pen position, in unscaled pixels.
    pub xoffset: i32,
    /// Vertical draw offset from the baseline, in unscaled pixels.
    pub yoffset: i32,
    /// Horizontal pen advance after this glyph, in unscaled pixels.
    pub xadvance: i32,
    /// Index of the atlas page holding this glyph's pixels.
    pub page: usize,
    /// Set by fixed-width normalization; disables first-glyph offset
    /// compensation and kerning.
    pub fixed_width: bool,
    /// Sparse kerning amounts keyed by the following character. `None` for
    /// glyphs without kerning pairs.
    pub kerning: Option<Box<KerningTable>>,
}

impl Glyph {
    /// Kerning adjustment applied when `ch` follows this glyph. Zero when no
    /// pair is defined.
    pub fn kerning(&self, ch: char) -> i32 {
        let code = ch as usize;
        if code > MAX_CHAR as usize {
            return 0;
        }
        match &self.kerning {
            Some(table) => table.get(code),
            None => 0,
        }
    }

    /// Records a kerning pair for the character `ch` following this glyph,
    /// allocating table pages lazily.
    pub fn set_kerning(&mut self, ch: u32, amount: i16) {
        if ch > MAX_CHAR {
            return;
        }
        self.kerning
            .get_or_insert_with(Default::default)
            .set(ch as usize, amount);
    }
}

/// Two-level sparse table of kerning amounts, indexed by character code.
#[derive(Debug, Clone, Default)]
pub struct KerningTable {
    pages: Vec<Option<Box<[i16; PAGE_SIZE]>>>,
}

impl KerningTable {
    fn get(&self, code: usize) -> i32 {
        match self.pages.get(code >> LOG2_PAGE_SIZE) {
            Some(Some(page)) => i32::from(page[code & (PAGE_SIZE - 1)]),
            _ => 0,
        }
    }

    fn set(&mut self, code: usize, amount: i16) {
        if self.pages.is_empty() {
            self.pages.resize_with(PAGES, || None);
        }
        let page = self.pages[code >> LOG2_PAGE_SIZE]
            .get_or_insert_with(|| Box::new([0; PAGE_SIZE]));
        page[code & (PAGE_SIZE - 1)] = amount;
    }
}
