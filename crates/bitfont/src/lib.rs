//! # bitfont
//!
//! Bitmap font text shaping, line layout, and cached glyph geometry.
//!
//! ## Features
//!
//! - **Description parsing**: line-oriented font descriptions with glyph
//!   metrics, kerning pairs, and derived vertical metrics
//! - **Shaping**: character runs to glyph codes plus kerned pen advances
//! - **Line layout**: newline-delimited runs with wrapping, truncation
//!   markers, and horizontal alignment
//! - **Glyph caching**: per-atlas-page vertex buffers with tinting,
//!   recoloring, and partial draws, ready for any renderer via [`Batch`]
//!
//! The crate does no rendering and no file or texture I/O: descriptions
//! come in as text, page textures are referenced through opaque handles,
//! and geometry leaves as flat vertex data.
//!
//! ## Quick Start
//!
//! ```rust
//! use bitfont::{BitmapFont, GlyphLayout};
//!
//! fn main() -> bitfont::FontResult<()> {
//!     let description = "\
//! info face=\"example\" size=16 padding=0,0,0,0 spacing=1,1
//! common lineHeight=20 base=16 scaleW=64 scaleH=64 pages=1 packed=0
//! page id=0 file=\"example_0.png\"
//! chars count=2
//! char id=72 x=0 y=0 width=8 height=12 xoffset=1 yoffset=2 xadvance=9 page=0 chnl=15
//! char id=105 x=8 y=0 width=2 height=12 xoffset=1 yoffset=2 xadvance=4 page=0 chnl=15
//! ";
//!     let font = BitmapFont::from_description(description, false)?;
//!     let layout = GlyphLayout::from_text(&font, "Hi");
//!     assert!(layout.width > 0.0);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod cache;
pub mod color;
pub mod font;
pub mod glyph;
pub mod layout;

pub use batch::{Batch, TextureHandle, TextureRegion};
pub use cache::BitmapFontCache;
pub use color::{
    float_to_int_color, int_to_float_color, rgba_to_float_bits, to_float_bits, white, Color,
};
pub use font::{BitmapFont, FontError, FontPage, FontResult, MISSING_GLYPH_CODE};
pub use glyph::Glyph;
pub use layout::{Align, GlyphLayout, GlyphRun};

#[cfg(test)]
pub(crate) mod test_util;
