//! Shared font fixtures for unit tests.
//!
//! The single-page fixture uses uniform 8x12 glyphs with `xoffset=1` and
//! `xadvance=9`, so expected advances and widths stay easy to compute by
//! hand: a first advance of -1, 9 per following glyph, and a trailing
//! visible width of 9. The space advance is 5 and there is no padding.

use crate::font::BitmapFont;

pub(crate) const TEST_DESCRIPTION: &str = "\
info face=\"fixture\" size=16 bold=0 italic=0 charset=\"\" unicode=1 stretchH=100 smooth=1 aa=1 padding=0,0,0,0 spacing=1,1 outline=0
common lineHeight=20 base=16 scaleW=64 scaleH=64 pages=1 packed=0
page id=0 file=\"fixture_0.png\"
chars count=8
char id=32 x=0 y=0 width=0 height=0 xoffset=0 yoffset=0 xadvance=5 page=0 chnl=15
char id=72 x=0 y=0 width=8 height=12 xoffset=1 yoffset=2 xadvance=9 page=0 chnl=15
char id=101 x=8 y=0 width=8 height=12 xoffset=1 yoffset=2 xadvance=9 page=0 chnl=15
char id=108 x=16 y=0 width=8 height=12 xoffset=1 yoffset=2 xadvance=9 page=0 chnl=15
char id=111 x=24 y=0 width=8 height=12 xoffset=1 yoffset=2 xadvance=9 page=0 chnl=15
char id=87 x=32 y=0 width=8 height=12 xoffset=1 yoffset=2 xadvance=9 page=0 chnl=15
char id=114 x=40 y=0 width=8 height=12 xoffset=1 yoffset=2 xadvance=9 page=0 chnl=15
char id=100 x=48 y=0 width=8 height=12 xoffset=1 yoffset=2 xadvance=9 page=0 chnl=15
";

/// Two pages: 'A' lives on page 0, 'B' on page 1.
pub(crate) const TEST_DESCRIPTION_TWO_PAGES: &str = "\
info face=\"fixture2\" size=16 padding=0,0,0,0 spacing=1,1
common lineHeight=20 base=16 scaleW=64 scaleH=64 pages=2 packed=0
page id=0 file=\"fixture2_0.png\"
page id=1 file=\"fixture2_1.png\"
chars count=3
char id=32 x=0 y=0 width=0 height=0 xoffset=0 yoffset=0 xadvance=5 page=0 chnl=15
char id=65 x=0 y=0 width=8 height=12 xoffset=0 yoffset=2 xadvance=10 page=0 chnl=15
char id=66 x=8 y=0 width=8 height=12 xoffset=0 yoffset=2 xadvance=10 page=1 chnl=15
";

pub(crate) fn test_font() -> BitmapFont {
    BitmapFont::from_description(TEST_DESCRIPTION, false).unwrap()
}

pub(crate) fn two_page_font() -> BitmapFont {
    BitmapFont::from_description(TEST_DESCRIPTION_TWO_PAGES, false).unwrap()
}
