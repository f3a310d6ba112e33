//! Renderer boundary types
//!
//! The cache produces flat vertex arrays; drawing them is someone else's
//! job. A renderer implements [`Batch`] and receives one call per non-empty
//! atlas page with the page texture, the packed vertex data, and the float
//! range to draw.

/// Handle to a GPU texture owned by the renderer.
///
/// The font layer never creates or destroys textures; it only carries the
/// handle from atlas-page resolution through to [`Batch::draw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

impl TextureHandle {
    /// Creates a handle wrapping a renderer-assigned id.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Placeholder handle for pages whose texture has not been resolved yet.
    pub const fn invalid() -> Self {
        Self(u32::MAX)
    }

    /// Returns true unless this is the [`invalid`](Self::invalid) placeholder.
    pub fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }

    /// The renderer-assigned id.
    pub fn id(self) -> u32 {
        self.0
    }
}

impl Default for TextureHandle {
    fn default() -> Self {
        Self::invalid()
    }
}

/// A rectangular region of a page texture, with the pixel size needed to
/// convert glyph source rects into UV coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextureRegion {
    /// Texture holding the region.
    pub texture: TextureHandle,
    /// Full texture width in pixels.
    pub texture_width: u32,
    /// Full texture height in pixels.
    pub texture_height: u32,
    /// Left UV of the region within the texture.
    pub u: f32,
    /// Top UV of the region within the texture.
    pub v: f32,
    /// Right UV of the region within the texture.
    pub u2: f32,
    /// Bottom UV of the region within the texture.
    pub v2: f32,
}

impl TextureRegion {
    /// A region covering an entire texture.
    pub fn new(texture: TextureHandle, width: u32, height: u32) -> Self {
        Self {
            texture,
            texture_width: width,
            texture_height: height,
            u: 0.0,
            v: 0.0,
            u2: 1.0,
            v2: 1.0,
        }
    }
}

/// Consumer of packed glyph quad geometry.
///
/// `vertices` is interleaved as 5 floats per vertex (x, y, packed color, u,
/// v) and 4 vertices per glyph quad; `offset` and `count` are in floats and
/// always multiples of 20.
pub trait Batch {
    /// Draws `count` floats of `vertices` starting at `offset`, textured
    /// with `texture`.
    fn draw(&mut self, texture: TextureHandle, vertices: &[f32], offset: usize, count: usize);
}
