//! Color representation and packed vertex color encoding
//!
//! Cached glyph geometry stores one color per vertex as a single `f32`
//! (RGBA8 packed into the float's bit pattern). The packing masks the top
//! alpha bit so the resulting bits never form a NaN, which GPUs and float
//! comparisons would otherwise mangle.

use nalgebra::Vector4;

/// RGBA color with components in `0.0..=1.0` (x=r, y=g, z=b, w=a).
pub type Color = Vector4<f32>;

/// Opaque white, the default text color.
pub fn white() -> Color {
    Color::new(1.0, 1.0, 1.0, 1.0)
}

/// Packs a color into the single-float vertex format.
pub fn to_float_bits(color: &Color) -> f32 {
    rgba_to_float_bits(color.x, color.y, color.z, color.w)
}

/// Packs RGBA components into the single-float vertex format.
pub fn rgba_to_float_bits(r: f32, g: f32, b: f32, a: f32) -> f32 {
    let bits = ((a * 255.0) as u32) << 24
        | ((b * 255.0) as u32) << 16
        | ((g * 255.0) as u32) << 8
        | (r * 255.0) as u32;
    int_to_float_color(bits)
}

/// Reinterprets packed ABGR bits as a vertex color float. The two high alpha
/// bits are masked off to avoid NaN bit patterns, so alpha loses a little
/// precision (255 becomes 254).
pub fn int_to_float_color(bits: u32) -> f32 {
    f32::from_bits(bits & 0xfeff_ffff)
}

/// Recovers packed ABGR bits from a vertex color float, compensating for the
/// alpha precision lost by [`int_to_float_color`].
pub fn float_to_int_color(value: f32) -> u32 {
    let bits = value.to_bits();
    let alpha = ((bits >> 24) as f32 * (255.0 / 254.0)) as u32;
    (bits & 0x00ff_ffff) | (alpha << 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_roundtrip_preserves_rgb() {
        let packed = rgba_to_float_bits(1.0, 0.5, 0.25, 1.0);
        let bits = float_to_int_color(packed);
        assert_eq!(bits & 0xff, 255); // r
        assert_eq!((bits >> 8) & 0xff, 127); // g
        assert_eq!((bits >> 16) & 0xff, 63); // b
        assert_eq!((bits >> 24) & 0xff, 255); // alpha restored
    }

    #[test]
    fn test_packed_float_is_not_nan() {
        let packed = rgba_to_float_bits(1.0, 1.0, 1.0, 1.0);
        assert!(!packed.is_nan());
    }

    #[test]
    fn test_alpha_mask_is_stable() {
        // Re-packing an already-masked value must not drift.
        let packed = rgba_to_float_bits(0.2, 0.4, 0.6, 0.8);
        let repacked = int_to_float_color(float_to_int_color(packed));
        assert_eq!(packed.to_bits(), repacked.to_bits());
    }
}
