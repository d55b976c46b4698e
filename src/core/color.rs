use nalgebra::Vector3;

/// Clamps a linear color to [0, 1] and quantizes it to 8 bits per channel.
#[inline]
pub fn to_rgb8(color: Vector3<f32>) -> [u8; 3] {
    let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    [q(color.x), q(color.y), q(color.z)]
}

/// Packs a color as 0RGB, the layout `minifb` expects.
#[inline]
pub fn pack_argb(color: Vector3<f32>) -> u32 {
    let [r, g, b] = to_rgb8(color);
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_channels_are_clamped() {
        assert_eq!(to_rgb8(Vector3::new(1.7, -0.2, 0.5)), [255, 0, 128]);
    }

    #[test]
    fn packing_orders_channels_red_high() {
        assert_eq!(pack_argb(Vector3::new(0.0, 1.0, 0.0)), 0x0000_FF00);
        assert_eq!(pack_argb(Vector3::new(1.0, 1.0, 1.0)), 0x00FF_FFFF);
    }
}
