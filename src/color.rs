//! Hex color parsing and percentage darkening for layer tints.

use palette::Srgb;

/// An 8-bit sRGB color, as used for layer tints.
pub type Rgb = Srgb<u8>;

/// Opaque white, used for the inner outline ring and the print background.
pub const WHITE: Rgb = Srgb::new(255, 255, 255);

/// Opaque black, used for the outer outline ring.
pub const BLACK: Rgb = Srgb::new(0, 0, 0);

// ============================================================================
// Hex Conversion
// ============================================================================

/// Parses a `#rgb` / `#rrggbb` color (the leading `#` is optional).
///
/// Parsing is lenient and never fails: each channel is read from the longest
/// run of hex digits at the start of its two-character slot, and a slot that
/// is missing or starts with a non-hex character reads as 0. A 3-digit input
/// is expanded by doubling every digit first.
pub fn hex_to_rgb(hex: &str) -> Rgb {
    let digits: Vec<char> = hex.replacen('#', "", 1).chars().collect();
    let digits = if digits.len() == 3 {
        digits.iter().flat_map(|&c| [c, c]).collect()
    } else {
        digits
    };

    let channel = |slot: usize| {
        let start = slot * 2;
        let end = (start + 2).min(digits.len());
        digits.get(start..end).map(parse_channel).unwrap_or(0)
    };

    Srgb::new(channel(0), channel(1), channel(2))
}

fn parse_channel(slot: &[char]) -> u8 {
    slot.iter()
        .map_while(|c| c.to_digit(16))
        .fold(0u32, |acc, d| acc * 16 + d) as u8
}

/// Formats a color as lowercase `#rrggbb`.
pub fn rgb_to_hex(color: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

// ============================================================================
// Darkening
// ============================================================================

/// Multiplies every channel by `1 - fraction`, rounding half away from zero
/// and clamping to `0..=255`.
///
/// `fraction` is meant to lie in `0.0..=1.0`; other values are passed through
/// the same formula unchanged.
pub fn darken_rgb(color: Rgb, fraction: f32) -> Rgb {
    let factor = 1.0 - fraction;
    let scale = |c: u8| (c as f32 * factor).round().clamp(0.0, 255.0) as u8;
    Srgb::new(scale(color.red), scale(color.green), scale(color.blue))
}

/// Hex-string form of [`darken_rgb`].
pub fn darken(hex: &str, fraction: f32) -> String {
    rgb_to_hex(darken_rgb(hex_to_rgb(hex), fraction))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_six_digit_hex() {
        assert_eq!(hex_to_rgb("#3366cc"), Srgb::new(0x33, 0x66, 0xcc));
        assert_eq!(hex_to_rgb("3366CC"), Srgb::new(0x33, 0x66, 0xcc));
    }

    #[test]
    fn expands_three_digit_hex() {
        assert_eq!(hex_to_rgb("#fa0"), Srgb::new(0xff, 0xaa, 0x00));
    }

    #[test]
    fn malformed_input_degrades_to_zero_channels() {
        assert_eq!(hex_to_rgb(""), Srgb::new(0, 0, 0));
        assert_eq!(hex_to_rgb("#ff"), Srgb::new(0xff, 0, 0));
        assert_eq!(hex_to_rgb("#zz8000"), Srgb::new(0, 0x80, 0));
        // A bad second digit keeps the first, like a prefix parse would.
        assert_eq!(hex_to_rgb("#1z0000"), Srgb::new(1, 0, 0));
    }

    #[test]
    fn formats_lowercase_hex() {
        assert_eq!(rgb_to_hex(Srgb::new(255, 8, 171)), "#ff08ab");
    }

    #[test]
    fn darken_half_rounds_up() {
        assert_eq!(darken("#ffffff", 0.5), "#808080");
    }

    #[test]
    fn darken_small_fraction() {
        // 255 * 0.93 = 237.15
        assert_eq!(darken("#ff0000", 0.07), "#ed0000");
        assert_eq!(darken("#000000", 0.07), "#000000");
    }

    #[test]
    fn darken_zero_is_identity() {
        let color = Srgb::new(12, 200, 99);
        assert_eq!(darken_rgb(color, 0.0), color);
    }
}
