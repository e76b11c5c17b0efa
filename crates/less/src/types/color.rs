//! RGBA color type with parsing and manipulation.
//!
//! Channels are kept as `f64` so that color arithmetic (`#111 * 3`) can
//! overshoot during an operation; values are clamped when printed.
//!
//! ## Supported Color Formats
//!
//! - **Hex**: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`
//! - **Named**: CSS color names like `red`, `aliceblue`, `rebeccapurple`
//! - **Functions**: `rgb()`, `hsl()` and friends are built-in functions
//!   (see [`crate::eval::functions`]) that produce a [`Color`].
//!
//! A color read from source keeps its original spelling in [`Color::raw`]
//! until something modifies it, so `#fff` is emitted as `#fff`.

use phf::phf_map;

/// An RGBA color.
///
/// # Examples
///
/// ```
/// use less::types::Color;
///
/// let red = Color::parse("#f00").unwrap();
/// assert_eq!(red.rgb, [255.0, 0.0, 0.0]);
/// assert_eq!(red.to_css(), "#f00");
///
/// let computed = Color::rgba(255.0, 0.0, 0.0, 0.5);
/// assert_eq!(computed.to_css(), "rgba(255, 0, 0, 0.5)");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Color {
    /// Red, green and blue channels, nominally 0-255.
    pub rgb: [f64; 3],
    /// Alpha component (0.0 = transparent, 1.0 = opaque).
    pub alpha: f64,
    /// Source spelling, present only for colors read verbatim from input.
    pub raw: Option<String>,
}

impl Color {
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    pub fn rgba(r: f64, g: f64, b: f64, alpha: f64) -> Self {
        Self {
            rgb: [r, g, b],
            alpha,
            raw: None,
        }
    }

    /// Parse a hex color or a named color, remembering the source spelling.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let mut color = match input.strip_prefix('#') {
            Some(hex) => Self::from_hex(hex)?,
            None => Self::named(input)?,
        };
        color.raw = Some(input.to_string());
        Some(color)
    }

    /// Parse the digits of a hex color (without the `#`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits: Vec<u32> = hex
            .chars()
            .map(|c| c.to_digit(16))
            .collect::<Option<Vec<_>>>()?;

        let (channels, alpha) = match digits.len() {
            3 | 4 => {
                let expand = |d: u32| (d * 17) as f64;
                let channels = [expand(digits[0]), expand(digits[1]), expand(digits[2])];
                let alpha = digits.get(3).map_or(1.0, |a| expand(*a) / 255.0);
                (channels, alpha)
            }
            6 | 8 => {
                let pair = |i: usize| (digits[i] * 16 + digits[i + 1]) as f64;
                let channels = [pair(0), pair(2), pair(4)];
                let alpha = if digits.len() == 8 { pair(6) / 255.0 } else { 1.0 };
                (channels, alpha)
            }
            _ => return None,
        };
        Some(Self::rgba(channels[0], channels[1], channels[2], alpha))
    }

    /// Look up a CSS named color (case-insensitive).
    pub fn named(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower == "transparent" {
            return Some(Self::rgba(0.0, 0.0, 0.0, 0.0));
        }
        let value = NAMED_COLORS.get(lower.as_str())?;
        Some(Self::rgb(
            ((value >> 16) & 0xff) as f64,
            ((value >> 8) & 0xff) as f64,
            (value & 0xff) as f64,
        ))
    }

    /// Drop the remembered source spelling (after a modification).
    pub fn computed(mut self) -> Self {
        self.raw = None;
        self
    }

    /// Channels clamped to 0-255 and rounded.
    pub fn clamped(&self) -> [u8; 3] {
        self.rgb.map(|c| c.round().clamp(0.0, 255.0) as u8)
    }

    /// CSS text: the source spelling if untouched, `#rrggbb` when opaque,
    /// `rgba(r, g, b, a)` otherwise.
    pub fn to_css(&self) -> String {
        if let Some(raw) = &self.raw {
            return raw.clone();
        }
        let [r, g, b] = self.clamped();
        let alpha = self.alpha.clamp(0.0, 1.0);
        if alpha < 1.0 {
            format!(
                "rgba({}, {}, {}, {})",
                r,
                g,
                b,
                crate::types::dimension::format_number(alpha)
            )
        } else {
            format!("#{:02x}{:02x}{:02x}", r, g, b)
        }
    }

    /// Relative luma weighted by alpha, in `0.0..=1.0`.
    pub fn luma(&self) -> f64 {
        let [r, g, b] = self.rgb.map(|c| c.clamp(0.0, 255.0) / 255.0);
        (0.2126 * r + 0.7152 * g + 0.0722 * b) * self.alpha
    }

    /// Convert to HSL: hue in degrees, saturation and lightness in `0.0..=1.0`.
    pub fn to_hsl(&self) -> (f64, f64, f64) {
        let [r, g, b] = self.rgb.map(|c| c.clamp(0.0, 255.0) / 255.0);

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let mut h;
        let s;
        let l = (max + min) / 2.0;

        if max == min {
            h = 0.0;
            s = 0.0;
        } else {
            let d = max - min;
            s = if l > 0.5 {
                d / (2.0 - max - min)
            } else {
                d / (max + min)
            };
            h = if max == r {
                (g - b) / d + (if g < b { 6.0 } else { 0.0 })
            } else if max == g {
                (b - r) / d + 2.0
            } else {
                (r - g) / d + 4.0
            };
            h /= 6.0;
        }
        (h * 360.0, s, l)
    }

    /// Creates a color from HSL values (hue in degrees).
    pub fn from_hsl(h: f64, s: f64, l: f64, alpha: f64) -> Self {
        let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);
        let (r, g, b) = if s == 0.0 {
            (l, l, l)
        } else {
            let q = if l < 0.5 {
                l * (1.0 + s)
            } else {
                l + s - l * s
            };
            let p = 2.0 * l - q;
            (
                Self::hue_to_rgb(p, q, h + 1.0 / 3.0),
                Self::hue_to_rgb(p, q, h),
                Self::hue_to_rgb(p, q, h - 1.0 / 3.0),
            )
        };

        Self::rgba(r * 255.0, g * 255.0, b * 255.0, alpha)
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }

        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }
}

static NAMED_COLORS: phf::Map<&'static str, u32> = phf_map! {
    "aliceblue" => 0xf0f8ff,
    "antiquewhite" => 0xfaebd7,
    "aqua" => 0x00ffff,
    "aquamarine" => 0x7fffd4,
    "azure" => 0xf0ffff,
    "beige" => 0xf5f5dc,
    "bisque" => 0xffe4c4,
    "black" => 0x000000,
    "blanchedalmond" => 0xffebcd,
    "blue" => 0x0000ff,
    "blueviolet" => 0x8a2be2,
    "brown" => 0xa52a2a,
    "burlywood" => 0xdeb887,
    "cadetblue" => 0x5f9ea0,
    "chartreuse" => 0x7fff00,
    "chocolate" => 0xd2691e,
    "coral" => 0xff7f50,
    "cornflowerblue" => 0x6495ed,
    "cornsilk" => 0xfff8dc,
    "crimson" => 0xdc143c,
    "cyan" => 0x00ffff,
    "darkblue" => 0x00008b,
    "darkcyan" => 0x008b8b,
    "darkgoldenrod" => 0xb8860b,
    "darkgray" => 0xa9a9a9,
    "darkgrey" => 0xa9a9a9,
    "darkgreen" => 0x006400,
    "darkkhaki" => 0xbdb76b,
    "darkmagenta" => 0x8b008b,
    "darkolivegreen" => 0x556b2f,
    "darkorange" => 0xff8c00,
    "darkorchid" => 0x9932cc,
    "darkred" => 0x8b0000,
    "darksalmon" => 0xe9967a,
    "darkseagreen" => 0x8fbc8f,
    "darkslateblue" => 0x483d8b,
    "darkslategray" => 0x2f4f4f,
    "darkslategrey" => 0x2f4f4f,
    "darkturquoise" => 0x00ced1,
    "darkviolet" => 0x9400d3,
    "deeppink" => 0xff1493,
    "deepskyblue" => 0x00bfff,
    "dimgray" => 0x696969,
    "dimgrey" => 0x696969,
    "dodgerblue" => 0x1e90ff,
    "firebrick" => 0xb22222,
    "floralwhite" => 0xfffaf0,
    "forestgreen" => 0x228b22,
    "fuchsia" => 0xff00ff,
    "gainsboro" => 0xdcdcdc,
    "ghostwhite" => 0xf8f8ff,
    "gold" => 0xffd700,
    "goldenrod" => 0xdaa520,
    "gray" => 0x808080,
    "grey" => 0x808080,
    "green" => 0x008000,
    "greenyellow" => 0xadff2f,
    "honeydew" => 0xf0fff0,
    "hotpink" => 0xff69b4,
    "indianred" => 0xcd5c5c,
    "indigo" => 0x4b0082,
    "ivory" => 0xfffff0,
    "khaki" => 0xf0e68c,
    "lavender" => 0xe6e6fa,
    "lavenderblush" => 0xfff0f5,
    "lawngreen" => 0x7cfc00,
    "lemonchiffon" => 0xfffacd,
    "lightblue" => 0xadd8e6,
    "lightcoral" => 0xf08080,
    "lightcyan" => 0xe0ffff,
    "lightgoldenrodyellow" => 0xfafad2,
    "lightgray" => 0xd3d3d3,
    "lightgrey" => 0xd3d3d3,
    "lightgreen" => 0x90ee90,
    "lightpink" => 0xffb6c1,
    "lightsalmon" => 0xffa07a,
    "lightseagreen" => 0x20b2aa,
    "lightskyblue" => 0x87cefa,
    "lightslategray" => 0x778899,
    "lightslategrey" => 0x778899,
    "lightsteelblue" => 0xb0c4de,
    "lightyellow" => 0xffffe0,
    "lime" => 0x00ff00,
    "limegreen" => 0x32cd32,
    "linen" => 0xfaf0e6,
    "magenta" => 0xff00ff,
    "maroon" => 0x800000,
    "mediumaquamarine" => 0x66cdaa,
    "mediumblue" => 0x0000cd,
    "mediumorchid" => 0xba55d3,
    "mediumpurple" => 0x9370db,
    "mediumseagreen" => 0x3cb371,
    "mediumslateblue" => 0x7b68ee,
    "mediumspringgreen" => 0x00fa9a,
    "mediumturquoise" => 0x48d1cc,
    "mediumvioletred" => 0xc71585,
    "midnightblue" => 0x191970,
    "mintcream" => 0xf5fffa,
    "mistyrose" => 0xffe4e1,
    "moccasin" => 0xffe4b5,
    "navajowhite" => 0xffdead,
    "navy" => 0x000080,
    "oldlace" => 0xfdf5e6,
    "olive" => 0x808000,
    "olivedrab" => 0x6b8e23,
    "orange" => 0xffa500,
    "orangered" => 0xff4500,
    "orchid" => 0xda70d6,
    "palegoldenrod" => 0xeee8aa,
    "palegreen" => 0x98fb98,
    "paleturquoise" => 0xafeeee,
    "palevioletred" => 0xdb7093,
    "papayawhip" => 0xffefd5,
    "peachpuff" => 0xffdab9,
    "peru" => 0xcd853f,
    "pink" => 0xffc0cb,
    "plum" => 0xdda0dd,
    "powderblue" => 0xb0e0e6,
    "purple" => 0x800080,
    "rebeccapurple" => 0x663399,
    "red" => 0xff0000,
    "rosybrown" => 0xbc8f8f,
    "royalblue" => 0x4169e1,
    "saddlebrown" => 0x8b4513,
    "salmon" => 0xfa8072,
    "sandybrown" => 0xf4a460,
    "seagreen" => 0x2e8b57,
    "seashell" => 0xfff5ee,
    "sienna" => 0xa0522d,
    "silver" => 0xc0c0c0,
    "skyblue" => 0x87ceeb,
    "slateblue" => 0x6a5acd,
    "slategray" => 0x708090,
    "slategrey" => 0x708090,
    "snow" => 0xfffafa,
    "springgreen" => 0x00ff7f,
    "steelblue" => 0x4682b4,
    "tan" => 0xd2b48c,
    "teal" => 0x008080,
    "thistle" => 0xd8bfd8,
    "tomato" => 0xff6347,
    "turquoise" => 0x40e0d0,
    "violet" => 0xee82ee,
    "wheat" => 0xf5deb3,
    "white" => 0xffffff,
    "whitesmoke" => 0xf5f5f5,
    "yellow" => 0xffff00,
    "yellowgreen" => 0x9acd32,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_short_and_long_hex() {
        assert_eq!(Color::parse("#abc").unwrap().rgb, [170.0, 187.0, 204.0]);
        assert_eq!(Color::parse("#102030").unwrap().rgb, [16.0, 32.0, 48.0]);
        assert!(Color::parse("#12345").is_none());
        assert!(Color::parse("#xyz").is_none());
    }

    #[test]
    fn named_colors_are_case_insensitive() {
        assert_eq!(Color::named("Coral").unwrap().rgb, [255.0, 127.0, 80.0]);
        assert!(Color::named("notacolor").is_none());
    }

    #[test]
    fn computed_colors_print_as_hex() {
        let c = Color::parse("#fff").unwrap().computed();
        assert_eq!(c.to_css(), "#ffffff");
    }

    #[test]
    fn out_of_range_channels_are_clamped() {
        assert_eq!(Color::rgb(300.0, -5.0, 127.6).to_css(), "#ff0080");
    }

    #[test]
    fn hsl_round_trip() {
        let color = Color::rgb(51.0, 102.0, 153.0);
        let (h, s, l) = color.to_hsl();
        let back = Color::from_hsl(h, s, l, 1.0);
        assert_eq!(back.clamped(), [51, 102, 153]);
    }
}
