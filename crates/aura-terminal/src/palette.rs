//! Color tables for the terminal
//!
//! Everything here is an immutable constant; the engine never keeps shared
//! mutable color state.

/// An RGBA color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Fully transparent.
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// An opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }
}

/// Foreground applied to new cells and restored by SGR 0/39.
pub const DEFAULT_FOREGROUND: Rgba = Rgba::opaque(0x00, 0xFF, 0xFF);

/// Default background; transparent so the host surface shows through.
pub const DEFAULT_BACKGROUND: Rgba = Rgba::TRANSPARENT;

/// The 16 standard ANSI colors, normal then bright.
pub const ANSI_COLORS: [Rgba; 16] = [
    Rgba::opaque(0x00, 0x00, 0x00), // black
    Rgba::opaque(0xCD, 0x00, 0x00), // red
    Rgba::opaque(0x00, 0xCD, 0x00), // green
    Rgba::opaque(0xCD, 0xCD, 0x00), // yellow
    Rgba::opaque(0x00, 0x00, 0xEE), // blue
    Rgba::opaque(0xCD, 0x00, 0xCD), // magenta
    Rgba::opaque(0x00, 0xCD, 0xCD), // cyan
    Rgba::opaque(0xE5, 0xE5, 0xE5), // white
    Rgba::opaque(0x7F, 0x7F, 0x7F), // bright black
    Rgba::opaque(0xFF, 0x00, 0x00), // bright red
    Rgba::opaque(0x00, 0xFF, 0x00), // bright green
    Rgba::opaque(0xFF, 0xFF, 0x00), // bright yellow
    Rgba::opaque(0x5C, 0x5C, 0xFF), // bright blue
    Rgba::opaque(0xFF, 0x00, 0xFF), // bright magenta
    Rgba::opaque(0x00, 0xFF, 0xFF), // bright cyan
    Rgba::opaque(0xFF, 0xFF, 0xFF), // bright white
];

/// Resolve a 256-color palette index: 0-15 the standard colors, 16-231 the
/// 6x6x6 color cube, 232-255 the 24-step grayscale ramp.
pub fn indexed_color(index: u8) -> Rgba {
    match index {
        0..=15 => ANSI_COLORS[index as usize],
        16..=231 => {
            let n = index - 16;
            let r = (n / 36) * 51;
            let g = ((n / 6) % 6) * 51;
            let b = (n % 6) * 51;
            Rgba::opaque(r, g, b)
        }
        _ => {
            let gray = 8 + 10 * (index - 232);
            Rgba::opaque(gray, gray, gray)
        }
    }
}
