// SPDX-License-Identifier: PMPL-1.0-or-later
//! Color and contrast math for WCAG 1.4.3 / 1.4.6.
//!
//! - AA: 4.5:1 for normal text, 3:1 for large text
//! - AAA: 7:1 for normal text, 4.5:1 for large text

use crate::issue::WcagLevel;
use crate::node::{Paint, PaintType};

/// 8-bit sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Return the color of the first visible SOLID paint.
///
/// `None` when the list is empty, holds no visible solid, or that solid has
/// no color attached.
pub fn extract_color(fills: &[Paint]) -> Option<Rgb> {
    let solid = fills
        .iter()
        .find(|f| f.paint_type == PaintType::Solid && f.visible)?;
    let color = solid.color?;
    Some(Rgb {
        r: to_channel(color.r),
        g: to_channel(color.g),
        b: to_channel(color.b),
    })
}

fn to_channel(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Calculate relative luminance per WCAG 2.x
/// <https://www.w3.org/TR/WCAG21/#dfn-relative-luminance>
pub fn relative_luminance(color: Rgb) -> f64 {
    let [r, g, b] = [color.r, color.g, color.b].map(|c| {
        let v = c as f64 / 255.0;
        if v <= 0.03928 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    });
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Calculate contrast ratio between two colors
/// Returns a ratio >= 1.0 (e.g., 4.5, 7.0, 21.0)
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let l1 = relative_luminance(a);
    let l2 = relative_luminance(b);
    let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Large text: at least 18px, or at least 14px when bold (weight >= 700)
pub fn is_large_text(font_size: Option<f64>, font_weight: Option<f64>) -> bool {
    match font_size {
        Some(size) if size >= 18.0 => true,
        Some(size) if size >= 14.0 => font_weight.is_some_and(|w| w >= 700.0),
        _ => false,
    }
}

/// Minimum contrast ratio for a level and text size.
///
/// Level A has no contrast criterion of its own and uses the AA thresholds.
pub fn required_contrast(level: WcagLevel, large_text: bool) -> f64 {
    match (level, large_text) {
        (WcagLevel::AAA, false) => 7.0,
        (WcagLevel::AAA, true) => 4.5,
        (_, false) => 4.5,
        (_, true) => 3.0,
    }
}
