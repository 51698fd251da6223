use crate::config::LayoutConfig;
use crate::text_metrics;
use crate::theme::Theme;

/// Text width capability consumed by placement. Implementations must be
/// deterministic for identical inputs.
pub trait TextMeasure {
    fn text_width(&self, text: &str, font_size: f32, bold: bool) -> f32;
}

/// Measures with installed system fonts, falling back to the width table
/// when no face resolves.
#[derive(Debug, Clone)]
pub struct FontMeasure {
    pub font_family: String,
}

impl TextMeasure for FontMeasure {
    fn text_width(&self, text: &str, font_size: f32, bold: bool) -> f32 {
        text_metrics::measure_text_width(text, font_size, &self.font_family, bold)
            .unwrap_or_else(|| fallback_text_width(text, font_size, bold))
    }
}

/// Font-independent estimate from per-character width factors.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastMeasure;

impl TextMeasure for FastMeasure {
    fn text_width(&self, text: &str, font_size: f32, bold: bool) -> f32 {
        fallback_text_width(text, font_size, bold)
    }
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn text_width(&self, text: &str, font_size: f32, bold: bool) -> f32 {
        (**self).text_width(text, font_size, bold)
    }
}

pub fn measurer_for(theme: &Theme, config: &LayoutConfig) -> Box<dyn TextMeasure> {
    if config.fast_text_metrics {
        Box::new(FastMeasure)
    } else {
        Box::new(FontMeasure {
            font_family: theme.font_family.clone(),
        })
    }
}

const BOLD_WIDTH_FACTOR: f32 = 1.06;

pub(crate) fn fallback_text_width(text: &str, font_size: f32, bold: bool) -> f32 {
    let em: f32 = text.chars().filter(|c| *c != '\n').map(char_width_factor).sum();
    let weight = if bold { BOLD_WIDTH_FACTOR } else { 1.0 };
    em * font_size * weight
}

/// Advance width in ems for a sans-serif face. East Asian wide characters
/// take a full em.
pub(crate) fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.306,
        'i' | 'j' | 'l' | 'I' | '!' | '|' | '.' | ',' | ':' | ';' | '\'' => 0.26,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '{' | '}' | '-' => 0.35,
        'm' | 'w' => 0.84,
        'M' | 'W' => 0.93,
        '@' | '#' | '%' | '&' => 0.95,
        '0'..='9' => 0.60,
        'A'..='Z' => 0.68,
        'a'..='z' => 0.56,
        _ if is_wide(ch) => 1.0,
        _ => 0.57,
    }
}

fn is_wide(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x2FFFD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_width_factor_returns_positive_values() {
        for ch in ['a', 'Z', ' ', '0', '@', '\u{4e2d}', 'é'] {
            assert!(char_width_factor(ch) > 0.0, "char {:?} has zero width", ch);
        }
    }

    #[test]
    fn cjk_is_full_width() {
        assert_eq!(char_width_factor('中'), 1.0);
        assert_eq!(char_width_factor('가'), 1.0);
        assert!(char_width_factor('a') < 1.0);
    }

    #[test]
    fn fallback_text_width_scales_with_font_size() {
        let w16 = fallback_text_width("Hello", 16.0, false);
        let w32 = fallback_text_width("Hello", 32.0, false);
        assert!((w32 - w16 * 2.0).abs() < 0.01, "width should double with font size");
    }

    #[test]
    fn bold_is_wider() {
        assert!(FastMeasure.text_width("Harbor", 16.0, true) > FastMeasure.text_width("Harbor", 16.0, false));
    }

    #[test]
    fn measurer_for_honors_fast_flag() {
        let config = LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        };
        let measurer = measurer_for(&Theme::classic(), &config);
        assert_eq!(
            measurer.text_width("abc", 10.0, false),
            FastMeasure.text_width("abc", 10.0, false)
        );
    }
}
