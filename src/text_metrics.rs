use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Mutex;
use ttf_parser::Face;

static FONT_CACHE: Lazy<Mutex<FontCache>> = Lazy::new(|| Mutex::new(FontCache::new()));

/// Advance width of `text` in the first installed face of `font_family`.
/// `None` when no face resolves, so callers can fall back to a width table.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str, bold: bool) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = FONT_CACHE.lock().ok()?;
    guard.measure(text, font_size, font_family, bold)
}

struct FontCache {
    db: Database,
    system_fonts_loaded: bool,
    faces: HashMap<(String, bool), Option<FontFace>>,
}

impl FontCache {
    fn new() -> Self {
        Self {
            db: Database::new(),
            system_fonts_loaded: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str, bold: bool) -> Option<f32> {
        let key = (family_key(font_family), bold);
        if !self.faces.contains_key(&key) {
            let face = self.load_face(&key.0, bold);
            self.faces.insert(key.clone(), face);
        }
        let face = self.faces.get_mut(&key)?.as_mut()?;
        Some(face.width(text, font_size))
    }

    fn load_face(&mut self, font_family: &str, bold: bool) -> Option<FontFace> {
        if let Some(face) = load_disk_cached(font_family, bold) {
            return Some(face);
        }

        let names: Vec<&str> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\''))
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names.iter().map(|name| generic_or_named(name)).collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.system_fonts_loaded {
            self.db.load_system_fonts();
            self.system_fonts_loaded = true;
        }

        let query = Query {
            families: &families,
            weight: if bold { Weight::BOLD } else { Weight::NORMAL },
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| {
                let face = FontFace::parse(data.to_vec(), index)?;
                store_disk_cached(font_family, bold, &face);
                Some(face)
            })
            .flatten()
    }
}

fn generic_or_named(name: &str) -> Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => Family::Serif,
        "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => Family::SansSerif,
        "monospace" | "ui-monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(name),
    }
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: f32,
    ascii_advances: [u16; 128],
    advances: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1) as f32;
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
            advances: HashMap::new(),
        })
    }

    fn width(&mut self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em;
        // Glyphs the face lacks get a typical CJK-safe advance.
        let missing = font_size * if text.is_ascii() { 0.56 } else { 1.0 };

        let mut units = 0.0f32;
        let mut missing_count = 0usize;
        let mut pending: Vec<char> = Vec::new();
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            if ch.is_ascii() {
                match self.ascii_advances[ch as usize] {
                    0 => missing_count += 1,
                    advance => units += advance as f32,
                }
                continue;
            }
            match self.advances.get(&ch) {
                Some(Some(advance)) => units += *advance as f32,
                Some(None) => missing_count += 1,
                None => pending.push(ch),
            }
        }

        if !pending.is_empty() {
            let face = Face::parse(&self.data, self.index).ok();
            for ch in pending {
                let advance = face
                    .as_ref()
                    .and_then(|f| f.glyph_index(ch).and_then(|g| f.glyph_hor_advance(g)));
                self.advances.insert(ch, advance);
                match advance {
                    Some(advance) => units += advance as f32,
                    None => missing_count += 1,
                }
            }
        }

        (units * scale + missing_count as f32 * missing).max(0.0)
    }
}

fn family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}

fn disk_cache_paths(font_family: &str, bold: bool) -> Option<(PathBuf, PathBuf)> {
    let base = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))?;
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    (font_family, bold).hash(&mut hasher);
    let hash = hasher.finish();
    let dir = base.join("geolr").join("font-cache");
    Some((dir.join(format!("{hash:x}.font")), dir.join(format!("{hash:x}.meta"))))
}

fn load_disk_cached(font_family: &str, bold: bool) -> Option<FontFace> {
    let (font_path, meta_path) = disk_cache_paths(font_family, bold)?;
    let bytes = fs::read(font_path).ok()?;
    let index: u32 = fs::read_to_string(meta_path).ok()?.trim().parse().ok()?;
    FontFace::parse(bytes, index)
}

fn store_disk_cached(font_family: &str, bold: bool, face: &FontFace) {
    let Some((font_path, meta_path)) = disk_cache_paths(font_family, bold) else {
        return;
    };
    if font_path.exists() {
        return;
    }
    if let Some(parent) = font_path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let _ = fs::write(&font_path, &face.data);
    let _ = fs::write(&meta_path, face.index.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_zero_width() {
        assert_eq!(measure_text_width("", 16.0, "sans-serif", false), Some(0.0));
        assert_eq!(measure_text_width("abc", 0.0, "sans-serif", true), Some(0.0));
    }

    #[test]
    fn family_key_defaults_to_sans() {
        assert_eq!(family_key("   "), "sans-serif");
        assert_eq!(family_key(" Arial "), "Arial");
    }

    #[test]
    fn generic_families_resolve() {
        assert!(matches!(generic_or_named("Sans-Serif"), Family::SansSerif));
        assert!(matches!(generic_or_named("ui-monospace"), Family::Monospace));
        assert!(matches!(generic_or_named("Inter"), Family::Name("Inter")));
    }
}
