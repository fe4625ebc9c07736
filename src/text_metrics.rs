use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

const ELLIPSIS: char = '…';
// Average advance of a sans-serif glyph relative to the font size.
const FALLBACK_CHAR_WIDTH: f32 = 0.56;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Width of `text` in user units, from the first installed font matching `font_family`.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

/// Like [`measure_text_width`], estimating from the character count when no font is available.
pub fn text_width(text: &str, font_size: f32, font_family: &str) -> f32 {
    measure_text_width(text, font_size, font_family)
        .unwrap_or_else(|| text.chars().count() as f32 * font_size * FALLBACK_CHAR_WIDTH)
}

/// Shorten `text` with a trailing ellipsis so it fits in `max_width`.
pub fn ellipsize(text: &str, max_width: f32, font_size: f32, font_family: &str) -> String {
    if text_width(text, font_size, font_family) <= max_width {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    let mut keep = chars.len();
    while keep > 0 {
        keep -= 1;
        let mut candidate: String = chars[..keep].iter().collect::<String>().trim_end().to_string();
        candidate.push(ELLIPSIS);
        if text_width(&candidate, font_size, font_family) <= max_width {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let key = font_family.trim().to_string();
        if !self.faces.contains_key(&key) {
            let face = self.load_face(font_family);
            self.faces.insert(key.clone(), face);
        }
        let face = self.faces.get(&key)?.as_ref()?;
        Some(face.measure_width(text, font_size))
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        let names: Vec<String> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "monospace" | "ui-monospace" => Family::Monospace,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    Family::SansSerif
                }
                _ => Family::Name(name.as_str()),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| FontFace::parse(data, index))
            .flatten()
    }
}

/// Horizontal advances captured from a parsed face, so the font bytes need not be kept.
struct FontFace {
    units_per_em: f32,
    advances: HashMap<char, u16>,
    ascii: [u16; 128],
}

impl FontFace {
    fn parse(data: &[u8], index: u32) -> Option<Self> {
        let face = Face::parse(data, index).ok()?;
        let mut ascii = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        let mut advances = HashMap::new();
        // Latin-1 supplement and extended Latin cover most member names.
        for code in 0x00A0u32..=0x024F {
            let Some(ch) = char::from_u32(code) else {
                continue;
            };
            if let Some(advance) = face
                .glyph_index(ch)
                .and_then(|glyph| face.glyph_hor_advance(glyph))
            {
                advances.insert(ch, advance);
            }
        }
        advances.insert(ELLIPSIS, {
            face.glyph_index(ELLIPSIS)
                .and_then(|glyph| face.glyph_hor_advance(glyph))
                .unwrap_or(0)
        });
        Some(Self {
            units_per_em: face.units_per_em().max(1) as f32,
            advances,
            ascii,
        })
    }

    fn measure_width(&self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em;
        let fallback = font_size * FALLBACK_CHAR_WIDTH;
        text.chars()
            .filter(|ch| *ch != '\n')
            .map(|ch| {
                let advance = if ch.is_ascii() {
                    self.ascii[ch as usize]
                } else {
                    self.advances.get(&ch).copied().unwrap_or(0)
                };
                if advance == 0 {
                    fallback
                } else {
                    advance as f32 * scale
                }
            })
            .sum::<f32>()
            .max(0.0)
    }
}
