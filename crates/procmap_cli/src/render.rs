//! ASCII rendering of generated maps

use procmap::{GeneratedMap, Generator};

const BLOCKING_GLYPH: char = '#';
const DIG_GLYPH: char = '.';
const SPARE_GLYPHS: &str = "0123456789@%&*+=~^";

/// One distinct glyph per tile name
pub struct Glyphs {
    entries: Vec<(String, char)>,
}

impl Glyphs {
    /// Blocking renders as `#`, dig as `.`, every other tile as the first
    /// character of its name not already taken.
    pub fn new(generator: &Generator) -> Self {
        let vocabulary = generator.vocabulary();
        let mut entries: Vec<(String, char)> = Vec::with_capacity(vocabulary.len());

        for (id, name, _) in vocabulary.iter() {
            let glyph = if id == generator.blocking() {
                BLOCKING_GLYPH
            } else if id == generator.dig() {
                DIG_GLYPH
            } else {
                let taken = |c: char| {
                    c == BLOCKING_GLYPH || c == DIG_GLYPH || entries.iter().any(|(_, g)| *g == c)
                };
                name.chars()
                    .filter(|c| c.is_ascii_graphic())
                    .chain(SPARE_GLYPHS.chars())
                    .find(|c| !taken(*c))
                    .unwrap_or('?')
            };
            entries.push((name.to_string(), glyph));
        }

        Self { entries }
    }

    pub fn glyph(&self, name: &str) -> char {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, g)| *g)
            .unwrap_or('?')
    }

    pub fn render(&self, map: &GeneratedMap) -> String {
        let mut out = String::with_capacity(((map.width + 1) * map.height) as usize);
        for row in &map.rows {
            out.extend(row.iter().map(|name| self.glyph(name)));
            out.push('\n');
        }
        out
    }

    pub fn legend(&self) -> String {
        self.entries
            .iter()
            .map(|(name, glyph)| format!("{} {}\n", glyph, name))
            .collect()
    }
}
