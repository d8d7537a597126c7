//! Generate command

use std::path::Path;

use procmap::load_generator;
use tracing::info;

use crate::render::Glyphs;
use crate::OutputFormat;

pub fn run(
    config: &Path,
    seed: Option<u64>,
    format: OutputFormat,
    output: Option<&Path>,
    legend: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let generator = load_generator(config)?;
    let seed = seed.unwrap_or_else(rand::random);
    info!(config = %config.display(), seed, "generating map");

    let map = generator.generate_seeded(seed)?;

    let mut text = match format {
        OutputFormat::Text => {
            let glyphs = Glyphs::new(&generator);
            let mut text = glyphs.render(&map);
            if legend {
                text.push('\n');
                text.push_str(&glyphs.legend());
            }
            text
        }
        OutputFormat::Json => serde_json::to_string_pretty(&map)?,
    };
    if !text.ends_with('\n') {
        text.push('\n');
    }

    match output {
        Some(path) => {
            std::fs::write(path, text)?;
            info!(path = %path.display(), "wrote map");
        }
        None => print!("{}", text),
    }

    Ok(())
}
