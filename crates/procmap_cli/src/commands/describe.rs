//! Describe command

use std::path::Path;

use procmap::{load_config, ConfigError};

pub fn run(config: &Path) -> Result<(), ConfigError> {
    let generator = load_config(config)?.resolve()?;

    println!("{}", config.display());
    println!("{}", "=".repeat(config.display().to_string().len()));
    print!("{}", generator);
    Ok(())
}
