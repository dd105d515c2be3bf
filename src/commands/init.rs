use crate::commands::Out;
use crate::{Config, Result};
use anyhow::{bail, Context};
use std::path::{Path, PathBuf};

/// Creates a config file with default settings.
///
/// # Arguments
/// - `path` - Where to write the file. When `None`, the default location in the user's config
///   directory is used.
///
/// # Errors
/// - Returns an error if there is no usable location, if a file already exists there, or if any
///   file operation fails.
pub fn init(path: Option<&Path>) -> Result<Out<PathBuf>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match Config::default_path() {
            Some(p) => p,
            None => bail!("No config directory was found; pass --config to choose a location"),
        },
    };
    let config = Config::create(&path).context("Unable to create the config file")?;
    let written = config.path().unwrap_or(path.as_path()).to_path_buf();
    Ok(Out::new(
        format!("Wrote the default config to {}", written.display()),
        written,
    ))
}
