use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "shaderdeck",
    author,
    version,
    about = "Native viewer for a gallery of GPU fragment shaders",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Slug of the gallery entry to open first.
    #[arg(value_name = "SLUG")]
    pub shader: Option<String>,

    /// Gallery directory containing `manifest.toml` and the shader files.
    #[arg(long, value_name = "DIR", env = "SHADERDECK_GALLERY", default_value = "shaders")]
    pub gallery: PathBuf,

    /// Window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", default_value = "1280x720")]
    pub size: String,

    /// Open with the animation paused.
    #[arg(long)]
    pub paused: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the gallery entries and exit.
    List,
}

pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses a `WIDTHxHEIGHT` window size.
pub fn parse_size(input: &str) -> Result<(u32, u32)> {
    let (width, height) = input
        .split_once(['x', 'X'])
        .with_context(|| format!("size '{input}' is not of the form WIDTHxHEIGHT"))?;
    let width: u32 = width
        .trim()
        .parse()
        .with_context(|| format!("invalid width in '{input}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .with_context(|| format!("invalid height in '{input}'"))?;
    ensure!(width > 0 && height > 0, "size '{input}' must be non-zero");
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_size_pairs() {
        assert_eq!(parse_size("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_size("640X360").unwrap(), (640, 360));
    }

    #[test]
    fn rejects_malformed_sizes() {
        assert!(parse_size("1280").is_err());
        assert!(parse_size("0x720").is_err());
        assert!(parse_size("wide x tall").is_err());
    }
}
