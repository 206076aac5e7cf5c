use std::path::PathBuf;

use clap::Parser;

/// Assemble SVG frames into an animated GIF.
#[derive(Debug, Parser)]
#[clap(about, version)]
pub struct Args {
    /// SVG files to use as frames, in order.
    #[clap(required = true)]
    pub frames: Vec<PathBuf>,
    /// Path to write the GIF file to.
    #[clap(short, long)]
    pub output: PathBuf,
    /// How long every frame is shown, in hundredths of a second.
    #[clap(long, default_value_t = 10)]
    pub delay: u32,
    /// Path to the gifsicle binary. Searched in the usual places if omitted.
    #[clap(long)]
    pub gifsicle: Option<PathBuf>,
    /// Additional directories to load fonts from.
    #[clap(long = "font-path", value_name = "DIR")]
    pub font_paths: Vec<PathBuf>,
    /// Print debug messages.
    #[clap(short, long)]
    pub verbose: bool,
}
