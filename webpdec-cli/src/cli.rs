use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::ValueHint};
use webpdec::MAX_DIMENSION;

/// Command-line arguments for webpdec.
#[derive(Parser, Debug)]
#[command(
    name = "webpdec",
    about = "Decode WebP stills into raw RGB565 frames for RGB matrix panels.",
    author,
    version = webpdec::VERSION,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Log decoder stages (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a WebP file into a raw framebuffer
    Convert(ConvertArgs),
    /// Print what the container headers declare
    Probe(ProbeArgs),
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// WebP file to decode
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Panel width the image must have (defaults to the image's own)
    #[arg(
        long,
        short = 'W',
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_DIMENSION))
    )]
    pub width: Option<u32>,

    /// Panel height the image must have (defaults to the image's own)
    #[arg(
        long,
        short = 'H',
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_DIMENSION))
    )]
    pub height: Option<u32>,

    /// Output path (defaults to the input with a .rgb565 or .rgb888 extension)
    #[arg(long, short = 'o', value_hint = ValueHint::FilePath, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Write unpacked RGB888 instead of RGB565
    #[arg(long)]
    pub rgb888: bool,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// WebP files to inspect
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath, required = true)]
    pub inputs: Vec<PathBuf>,
}
