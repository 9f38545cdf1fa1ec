use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use log::debug;
use webpdec::{Decoder, Dimensions, Pipeline};

use crate::cli::ConvertArgs;

pub fn run_convert(args: &ConvertArgs, out_path: &Path) -> Result<()> {
    let bytes = fs::read(&args.input)
        .with_context(|| format!("Failed to read WebP file {}", args.input.display()))?;

    let info = webpdec::probe(&bytes)
        .with_context(|| format!("{} is not a usable WebP file", args.input.display()))?;
    let dims = Dimensions::new(
        args.width.unwrap_or(info.width),
        args.height.unwrap_or(info.height),
    );
    debug!("{}: {} {}", args.input.display(), info.dimensions(), info.format.as_str());

    let frame = if args.rgb888 {
        ensure!(
            info.dimensions() == dims,
            "{} is {}, expected {}",
            args.input.display(),
            info.dimensions(),
            dims
        );
        Decoder::new()
            .reconstruct(&bytes, &info)
            .with_context(|| format!("Failed to decode {}", args.input.display()))?
            .into_vec()
    } else {
        Pipeline::new()
            .process(&bytes, dims.width, dims.height)
            .with_context(|| format!("Failed to convert {}", args.input.display()))?
            .into_vec()
    };

    fs::write(out_path, &frame)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;
    println!(
        "Wrote {} ({}, {} bytes, {})",
        out_path.display(),
        dims,
        frame.len(),
        if args.rgb888 { "RGB888" } else { "RGB565 LE" }
    );
    Ok(())
}
