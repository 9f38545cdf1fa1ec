use std::fs;

use anyhow::{Context, Result};
use webpdec::{ImageInfo, MAX_DIMENSION};

use crate::cli::ProbeArgs;

pub fn run_probe(args: &ProbeArgs) -> Result<()> {
    for path in &args.inputs {
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let info = webpdec::probe(&bytes)
            .with_context(|| format!("Failed to probe {}", path.display()))?;
        println!("{}: {}", path.display(), describe(&info));
    }
    Ok(())
}

fn describe(info: &ImageInfo) -> String {
    let mut parts = vec![
        info.dimensions().to_string(),
        info.format.as_str().to_owned(),
    ];
    if info.extended {
        parts.push("extended".into());
    }
    if info.has_alpha {
        parts.push("alpha (discarded)".into());
    }
    for (present, name) in [
        (info.has_icc, "ICC"),
        (info.has_exif, "EXIF"),
        (info.has_xmp, "XMP"),
    ] {
        if present {
            parts.push(name.into());
        }
    }
    if info.width > MAX_DIMENSION || info.height > MAX_DIMENSION {
        parts.push(format!("exceeds {MAX_DIMENSION}x{MAX_DIMENSION} panel limit"));
    }
    parts.join(", ")
}
