use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use anyhow::Result;
use clap::Parser;

mod cli;
mod convert;
mod probe;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    init_logging(args.verbose);
    run(args.command)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn run(cmd: cli::Command) -> Result<()> {
    match cmd {
        cli::Command::Convert(args) => {
            let out_path = resolve_out_path(&args);
            convert::run_convert(&args, &out_path)
        }
        cli::Command::Probe(args) => probe::run_probe(&args),
    }
}

fn resolve_out_path(args: &cli::ConvertArgs) -> PathBuf {
    args.out
        .clone()
        .unwrap_or_else(|| default_out_for_input(&args.input, args.rgb888))
}

fn default_out_for_input(input: &Path, rgb888: bool) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input.file_stem().unwrap_or_else(|| OsStr::new("frame"));

    let mut filename = stem.to_os_string();
    filename.push(if rgb888 { ".rgb888" } else { ".rgb565" });

    let mut out = parent.to_path_buf();
    out.push(filename);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_out_swaps_the_extension() {
        assert_eq!(
            default_out_for_input(Path::new("assets/logo.webp"), false),
            PathBuf::from("assets/logo.rgb565")
        );
        assert_eq!(
            default_out_for_input(Path::new("logo.webp"), true),
            PathBuf::from("logo.rgb888")
        );
    }

    #[test]
    fn cli_parses_convert() {
        let args = cli::Cli::try_parse_from([
            "webpdec", "convert", "in.webp", "-W", "64", "-H", "32", "-v",
        ])
        .unwrap();
        assert!(args.verbose);
        let cli::Command::Convert(convert) = args.command else {
            panic!("expected convert");
        };
        assert_eq!(convert.width, Some(64));
        assert_eq!(convert.height, Some(32));
        assert!(!convert.rgb888);
    }

    #[test]
    fn cli_rejects_oversized_dimensions() {
        assert!(cli::Cli::try_parse_from(["webpdec", "convert", "in.webp", "-W", "257"]).is_err());
        assert!(cli::Cli::try_parse_from(["webpdec", "convert", "in.webp", "-H", "0"]).is_err());
    }
}
