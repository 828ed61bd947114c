use anyhow::Result;
use clap::value_t_or_exit;
use irpano::{arg, args_parser, opt};
use std::path::PathBuf;

pub struct Args {
    pub pano: PathBuf,
    pub palettes: PathBuf,
    pub output: PathBuf,
    pub source: Option<String>,
    pub target: Option<String>,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = args_parser!("repalette")
            .about("Snap a stitched panorama back onto its palette, optionally swapping palettes.")
            .arg(
                opt!("palettes")
                    .required(true)
                    .short("p")
                    .help("Directory of .pal palette files"),
            )
            .arg(
                opt!("output")
                    .required(true)
                    .short("o")
                    .help("Path to write the corrected panorama to"),
            )
            .arg(
                opt!("source")
                    .short("s")
                    .help("Palette the panorama was rendered with (default: identify from pixels)"),
            )
            .arg(
                opt!("target")
                    .short("t")
                    .help("Re-color the panorama onto this palette after snapping"),
            )
            .arg(arg!("pano").required(true).help("Stitched panorama image"))
            .get_matches();

        let pano = value_t_or_exit!(matches, "pano", PathBuf);
        let palettes = value_t_or_exit!(matches, "palettes", PathBuf);
        let output = value_t_or_exit!(matches, "output", PathBuf);
        let source = matches.value_of("source").map(|s| s.to_string());
        let target = matches.value_of("target").map(|s| s.to_string());

        Ok(Args {
            pano,
            palettes,
            output,
            source,
            target,
        })
    }
}
