use anyhow::Result;
use clap::value_t_or_exit;
use irpano::{arg, args_parser, opt};
use std::path::PathBuf;

pub struct Args {
    pub capture: PathBuf,
    pub palette: PathBuf,
    pub output: PathBuf,
    pub threshold: Option<f64>,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = args_parser!("rescale")
            .about("Rescale a capture's infrared frames onto the run-wide temperature scale.")
            .arg(
                opt!("palette")
                    .required(true)
                    .short("p")
                    .help("Palette file (.pal) the frames were rendered with"),
            )
            .arg(
                opt!("output")
                    .required(true)
                    .short("o")
                    .help("Directory to write the rescaled frames into"),
            )
            .arg(
                opt!("threshold")
                    .short("t")
                    .help("Correct per-frame highs above this value as saturation outliers"),
            )
            .arg(
                arg!("capture")
                    .required(true)
                    .help("Capture directory holding ir*.png frames and info.json"),
            )
            .get_matches();

        let capture = value_t_or_exit!(matches, "capture", PathBuf);
        let palette = value_t_or_exit!(matches, "palette", PathBuf);
        let output = value_t_or_exit!(matches, "output", PathBuf);
        let threshold = matches
            .is_present("threshold")
            .then(|| value_t_or_exit!(matches.value_of("threshold"), f64));

        Ok(Args {
            capture,
            palette,
            output,
            threshold,
        })
    }
}
