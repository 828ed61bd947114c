mod args;

use anyhow::{anyhow, bail, Context, Result};
use irpano::{
    convert::{remap, snap_to_palette},
    io::{read_frame, write_frame},
    palette::{identify, Palette},
};

use crate::args::Args;

fn find<'a>(palettes: &'a [Palette], name: &str) -> Result<&'a Palette> {
    palettes
        .iter()
        .find(|p| p.name() == name)
        .ok_or_else(|| anyhow!("no palette named `{}` in the palette directory", name))
}

fn main() -> Result<()> {
    let args = Args::from_cmd_line()?;

    let palettes = Palette::load_dir(&args.palettes)
        .with_context(|| format!("loading palettes from {}", args.palettes.display()))?;
    if palettes.is_empty() {
        bail!("no .pal files found in {}", args.palettes.display());
    }

    let image = read_frame(&args.pano)
        .with_context(|| format!("reading panorama {}", args.pano.display()))?;

    let source = match &args.source {
        Some(name) => find(&palettes, name)?,
        None => identify(&image, &palettes)
            .context("could not identify the panorama's palette; pass --source")?,
    };
    eprintln!("Source palette: {}", source.name());

    // Blending during the stitch nudges pixels off the ramp; snap them
    // back before any exact-lookup conversion.
    let snapped = snap_to_palette(&image, source);

    let output = match &args.target {
        Some(name) => remap(&snapped, source, find(&palettes, name)?),
        None => snapped,
    };
    write_frame(&args.output, &output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    Ok(())
}
