//! Palette loading and nearest-color matching.
//!
//! A palette is the camera's fixed color ramp: an ordered list of
//! colors running from the coldest to the hottest representable
//! temperature. The camera ships them as `.pal` text files of
//! whitespace-separated `Y,Cb,Cr` triples; they are converted to BGR
//! once at load time and are immutable afterwards.

use std::{
    collections::HashSet,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use ndarray::Array3;
use thiserror::Error;

use crate::color::Color;

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("could not read palette source: {0}")]
    Io(#[from] std::io::Error),

    #[error("palette entry {entry}: expected 3 comma-separated fields, got {count}")]
    FieldCount { entry: usize, count: usize },

    #[error("palette entry {entry}: invalid channel value `{value}`")]
    InvalidValue { entry: usize, value: String },

    #[error("palette `{0}` needs at least 2 entries to form a ramp")]
    TooFewEntries(String),
}

/// An ordered, immutable color ramp loaded from a `.pal` source.
#[derive(Debug, Clone)]
pub struct Palette {
    name: String,
    colors: Vec<Color>,
    members: HashSet<Color>,
}

impl Palette {
    /// Parse a `.pal` source: whitespace-separated `Y,Cb,Cr` integer
    /// triples, in ramp order (coldest first). Each triple is converted
    /// to BGR via [`Color::from_ycbcr`].
    pub fn load<R: Read>(name: &str, mut source: R) -> Result<Self, PaletteError> {
        let mut text = String::new();
        source.read_to_string(&mut text)?;

        let mut colors = Vec::new();
        for (i, triple) in text.split_whitespace().enumerate() {
            let fields: Vec<&str> = triple.split(',').collect();
            if fields.len() != 3 {
                return Err(PaletteError::FieldCount {
                    entry: i,
                    count: fields.len(),
                });
            }
            let mut channels = [0f64; 3];
            for (ch, field) in channels.iter_mut().zip(&fields) {
                *ch = field
                    .parse::<u8>()
                    .map_err(|_| PaletteError::InvalidValue {
                        entry: i,
                        value: (*field).to_string(),
                    })? as f64;
            }
            colors.push(Color::from_ycbcr(channels[0], channels[1], channels[2]));
        }

        Self::from_colors(name, colors)
    }

    pub fn load_path(path: &Path) -> Result<Self, PaletteError> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::load(&name, BufReader::new(File::open(path)?))
    }

    /// Load every `*.pal` file in a directory, sorted by name. Used to
    /// assemble the candidate set for [`identify`].
    pub fn load_dir(dir: &Path) -> Result<Vec<Self>, PaletteError> {
        let mut paths: Vec<_> = dir
            .read_dir()?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|e| e.path())
            .filter(|p| p.extension().map_or(false, |ext| ext == "pal"))
            .collect();
        paths.sort();
        paths.iter().map(|p| Self::load_path(p)).collect()
    }

    /// Build a palette from already-converted BGR colors.
    pub fn from_colors(name: &str, colors: Vec<Color>) -> Result<Self, PaletteError> {
        if colors.len() < 2 {
            return Err(PaletteError::TooFewEntries(name.to_string()));
        }
        let members = colors.iter().copied().collect();
        Ok(Palette {
            name: name.to_string(),
            colors,
            members,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn color_at(&self, index: usize) -> Color {
        self.colors[index]
    }

    /// Exact membership test, used by [`identify`].
    pub fn contains(&self, color: Color) -> bool {
        self.members.contains(&color)
    }

    /// Index of the entry nearest to `pixel` under the
    /// sum-of-absolute-differences metric. Ties go to the lowest index.
    pub fn nearest_index(&self, pixel: Color) -> usize {
        let mut best = 0;
        let mut best_dist = u32::MAX;
        for (i, entry) in self.colors.iter().enumerate() {
            let dist = entry.distance(&pixel);
            if dist < best_dist {
                best_dist = dist;
                best = i;
                if dist == 0 {
                    break;
                }
            }
        }
        best
    }

    /// The palette entry nearest to `pixel`. Always an element of the
    /// palette; an exact member maps to itself.
    pub fn nearest(&self, pixel: Color) -> Color {
        self.colors[self.nearest_index(pixel)]
    }
}

/// Figure out which of the `candidates` an image was rendered with.
///
/// Scans pixels in row-major order, dropping every candidate that lacks
/// an exact match for the pixel's color, and returns as soon as a
/// single candidate remains. Returns `None` when no candidate survives,
/// or when the full scan still leaves more than one.
///
/// Only meaningful for images whose colors are an exact subset of one
/// palette (i.e. straight off the camera, or after
/// [`snap_to_palette`][crate::convert::snap_to_palette]); this function
/// deliberately never falls back to nearest-color matching.
pub fn identify<'a>(image: &Array3<u8>, candidates: &'a [Palette]) -> Option<&'a Palette> {
    let mut alive: Vec<&Palette> = candidates.iter().collect();
    let (ht, wid, _) = image.dim();

    for row in 0..ht {
        for col in 0..wid {
            let pixel = Color::new(
                image[(row, col, 0)],
                image[(row, col, 1)],
                image[(row, col, 2)],
            );
            alive.retain(|p| p.contains(pixel));
            match alive.len() {
                0 => return None,
                1 => return Some(alive[0]),
                _ => {}
            }
        }
    }
    None
}
