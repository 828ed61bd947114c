//! Per-frame temperature extremes, run metadata, and outlier
//! correction.
//!
//! Each capture directory carries an `info.json` recording the lowest
//! and highest temperature the camera saw in every frame. Those
//! extremes drive the whole rescale; a handful of saturated readings
//! (sun glare, specular reflections) would stretch the global scale
//! badly, so runs of implausible highs are corrected before anything
//! else looks at the numbers.

use std::{fs::File, io::BufReader, io::Read, path::Path};

use serde_derive::*;
use thiserror::Error;

/// The (lowest, highest) temperature pair recorded for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameExtremes {
    pub lowest: f64,
    pub highest: f64,
}

impl FrameExtremes {
    pub fn new(lowest: f64, highest: f64) -> Self {
        FrameExtremes { lowest, highest }
    }
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("could not read run metadata: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed run metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("lowestTemperatures has {lowest} entries but highestTemperatures has {highest}")]
    MismatchedLengths { lowest: usize, highest: usize },

    #[error("run metadata lists no frames")]
    Empty,
}

/// The per-run metadata record (`info.json`).
#[derive(Debug, Deserialize)]
pub struct RunInfo {
    #[serde(rename = "lowestTemperatures")]
    lowest_temperatures: Vec<f64>,

    #[serde(rename = "highestTemperatures")]
    highest_temperatures: Vec<f64>,
}

impl RunInfo {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, MetadataError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, MetadataError> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Zip the two sequences into per-frame pairs, validating that they
    /// are non-empty and of equal length.
    pub fn frame_extremes(&self) -> Result<Vec<FrameExtremes>, MetadataError> {
        if self.lowest_temperatures.len() != self.highest_temperatures.len() {
            return Err(MetadataError::MismatchedLengths {
                lowest: self.lowest_temperatures.len(),
                highest: self.highest_temperatures.len(),
            });
        }
        if self.lowest_temperatures.is_empty() {
            return Err(MetadataError::Empty);
        }
        Ok(self
            .lowest_temperatures
            .iter()
            .zip(&self.highest_temperatures)
            .map(|(&lowest, &highest)| FrameExtremes { lowest, highest })
            .collect())
    }
}

#[derive(Debug, Error)]
pub enum OutlierError {
    #[error("outlier run of {len} frames starting at frame {start} has no valid neighbor to borrow from")]
    RunAtBoundary { start: usize, len: usize },
}

/// Replace implausible per-frame highs with a neighbor's value.
///
/// Frames whose `highest` exceeds `threshold` form contiguous runs
/// (think of the camera sweeping across the sun). The first half of a
/// run inherits the `highest` of the frame just before it, the second
/// half the `highest` of the frame just after it; `lowest` values are
/// never touched. The input is not mutated.
///
/// A half that has no donor frame on its side (a run starting at frame
/// 0, or one reaching the last frame with frames in its second half) is
/// an error rather than a guess; the caller should pick a saner
/// threshold or trim the capture.
pub fn correct_outliers(
    extremes: &[FrameExtremes],
    threshold: f64,
) -> Result<Vec<FrameExtremes>, OutlierError> {
    let mut corrected = extremes.to_vec();
    let is_outlier = |e: &FrameExtremes| e.highest > threshold;

    let mut i = 0;
    while i < extremes.len() {
        if !is_outlier(&extremes[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < extremes.len() && is_outlier(&extremes[i]) {
            i += 1;
        }
        let len = i - start;

        // First half (midpoint included for odd runs) borrows from the
        // frame before the run, second half from the frame after it.
        let first_half = (len + 1) / 2;
        if start == 0 {
            return Err(OutlierError::RunAtBoundary { start, len });
        }
        if first_half < len && start + len == extremes.len() {
            return Err(OutlierError::RunAtBoundary { start, len });
        }

        let before = extremes[start - 1].highest;
        for k in 0..first_half {
            corrected[start + k].highest = before;
        }
        if first_half < len {
            let after = extremes[start + len].highest;
            for k in first_half..len {
                corrected[start + k].highest = after;
            }
        }
    }

    Ok(corrected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ex(lowest: f64, highest: f64) -> FrameExtremes {
        FrameExtremes::new(lowest, highest)
    }

    #[test]
    fn run_info_zips_extremes() {
        let json = r#"{
            "lowestTemperatures": [10.0, 15.0],
            "highestTemperatures": [20.0, 152.0]
        }"#;
        let info = RunInfo::from_reader(json.as_bytes()).unwrap();
        let extremes = info.frame_extremes().unwrap();
        assert_eq!(extremes, vec![ex(10., 20.), ex(15., 152.)]);
    }

    #[test]
    fn run_info_rejects_mismatched_lengths() {
        let json = r#"{
            "lowestTemperatures": [10.0],
            "highestTemperatures": [20.0, 152.0]
        }"#;
        let info = RunInfo::from_reader(json.as_bytes()).unwrap();
        assert!(matches!(
            info.frame_extremes(),
            Err(MetadataError::MismatchedLengths {
                lowest: 1,
                highest: 2
            })
        ));
    }

    #[test]
    fn run_info_rejects_empty() {
        let json = r#"{ "lowestTemperatures": [], "highestTemperatures": [] }"#;
        let info = RunInfo::from_reader(json.as_bytes()).unwrap();
        assert!(matches!(info.frame_extremes(), Err(MetadataError::Empty)));
    }

    #[test]
    fn single_outlier_borrows_from_the_frame_before() {
        let input = vec![ex(10., 20.), ex(15., 152.)];
        let corrected = correct_outliers(&input, 150.).unwrap();
        assert_eq!(corrected, vec![ex(10., 20.), ex(15., 20.)]);
        // Pure function: the input stays as it was.
        assert_eq!(input[1].highest, 152.);
    }

    #[test]
    fn run_splits_between_both_neighbors() {
        let input = vec![
            ex(0., 30.),
            ex(0., 200.),
            ex(0., 210.),
            ex(0., 220.),
            ex(0., 230.),
            ex(0., 35.),
        ];
        let corrected = correct_outliers(&input, 150.).unwrap();
        let highs: Vec<f64> = corrected.iter().map(|e| e.highest).collect();
        assert_eq!(highs, vec![30., 30., 30., 35., 35., 35.]);
    }

    #[test]
    fn odd_run_midpoint_goes_to_the_preceding_donor() {
        let input = vec![ex(0., 30.), ex(0., 200.), ex(0., 210.), ex(0., 220.), ex(0., 35.)];
        let corrected = correct_outliers(&input, 150.).unwrap();
        let highs: Vec<f64> = corrected.iter().map(|e| e.highest).collect();
        assert_eq!(highs, vec![30., 30., 30., 35., 35.]);
    }

    #[test]
    fn lowest_values_are_untouched() {
        let input = vec![ex(7., 20.), ex(3., 152.)];
        let corrected = correct_outliers(&input, 150.).unwrap();
        assert_eq!(corrected[1].lowest, 3.);
    }

    #[test]
    fn run_at_sequence_start_is_an_error() {
        let input = vec![ex(0., 200.), ex(0., 20.)];
        assert!(matches!(
            correct_outliers(&input, 150.),
            Err(OutlierError::RunAtBoundary { start: 0, len: 1 })
        ));
    }

    #[test]
    fn long_run_reaching_the_end_is_an_error() {
        // Length-2 run at the end: its second half would need a donor
        // after the sequence.
        let input = vec![ex(0., 20.), ex(0., 200.), ex(0., 210.)];
        assert!(matches!(
            correct_outliers(&input, 150.),
            Err(OutlierError::RunAtBoundary { start: 1, len: 2 })
        ));
    }

    #[test]
    fn no_outliers_is_a_noop() {
        let input = vec![ex(0., 20.), ex(1., 25.)];
        assert_eq!(correct_outliers(&input, 150.).unwrap(), input);
    }
}
