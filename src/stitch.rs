//! Interface to the external panorama stitching collaborator.
//!
//! Feature matching, camera estimation, warping and blending live
//! outside this crate. This module only fixes the shape of the
//! exchange: an ordered set of per-kind frame lists goes in, one
//! composited buffer per kind plus crop offsets comes out. The crop
//! offsets describe the black border the warp leaves behind, which the
//! caller trims before palette correction.

use anyhow::{ensure, Result};
use ndarray::{Array3, Axis};

use crate::io::FrameKind;

/// Feature detector the collaborator should match frames with. KAZE is
/// slower but markedly more reliable on low-texture thermal frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureStrategy {
    Kaze,
    Orb,
}

/// All frames of one kind, in capture order.
pub struct FrameLayer {
    pub kind: FrameKind,
    pub frames: Vec<Array3<u8>>,
}

/// A stitch request: parallel layers of equal length, composited with
/// one shared camera solution so the outputs stay aligned.
pub struct StitchJob {
    pub layers: Vec<FrameLayer>,
    pub strategy: FeatureStrategy,
}

impl StitchJob {
    pub fn new(layers: Vec<FrameLayer>, strategy: FeatureStrategy) -> Result<Self> {
        ensure!(!layers.is_empty(), "a stitch job needs at least one layer");
        let count = layers[0].frames.len();
        ensure!(count > 1, "a stitch job needs at least two frames");
        for layer in &layers {
            ensure!(
                layer.frames.len() == count,
                "layer `{}` has {} frames, expected {}",
                layer.kind,
                layer.frames.len(),
                count
            );
        }
        Ok(StitchJob { layers, strategy })
    }
}

/// Rows/columns to trim from each edge of every output panorama.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CropOffsets {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl CropOffsets {
    /// Slice the borders off a composited buffer.
    pub fn apply(&self, image: &Array3<u8>) -> Array3<u8> {
        let (ht, wid, _) = image.dim();
        let bottom = ht.saturating_sub(self.bottom).max(self.top);
        let right = wid.saturating_sub(self.right).max(self.left);
        image
            .slice_axis(Axis(0), (self.top..bottom).into())
            .slice_axis(Axis(1), (self.left..right).into())
            .to_owned()
    }
}

/// One composited buffer per input layer, in layer order.
pub struct StitchOutput {
    pub panoramas: Vec<Array3<u8>>,
    pub crop: CropOffsets,
}

/// The stitching collaborator.
pub trait Stitcher {
    fn stitch(&self, job: &StitchJob) -> Result<StitchOutput>;
}

/// Pass-through stand-in for tests: "composites" each layer by
/// returning its first frame, with no crop.
pub struct IdentityStitcher;

impl Stitcher for IdentityStitcher {
    fn stitch(&self, job: &StitchJob) -> Result<StitchOutput> {
        let panoramas = job
            .layers
            .iter()
            .map(|layer| layer.frames[0].clone())
            .collect();
        Ok(StitchOutput {
            panoramas,
            crop: CropOffsets::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(kind: FrameKind, count: usize) -> FrameLayer {
        FrameLayer {
            kind,
            frames: (0..count).map(|_| Array3::zeros((2, 2, 3))).collect(),
        }
    }

    #[test]
    fn job_rejects_mismatched_layer_lengths() {
        let layers = vec![layer(FrameKind::Visible, 3), layer(FrameKind::Infrared, 2)];
        assert!(StitchJob::new(layers, FeatureStrategy::Kaze).is_err());
    }

    #[test]
    fn job_accepts_parallel_layers() {
        let layers = vec![layer(FrameKind::Visible, 3), layer(FrameKind::Infrared, 3)];
        let job = StitchJob::new(layers, FeatureStrategy::Orb).unwrap();
        assert_eq!(job.layers.len(), 2);
    }

    #[test]
    fn crop_offsets_trim_edges() {
        let image: Array3<u8> = Array3::zeros((10, 8, 3));
        let crop = CropOffsets {
            top: 1,
            bottom: 2,
            left: 3,
            right: 1,
        };
        assert_eq!(crop.apply(&image).dim(), (7, 4, 3));
    }

    #[test]
    fn identity_stitcher_returns_one_pano_per_layer() {
        let layers = vec![layer(FrameKind::Visible, 2), layer(FrameKind::Mixed, 2)];
        let job = StitchJob::new(layers, FeatureStrategy::Kaze).unwrap();
        let out = IdentityStitcher.stitch(&job).unwrap();
        assert_eq!(out.panoramas.len(), 2);
        assert_eq!(out.panoramas[0].dim(), (2, 2, 3));
    }
}
