//! CLIP ViT-B/32 vision tower and a deterministic stub.

use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::clip::{ClipConfig, ClipModel};
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use tracing::{debug, info, warn};

use super::config::{CLIP_EMBEDDING_DIM, CLIP_IMAGE_SIZE, EmbedderConfig, STUB_EMBEDDING_DIM};
use super::device::select_device;
use super::error::EmbeddingError;
use crate::image::NormalizedImage;

const STUB_SIDE: u32 = 16;

enum EmbedderBackend {
    Clip { model: ClipModel, device: Device },
    Stub,
}

/// Turns a [`NormalizedImage`] into an L2-normalized embedding vector.
///
/// Inference is synchronous and CPU/GPU-bound; use [`super::LazyEmbedder`] from async code.
pub struct ImageEmbedder {
    backend: EmbedderBackend,
}

impl std::fmt::Debug for ImageEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backend = match &self.backend {
            EmbedderBackend::Clip { device, .. } => format!("Clip({device:?})"),
            EmbedderBackend::Stub => "Stub".to_string(),
        };
        f.debug_struct("ImageEmbedder")
            .field("backend", &backend)
            .field("dimension", &self.dimension())
            .finish()
    }
}

impl ImageEmbedder {
    /// Loads the CLIP weights named by `config`, or the stub if none are configured.
    pub fn load(config: EmbedderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        let Some(model_path) = config.model_path.as_deref() else {
            warn!("Image embedder running in STUB mode (no model path configured)");
            return Ok(Self::stub());
        };

        let device = select_device(config.force_cpu)?;
        debug!(?device, "Selected compute device for CLIP");

        let model = Self::load_clip(model_path, &device)?;
        info!(model_path = %model_path.display(), "CLIP vision model loaded");

        Ok(Self {
            backend: EmbedderBackend::Clip { model, device },
        })
    }

    pub fn stub() -> Self {
        Self {
            backend: EmbedderBackend::Stub,
        }
    }

    fn load_clip(path: &Path, device: &Device) -> Result<ClipModel, EmbeddingError> {
        let config = ClipConfig::vit_base_patch32();
        // SAFETY: the weights file is mapped read-only and must not change while loaded.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[path], DType::F32, device) }
            .map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: e.to_string(),
            })?;
        ClipModel::new(vb, &config).map_err(|e| EmbeddingError::ModelLoadFailed {
            reason: format!("failed to build CLIP model: {e}"),
        })
    }

    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EmbedderBackend::Stub)
    }

    /// Embedding length produced by this backend.
    pub fn dimension(&self) -> usize {
        match &self.backend {
            EmbedderBackend::Clip { .. } => CLIP_EMBEDDING_DIM,
            EmbedderBackend::Stub => STUB_EMBEDDING_DIM,
        }
    }

    pub fn embed(&self, image: &NormalizedImage) -> Result<Vec<f32>, EmbeddingError> {
        let rgb = image.to_rgb().map_err(|e| EmbeddingError::InvalidImage {
            reason: e.to_string(),
        })?;

        match &self.backend {
            EmbedderBackend::Clip { model, device } => embed_clip(model, device, rgb),
            EmbedderBackend::Stub => Ok(embed_stub(rgb)),
        }
    }
}

fn embed_clip(model: &ClipModel, device: &Device, rgb: RgbImage) -> Result<Vec<f32>, EmbeddingError> {
    let side = CLIP_IMAGE_SIZE as u32;
    let resized = DynamicImage::ImageRgb8(rgb)
        .resize_to_fill(side, side, FilterType::Triangle)
        .to_rgb8();

    let pixels = Tensor::from_vec(
        resized.into_raw(),
        (CLIP_IMAGE_SIZE, CLIP_IMAGE_SIZE, 3),
        device,
    )?
    .permute((2, 0, 1))?
    .to_dtype(DType::F32)?
    .affine(2. / 255., -1.)?
    .unsqueeze(0)?;

    let features = model.get_image_features(&pixels)?;
    let norm = features.sqr()?.sum_keepdim(1)?.sqrt()?;
    let normalized = features.broadcast_div(&norm)?;
    Ok(normalized.squeeze(0)?.to_vec1::<f32>()?)
}

/// 16x16 grayscale thumbnail, mean-centred and L2-normalized.
///
/// A flat image has no signal after centring and maps to the constant unit vector.
fn embed_stub(rgb: RgbImage) -> Vec<f32> {
    let gray = DynamicImage::ImageRgb8(rgb)
        .resize_exact(STUB_SIDE, STUB_SIDE, FilterType::Triangle)
        .to_luma8();

    let values: Vec<f32> = gray.pixels().map(|p| f32::from(p.0[0]) / 255.0).collect();
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    let centred: Vec<f32> = values.iter().map(|v| v - mean).collect();
    let norm = centred.iter().map(|v| v * v).sum::<f32>().sqrt();

    if norm < 1e-4 {
        let constant = 1.0 / (centred.len() as f32).sqrt();
        return vec![constant; centred.len()];
    }
    centred.into_iter().map(|v| v / norm).collect()
}
