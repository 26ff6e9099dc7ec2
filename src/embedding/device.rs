use candle_core::Device;
use tracing::{info, warn};

use super::error::EmbeddingError;

/// Picks the compute device for the image model.
///
/// With `force_cpu` set, or when no GPU backend is compiled in, this is the CPU.
/// Otherwise Metal is tried before CUDA; any GPU failure falls back to the CPU.
pub fn select_device(force_cpu: bool) -> Result<Device, EmbeddingError> {
    if force_cpu {
        info!("CPU device forced by configuration");
        return Ok(Device::Cpu);
    }

    #[cfg_attr(not(any(feature = "metal", feature = "cuda")), allow(unused_mut))]
    let mut failures: Vec<String> = Vec::new();

    #[cfg(feature = "metal")]
    match Device::new_metal(0) {
        Ok(device) => {
            info!("Image embedder using Metal");
            return Ok(device);
        }
        Err(e) => {
            warn!(error = %e, "Metal device unavailable");
            failures.push(format!("metal: {e}"));
        }
    }

    #[cfg(feature = "cuda")]
    match Device::new_cuda(0) {
        Ok(device) => {
            info!("Image embedder using CUDA");
            return Ok(device);
        }
        Err(e) => {
            warn!(error = %e, "CUDA device unavailable");
            failures.push(format!("cuda: {e}"));
        }
    }

    if cfg!(any(feature = "metal", feature = "cuda")) {
        warn!(reason = %failures.join("; "), "Falling back to CPU device");
    } else {
        info!("No GPU backend compiled, using CPU device");
    }
    Ok(Device::Cpu)
}
