use super::cache::ModelOptions;
use crate::error::{PipelineError, Result};
use candle_core::Device;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeviceRequest {
    #[default]
    Cpu,
    Cuda(usize),
}

impl DeviceRequest {
    pub fn resolve(self) -> Result<Device> {
        match self {
            DeviceRequest::Cpu => Ok(Device::Cpu),
            DeviceRequest::Cuda(i) => resolve_cuda(i),
        }
    }
}

#[cfg(feature = "cuda")]
fn resolve_cuda(i: usize) -> Result<Device> {
    use candle_core::backend::BackendDevice;
    use candle_core::CudaDevice;
    use once_cell::sync::Lazy;
    use std::collections::HashMap;
    use std::sync::{Mutex, PoisonError};

    // One CudaDevice per GPU so cached models and fresh inputs share a stream.
    static CUDA_DEVICE_CACHE: Lazy<Mutex<HashMap<usize, CudaDevice>>> =
        Lazy::new(|| Mutex::new(HashMap::new()));

    let mut cache = CUDA_DEVICE_CACHE
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(dev) = cache.get(&i) {
        dev.synchronize().map_err(|e| {
            PipelineError::Device(format!("Failed to sync CUDA device {i}: {e}"))
        })?;
        return Ok(Device::Cuda(dev.clone()));
    }

    let dev = CudaDevice::new_with_stream(i).map_err(|e| {
        PipelineError::Device(format!(
            "Failed to init CUDA device {i}: {e}. Try CPU as fallback."
        ))
    })?;
    cache.insert(i, dev.clone());
    Ok(Device::Cuda(dev))
}

#[cfg(not(feature = "cuda"))]
fn resolve_cuda(i: usize) -> Result<Device> {
    Err(PipelineError::Device(format!(
        "CUDA device {i} requested but this build has no CUDA support. \
         Rebuild with `--features cuda` or use CPU."
    )))
}

macro_rules! impl_device_methods {
    ($builder:ident) => {
        impl $builder {
            /// Use CPU for inference (default).
            pub fn cpu(mut self) -> Self {
                self.device_request = crate::pipelines::utils::DeviceRequest::Cpu;
                self
            }

            /// Use a specific CUDA GPU for inference.
            pub fn cuda(mut self, index: usize) -> Self {
                self.device_request = crate::pipelines::utils::DeviceRequest::Cuda(index);
                self
            }
        }
    };
}

pub(crate) use impl_device_methods;

pub fn build_cache_key<O: ModelOptions>(options: &O, device: &Device) -> String {
    format!("{}-{:?}", options.cache_key(), device.location())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_always_resolves() {
        assert!(matches!(DeviceRequest::Cpu.resolve(), Ok(Device::Cpu)));
    }

    #[cfg(not(feature = "cuda"))]
    #[test]
    fn cuda_without_feature_is_a_device_error() {
        assert!(matches!(
            DeviceRequest::Cuda(0).resolve(),
            Err(PipelineError::Device(_))
        ));
    }
}
