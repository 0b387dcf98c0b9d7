//! Optional device synchronization barrier
//!
//! Timestamps taken while asynchronous device work is still in flight only
//! measure host-side dispatch latency. When a barrier capability is present
//! and the caller opts in, the timer issues a blocking synchronization
//! immediately before every timestamp capture so elapsed time covers the
//! device-side work to completion. Absence of a capability is never an
//! error; it only disables the behavior.

use anyhow::Result;

/// Blocking "wait for outstanding device work" capability
pub trait DeviceBarrier: Send {
    /// Block until all outstanding device work has completed
    fn synchronize(&self) -> Result<()>;

    /// Short backend name for log output
    fn backend(&self) -> &'static str;
}

/// Detect the device synchronization capability for this process
///
/// Returns `None` when no backend is compiled in or the device cannot be
/// initialized; both simply leave sync-before-timestamp disabled.
pub fn detect() -> Option<Box<dyn DeviceBarrier>> {
    #[cfg(feature = "cuda-sync")]
    {
        match cuda::CudaBarrier::new() {
            Ok(barrier) => {
                tracing::debug!("CUDA device barrier available");
                return Some(Box::new(barrier));
            }
            Err(err) => {
                tracing::debug!("CUDA device unavailable: {err:#}");
            }
        }
    }
    None
}

#[cfg(feature = "cuda-sync")]
mod cuda {
    use super::DeviceBarrier;
    use anyhow::{Context, Result};
    use cudarc::driver::CudaContext;
    use std::sync::Arc;

    /// Barrier over the primary CUDA device
    pub struct CudaBarrier {
        context: Arc<CudaContext>,
    }

    impl CudaBarrier {
        pub fn new() -> Result<Self> {
            let context = CudaContext::new(0).context("failed to initialize CUDA device 0")?;
            Ok(Self { context })
        }
    }

    impl DeviceBarrier for CudaBarrier {
        fn synchronize(&self) -> Result<()> {
            self.context
                .synchronize()
                .context("CUDA device synchronization failed")
        }

        fn backend(&self) -> &'static str {
            "cuda"
        }
    }
}
