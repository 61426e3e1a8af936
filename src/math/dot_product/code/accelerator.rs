//! Dot product offloaded to an [`Accelerator`].
//!
//! The device computes the elementwise products; the host reads them back
//! and sums them in index order.

use super::ReductionStrategy;
use crate::accel::{kernels, run_elementwise, Accelerator, CachedProgram};
use crate::error::{ensure_same_len, Result};
use std::sync::Arc;

pub struct AcceleratorReduction {
    device: Arc<dyn Accelerator>,
    program: CachedProgram,
}

impl AcceleratorReduction {
    pub fn new(device: Arc<dyn Accelerator>) -> Self {
        Self {
            device,
            program: CachedProgram::new(kernels::DOT_PRODUCT),
        }
    }

    pub fn device_name(&self) -> &str {
        self.device.name()
    }
}

impl ReductionStrategy for AcceleratorReduction {
    fn name(&self) -> &'static str {
        "accelerator"
    }

    fn description(&self) -> &'static str {
        "Device computes products, host sums them"
    }

    fn reduce(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        ensure_same_len(a, b)?;
        if a.is_empty() {
            return Ok(0.0);
        }

        let device = self.device.as_ref();
        let program = self.program.get_or_compile(device)?;
        let products = run_elementwise(device, &program, a, b)?;
        Ok(products.iter().fold(0.0, |acc, p| acc + p))
    }
}
