use super::ElementwiseStrategy;
use crate::accel::{kernels, run_elementwise, Accelerator, CachedProgram};
use crate::error::{ensure_same_len, Result};
use std::sync::Arc;

/// Vector add run entirely on the device; the host only reads the result.
pub struct AcceleratorAdd {
    device: Arc<dyn Accelerator>,
    program: CachedProgram,
}

impl AcceleratorAdd {
    pub fn new(device: Arc<dyn Accelerator>) -> Self {
        Self {
            device,
            program: CachedProgram::new(kernels::VECTOR_ADD),
        }
    }
}

impl ElementwiseStrategy for AcceleratorAdd {
    fn name(&self) -> &'static str {
        "accelerator"
    }

    fn description(&self) -> &'static str {
        "Elementwise add kernel on the compute device"
    }

    fn apply(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
        ensure_same_len(a, b)?;
        if a.is_empty() {
            return Ok(Vec::new());
        }

        let device = self.device.as_ref();
        let program = self.program.get_or_compile(device)?;
        Ok(run_elementwise(device, &program, a, b)?)
    }
}
