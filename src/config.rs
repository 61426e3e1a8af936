//! Validated run configuration.

use crate::accel::{Accelerator, SoftwareDevice};
use crate::error::{BenchError, PreconditionViolation, Result};
use crate::utils::timer::TimingConfig;
use std::path::PathBuf;
use std::sync::Arc;

/// Compute device behind the accelerator strategies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    /// Host-emulated device, always available
    #[default]
    Software,
    /// GPU through wgpu (requires the `wgpu` feature)
    Wgpu,
}

impl Backend {
    /// Open the device.
    ///
    /// # Errors
    /// [`BenchError::Config`] when the backend was not compiled in, or the
    /// accelerator error raised while acquiring the device.
    pub fn create(self) -> Result<Arc<dyn Accelerator>> {
        match self {
            Backend::Software => Ok(Arc::new(SoftwareDevice::new())),
            #[cfg(feature = "wgpu")]
            Backend::Wgpu => Ok(Arc::new(crate::accel::WgpuDevice::new()?)),
            #[cfg(not(feature = "wgpu"))]
            Backend::Wgpu => Err(BenchError::Config(
                "the wgpu backend requires building with `--features wgpu`".to_string(),
            )),
        }
    }
}

/// Everything one invocation of the harness needs.
#[derive(Clone, Debug)]
pub struct BenchConfig {
    /// Number of elements per input vector
    pub size: usize,
    /// Worker count of the chunked-parallel strategies
    pub workers: usize,
    /// Generator seed; time-based when `None`
    pub seed: Option<u64>,
    pub algorithm: String,
    pub backend: Backend,
    /// Timed runs per strategy; `1` prints single timings, more prints statistics
    pub runs: usize,
    /// Untimed runs per strategy before sampling (multi-run only)
    pub warmup: usize,
    /// Where to export multi-run statistics
    pub csv: Option<PathBuf>,
    pub verify: bool,
    pub list: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            size: 10,
            workers: 200,
            seed: None,
            algorithm: "dot_product".to_string(),
            backend: Backend::Software,
            runs: 1,
            warmup: 2,
            csv: None,
            verify: false,
            list: false,
        }
    }
}

impl BenchConfig {
    /// Reject combinations the runner cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(PreconditionViolation::NoWorkers.into());
        }
        if self.runs == 0 {
            return Err(BenchError::Config("--runs must be at least 1".to_string()));
        }
        if self.csv.is_some() && self.runs < 2 {
            return Err(BenchError::Config(
                "--csv exports multi-run statistics; pass --runs 2 or more".to_string(),
            ));
        }
        Ok(())
    }

    /// Measurement settings for multi-run mode.
    pub fn timing(&self) -> TimingConfig {
        TimingConfig {
            runs_per_variant: self.runs,
            warmup_iterations: self.warmup,
            schedule_seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = BenchConfig::default();
        assert_eq!(config.size, 10);
        assert_eq!(config.workers, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_combinations() {
        let zero_workers = BenchConfig {
            workers: 0,
            ..Default::default()
        };
        assert!(zero_workers.validate().unwrap_err().is_precondition());

        let zero_runs = BenchConfig {
            runs: 0,
            ..Default::default()
        };
        assert!(matches!(zero_runs.validate(), Err(BenchError::Config(_))));

        let csv_single = BenchConfig {
            csv: Some(PathBuf::from("out.csv")),
            ..Default::default()
        };
        assert!(matches!(csv_single.validate(), Err(BenchError::Config(_))));
    }

    #[test]
    fn test_timing_config() {
        let config = BenchConfig {
            runs: 5,
            warmup: 1,
            seed: Some(9),
            ..Default::default()
        };
        let timing = config.timing();
        assert_eq!(timing.runs_per_variant, 5);
        assert_eq!(timing.warmup_iterations, 1);
        assert_eq!(timing.schedule_seed, Some(9));
    }

    #[test]
    fn test_software_backend_always_available() {
        let device = Backend::Software.create().unwrap();
        assert!(device.max_workgroup_size() >= 1);
    }

    #[cfg(not(feature = "wgpu"))]
    #[test]
    fn test_wgpu_backend_needs_feature() {
        assert!(matches!(Backend::Wgpu.create(), Err(BenchError::Config(_))));
    }
}
