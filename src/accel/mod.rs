//! Accelerator boundary.
//!
//! The benchmark harness never talks to a vendor API directly. Anything
//! that can compile a kernel, hold buffers, dispatch and hand results back
//! synchronously implements [`Accelerator`]:
//!
//! ```text
//! compile ─► allocate inputs/output ─► dispatch ─► await ─► read ─► release
//! ```
//!
//! Two backends ship with the crate: [`SoftwareDevice`], which emulates a
//! device on a background host thread, and `WgpuDevice` (feature `wgpu`).

pub mod kernels;
pub mod software;
#[cfg(feature = "wgpu")]
pub mod wgpu_device;

pub use kernels::{Kernel, KernelOp};
pub use software::SoftwareDevice;
#[cfg(feature = "wgpu")]
pub use wgpu_device::WgpuDevice;

use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Failure at any stage of the accelerator pipeline. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcceleratorError {
    #[error("no accelerator available: {0}")]
    Unavailable(String),

    #[error("kernel '{entry_point}' failed to compile: {reason}")]
    Compile { entry_point: String, reason: String },

    #[error("allocation of {size_bytes} bytes failed: {reason}")]
    Allocate { size_bytes: usize, reason: String },

    #[error("dispatch failed: {0}")]
    Dispatch(String),

    #[error("waiting for completion failed: {0}")]
    Await(String),

    #[error("buffer read failed: {0}")]
    Read(String),

    #[error("unknown {kind} handle {id}")]
    UnknownHandle { kind: &'static str, id: u64 },
}

/// A kernel compiled for one particular device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledProgram {
    id: u64,
    entry_point: &'static str,
}

impl CompiledProgram {
    pub fn new(id: u64, entry_point: &'static str) -> Self {
        Self { id, entry_point }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn entry_point(&self) -> &'static str {
        self.entry_point
    }
}

/// Device-side buffer owned by a backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BufferHandle {
    id: u64,
    size_bytes: usize,
}

impl BufferHandle {
    pub fn new(id: u64, size_bytes: usize) -> Self {
        Self { id, size_bytes }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Number of `f32` elements the buffer holds
    pub fn elements(&self) -> usize {
        self.size_bytes / std::mem::size_of::<f32>()
    }
}

/// Proof of submission, redeemed by [`Accelerator::await_completion`].
#[derive(Debug, PartialEq, Eq)]
pub struct CompletionToken {
    id: u64,
}

impl CompletionToken {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Synchronous compute device.
///
/// Kernels bind their inputs first and their output last; one invocation
/// runs per output element.
pub trait Accelerator: Send + Sync {
    /// Human-readable device name
    fn name(&self) -> &str;

    /// Largest workgroup the device accepts
    fn max_workgroup_size(&self) -> u32;

    fn compile(&self, kernel: &Kernel) -> Result<CompiledProgram, AcceleratorError>;

    /// Allocate `size_bytes`, optionally initialised from `host_data`.
    fn allocate_buffer(
        &self,
        size_bytes: usize,
        host_data: Option<&[u8]>,
    ) -> Result<BufferHandle, AcceleratorError>;

    /// Submit the program; returns immediately.
    fn dispatch(
        &self,
        program: &CompiledProgram,
        buffers: &[&BufferHandle],
        workgroup_size: u32,
    ) -> Result<CompletionToken, AcceleratorError>;

    /// Block until the submission behind `token` has finished.
    fn await_completion(&self, token: CompletionToken) -> Result<(), AcceleratorError>;

    fn read_buffer(&self, handle: &BufferHandle) -> Result<Vec<u8>, AcceleratorError>;

    fn release_buffer(&self, handle: &BufferHandle) -> Result<(), AcceleratorError>;
}

/// Bytes needed to hold `elements` values of `f32`.
pub fn buffer_size_bytes(elements: usize) -> usize {
    elements * std::mem::size_of::<f32>()
}

/// Decode a device read-back into `f32` values.
pub fn bytes_to_f32(bytes: &[u8]) -> Result<Vec<f32>, AcceleratorError> {
    if bytes.len() % std::mem::size_of::<f32>() != 0 {
        return Err(AcceleratorError::Read(format!(
            "{} bytes is not a whole number of f32 values",
            bytes.len()
        )));
    }
    Ok(bytemuck::allocation::pod_collect_to_vec(bytes))
}

/// Releases a device buffer when dropped, even on early error returns.
struct BufferGuard<'a> {
    device: &'a dyn Accelerator,
    handle: BufferHandle,
}

impl<'a> BufferGuard<'a> {
    fn allocate(
        device: &'a dyn Accelerator,
        elements: usize,
        host_data: Option<&[f32]>,
    ) -> Result<Self, AcceleratorError> {
        let handle = device.allocate_buffer(
            buffer_size_bytes(elements),
            host_data.map(|data| bytemuck::cast_slice::<f32, u8>(data)),
        )?;
        Ok(Self { device, handle })
    }
}

impl Drop for BufferGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.device.release_buffer(&self.handle) {
            log::warn!("failed to release buffer {}: {}", self.handle.id(), e);
        }
    }
}

/// Lazily compiled program, compiled at most once per strategy.
pub struct CachedProgram {
    kernel: Kernel,
    program: Mutex<Option<CompiledProgram>>,
}

impl CachedProgram {
    pub fn new(kernel: Kernel) -> Self {
        Self {
            kernel,
            program: Mutex::new(None),
        }
    }

    /// Return the cached program, compiling it on first use.
    pub fn get_or_compile(&self, device: &dyn Accelerator) -> Result<CompiledProgram, AcceleratorError> {
        let mut slot = lock(&self.program);
        if let Some(program) = slot.as_ref() {
            return Ok(program.clone());
        }
        log::debug!("compiling kernel '{}' on {}", self.kernel.entry_point, device.name());
        let program = device.compile(&self.kernel)?;
        *slot = Some(program.clone());
        Ok(program)
    }
}

/// Run a two-input elementwise program and read its output back.
///
/// Strict sequence: allocate `a`, `b` and the output, dispatch, await,
/// read. All three buffers are released before returning.
pub fn run_elementwise(
    device: &dyn Accelerator,
    program: &CompiledProgram,
    a: &[f32],
    b: &[f32],
) -> Result<Vec<f32>, AcceleratorError> {
    let n = a.len();
    let input_a = BufferGuard::allocate(device, n, Some(a))?;
    let input_b = BufferGuard::allocate(device, n, Some(b))?;
    let output = BufferGuard::allocate(device, n, None)?;

    let max_group = usize::try_from(device.max_workgroup_size()).unwrap_or(usize::MAX);
    let workgroup_size = u32::try_from(max_group.min(n)).unwrap_or(u32::MAX);

    log::trace!(
        "dispatching '{}' on {}: {} elements, workgroup {}",
        program.entry_point(),
        device.name(),
        n,
        workgroup_size
    );
    let token = device.dispatch(
        program,
        &[&input_a.handle, &input_b.handle, &output.handle],
        workgroup_size,
    )?;
    device.await_completion(token)?;

    let values = bytes_to_f32(&device.read_buffer(&output.handle)?)?;
    if values.len() != n {
        return Err(AcceleratorError::Read(format!(
            "expected {} values, device returned {}",
            n,
            values.len()
        )));
    }
    Ok(values)
}

/// Lock a mutex, recovering the data if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_size_is_element_bytes() {
        assert_eq!(buffer_size_bytes(0), 0);
        assert_eq!(buffer_size_bytes(10), 40);
        assert_eq!(BufferHandle::new(1, 40).elements(), 10);
    }

    #[test]
    fn test_bytes_to_f32_rejects_partial_values() {
        assert!(matches!(bytes_to_f32(&[0, 0, 0]), Err(AcceleratorError::Read(_))));
        let values = bytes_to_f32(bytemuck::cast_slice(&[1.5_f32, -2.0])).unwrap();
        assert_eq!(values, vec![1.5, -2.0]);
    }

    #[test]
    fn test_program_compiled_once() {
        let device = SoftwareDevice::new();
        let cache = CachedProgram::new(kernels::DOT_PRODUCT);
        let first = cache.get_or_compile(&device).unwrap();
        let second = cache.get_or_compile(&device).unwrap();
        assert_eq!(first, second);
        assert_eq!(device.compiled_programs(), 1);
    }

    #[test]
    fn test_run_elementwise_releases_buffers() {
        let device = SoftwareDevice::new();
        let program = device.compile(&kernels::VECTOR_ADD).unwrap();
        let out = run_elementwise(&device, &program, &[1.0, 2.0], &[3.0, 4.0]).unwrap();
        assert_eq!(out, vec![4.0, 6.0]);
        assert_eq!(device.live_buffers(), 0);
    }
}
