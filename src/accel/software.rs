//! Host-emulated accelerator.
//!
//! Buffers live in host memory, a dispatch runs on its own background
//! thread workgroup by workgroup, and `await_completion` joins that
//! thread, which gives the same submit-then-wait shape as a real command
//! queue without any GPU.

use super::kernels::{KernelOp, BINDINGS};
use super::{lock, Accelerator, AcceleratorError, BufferHandle, CompiledProgram, CompletionToken, Kernel};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

type BufferTable = Arc<Mutex<HashMap<u64, Vec<u8>>>>;

/// Default workgroup limit, in line with common desktop GPUs
pub const DEFAULT_MAX_WORKGROUP: u32 = 256;

pub struct SoftwareDevice {
    max_workgroup_size: u32,
    next_id: AtomicU64,
    programs: Mutex<HashMap<u64, KernelOp>>,
    buffers: BufferTable,
    pending: Mutex<HashMap<u64, JoinHandle<Result<(), AcceleratorError>>>>,
}

impl SoftwareDevice {
    pub fn new() -> Self {
        Self::with_max_workgroup(DEFAULT_MAX_WORKGROUP)
    }

    pub fn with_max_workgroup(max_workgroup_size: u32) -> Self {
        Self {
            max_workgroup_size,
            next_id: AtomicU64::new(1),
            programs: Mutex::new(HashMap::new()),
            buffers: Arc::new(Mutex::new(HashMap::new())),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Buffers allocated and not yet released
    pub fn live_buffers(&self) -> usize {
        lock(&self.buffers).len()
    }

    pub fn compiled_programs(&self) -> usize {
        lock(&self.programs).len()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for SoftwareDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Accelerator for SoftwareDevice {
    fn name(&self) -> &str {
        "software"
    }

    fn max_workgroup_size(&self) -> u32 {
        self.max_workgroup_size
    }

    fn compile(&self, kernel: &Kernel) -> Result<CompiledProgram, AcceleratorError> {
        let signature = format!("fn {}(", kernel.entry_point);
        if !kernel.source.contains(&signature) {
            return Err(AcceleratorError::Compile {
                entry_point: kernel.entry_point.to_string(),
                reason: "entry point not found in source".to_string(),
            });
        }

        let id = self.next_id();
        lock(&self.programs).insert(id, kernel.op);
        log::trace!("software: compiled '{}' as program {}", kernel.entry_point, id);
        Ok(CompiledProgram::new(id, kernel.entry_point))
    }

    fn allocate_buffer(
        &self,
        size_bytes: usize,
        host_data: Option<&[u8]>,
    ) -> Result<BufferHandle, AcceleratorError> {
        let contents = match host_data {
            Some(data) if data.len() != size_bytes => {
                return Err(AcceleratorError::Allocate {
                    size_bytes,
                    reason: format!("host data is {} bytes", data.len()),
                });
            }
            Some(data) => data.to_vec(),
            None => vec![0; size_bytes],
        };

        let id = self.next_id();
        lock(&self.buffers).insert(id, contents);
        Ok(BufferHandle::new(id, size_bytes))
    }

    fn dispatch(
        &self,
        program: &CompiledProgram,
        buffers: &[&BufferHandle],
        workgroup_size: u32,
    ) -> Result<CompletionToken, AcceleratorError> {
        let op = *lock(&self.programs)
            .get(&program.id())
            .ok_or(AcceleratorError::UnknownHandle {
                kind: "program",
                id: program.id(),
            })?;

        if workgroup_size == 0 || workgroup_size > self.max_workgroup_size {
            return Err(AcceleratorError::Dispatch(format!(
                "workgroup size {} outside 1..={}",
                workgroup_size, self.max_workgroup_size
            )));
        }
        let [a, b, out] = buffers else {
            return Err(AcceleratorError::Dispatch(format!(
                "expected {} bindings, got {}",
                BINDINGS,
                buffers.len()
            )));
        };

        if out.size_bytes() % std::mem::size_of::<f32>() != 0 {
            return Err(AcceleratorError::Dispatch(format!(
                "output buffer {} is not a whole number of f32 values",
                out.id()
            )));
        }
        let elements = out.elements();
        let (a, b, out_id) = {
            let table = lock(&self.buffers);
            let fetch = |handle: &BufferHandle| -> Result<Vec<f32>, AcceleratorError> {
                let bytes = table.get(&handle.id()).ok_or(AcceleratorError::UnknownHandle {
                    kind: "buffer",
                    id: handle.id(),
                })?;
                let values = super::bytes_to_f32(bytes)?;
                if values.len() < elements {
                    return Err(AcceleratorError::Dispatch(format!(
                        "input buffer {} holds {} values, dispatch needs {}",
                        handle.id(),
                        values.len(),
                        elements
                    )));
                }
                Ok(values)
            };
            if !table.contains_key(&out.id()) {
                return Err(AcceleratorError::UnknownHandle {
                    kind: "buffer",
                    id: out.id(),
                });
            }
            (fetch(*a)?, fetch(*b)?, out.id())
        };

        let table = Arc::clone(&self.buffers);
        let group = workgroup_size as usize;
        let job = thread::spawn(move || -> Result<(), AcceleratorError> {
            let mut result = vec![0.0_f32; elements];
            for start in (0..elements).step_by(group) {
                let end = (start + group).min(elements);
                for i in start..end {
                    result[i] = op.apply(a[i], b[i]);
                }
            }

            let mut table = lock(&table);
            let target = table.get_mut(&out_id).ok_or_else(|| {
                AcceleratorError::Await(format!("output buffer {} released before completion", out_id))
            })?;
            target.copy_from_slice(bytemuck::cast_slice::<f32, u8>(&result));
            Ok(())
        });

        let id = self.next_id();
        lock(&self.pending).insert(id, job);
        Ok(CompletionToken::new(id))
    }

    fn await_completion(&self, token: CompletionToken) -> Result<(), AcceleratorError> {
        let job = lock(&self.pending)
            .remove(&token.id())
            .ok_or(AcceleratorError::UnknownHandle {
                kind: "completion",
                id: token.id(),
            })?;
        job.join()
            .map_err(|_| AcceleratorError::Await("device thread panicked".to_string()))?
    }

    fn read_buffer(&self, handle: &BufferHandle) -> Result<Vec<u8>, AcceleratorError> {
        lock(&self.buffers)
            .get(&handle.id())
            .cloned()
            .ok_or(AcceleratorError::UnknownHandle {
                kind: "buffer",
                id: handle.id(),
            })
    }

    fn release_buffer(&self, handle: &BufferHandle) -> Result<(), AcceleratorError> {
        lock(&self.buffers)
            .remove(&handle.id())
            .map(|_| ())
            .ok_or(AcceleratorError::UnknownHandle {
                kind: "buffer",
                id: handle.id(),
            })
    }
}
