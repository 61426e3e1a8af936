//! GPU accelerator backed by `wgpu`.
//!
//! Adapter and device acquisition block through `pollster`. Validation
//! problems are captured with error scopes and turned into
//! [`AcceleratorError`]s instead of hitting wgpu's uncaptured-error panic.

use super::kernels::{dispatch_grid, BINDINGS, WORKGROUP_SIZE};
use super::{lock, Accelerator, AcceleratorError, BufferHandle, CompiledProgram, CompletionToken, Kernel};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Mutex};
use wgpu::util::DeviceExt;

/// Holds the wgpu device and queue plus every live pipeline and buffer.
pub struct WgpuDevice {
    name: String,
    device: wgpu::Device,
    queue: wgpu::Queue,
    next_id: AtomicU64,
    pipelines: Mutex<HashMap<u64, wgpu::ComputePipeline>>,
    buffers: Mutex<HashMap<u64, wgpu::Buffer>>,
    pending: Mutex<HashSet<u64>>,
}

impl WgpuDevice {
    /// Select the default adapter and create a device + queue.
    ///
    /// # Errors
    /// [`AcceleratorError::Unavailable`] when no adapter or device can be
    /// acquired.
    pub fn new() -> Result<Self, AcceleratorError> {
        let instance = wgpu::Instance::default();
        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
                .map_err(|e| AcceleratorError::Unavailable(format!("adapter: {e}")))?;
        let info = adapter.get_info();

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("reduction-bench"),
            required_features: wgpu::Features::empty(),
            required_limits: adapter.limits(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::default(),
        }))
        .map_err(|e| AcceleratorError::Unavailable(format!("device: {e}")))?;

        log::info!("wgpu: using {} ({:?})", info.name, info.backend);

        Ok(Self {
            name: format!("wgpu/{}", info.name),
            device,
            queue,
            next_id: AtomicU64::new(1),
            pipelines: Mutex::new(HashMap::new()),
            buffers: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashSet::new()),
        })
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn validation_error(&self) -> Option<String> {
        pollster::block_on(self.device.pop_error_scope()).map(|e| e.to_string())
    }

    fn wait_idle(&self) -> Result<(), String> {
        self.device
            .poll(wgpu::PollType::Wait)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

impl Accelerator for WgpuDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_workgroup_size(&self) -> u32 {
        // The WGSL sources fix the workgroup width at compile time.
        WORKGROUP_SIZE.min(self.device.limits().max_compute_invocations_per_workgroup)
    }

    fn compile(&self, kernel: &Kernel) -> Result<CompiledProgram, AcceleratorError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(kernel.entry_point),
            source: wgpu::ShaderSource::Wgsl(kernel.source.into()),
        });
        let pipeline = self.device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(kernel.entry_point),
            layout: None,
            module: &module,
            entry_point: Some(kernel.entry_point),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });
        if let Some(reason) = self.validation_error() {
            return Err(AcceleratorError::Compile {
                entry_point: kernel.entry_point.to_string(),
                reason,
            });
        }

        let id = self.next_id();
        lock(&self.pipelines).insert(id, pipeline);
        Ok(CompiledProgram::new(id, kernel.entry_point))
    }

    fn allocate_buffer(
        &self,
        size_bytes: usize,
        host_data: Option<&[u8]>,
    ) -> Result<BufferHandle, AcceleratorError> {
        let limits = self.device.limits();
        let limit = u64::from(limits.max_storage_buffer_binding_size).min(limits.max_buffer_size);
        if size_bytes as u64 > limit {
            return Err(AcceleratorError::Allocate {
                size_bytes,
                reason: format!("exceeds storage binding limit of {limit} bytes"),
            });
        }

        let usage = wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST;
        let buffer = match host_data {
            Some(data) if data.len() != size_bytes => {
                return Err(AcceleratorError::Allocate {
                    size_bytes,
                    reason: format!("host data is {} bytes", data.len()),
                });
            }
            Some(data) => self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("input"),
                contents: data,
                usage,
            }),
            None => self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("output"),
                size: size_bytes as u64,
                usage,
                mapped_at_creation: false,
            }),
        };

        let id = self.next_id();
        lock(&self.buffers).insert(id, buffer);
        Ok(BufferHandle::new(id, size_bytes))
    }

    fn dispatch(
        &self,
        program: &CompiledProgram,
        buffers: &[&BufferHandle],
        workgroup_size: u32,
    ) -> Result<CompletionToken, AcceleratorError> {
        if workgroup_size == 0 || workgroup_size > WORKGROUP_SIZE {
            return Err(AcceleratorError::Dispatch(format!(
                "workgroup size {workgroup_size} outside 1..={WORKGROUP_SIZE}"
            )));
        }
        let Some(out) = buffers.last() else {
            return Err(AcceleratorError::Dispatch("no buffers bound".to_string()));
        };
        if buffers.len() != BINDINGS {
            return Err(AcceleratorError::Dispatch(format!(
                "expected {BINDINGS} bindings, got {}",
                buffers.len()
            )));
        }

        let (groups_x, groups_y) =
            dispatch_grid(out.elements(), self.device.limits().max_compute_workgroups_per_dimension)
                .ok_or_else(|| {
                    AcceleratorError::Dispatch(format!("{} elements need too many workgroups", out.elements()))
                })?;

        let pipelines = lock(&self.pipelines);
        let pipeline = pipelines.get(&program.id()).ok_or(AcceleratorError::UnknownHandle {
            kind: "program",
            id: program.id(),
        })?;
        let table = lock(&self.buffers);
        let entries = buffers
            .iter()
            .enumerate()
            .map(|(binding, handle)| {
                let buffer = table.get(&handle.id()).ok_or(AcceleratorError::UnknownHandle {
                    kind: "buffer",
                    id: handle.id(),
                })?;
                Ok(wgpu::BindGroupEntry {
                    binding: binding as u32,
                    resource: buffer.as_entire_binding(),
                })
            })
            .collect::<Result<Vec<_>, AcceleratorError>>()?;

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(program.entry_point()),
            layout: &pipeline.get_bind_group_layout(0),
            entries: &entries,
        });

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(program.entry_point()),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(program.entry_point()),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }
        self.queue.submit(Some(encoder.finish()));
        if let Some(reason) = self.validation_error() {
            return Err(AcceleratorError::Dispatch(reason));
        }

        let id = self.next_id();
        lock(&self.pending).insert(id);
        Ok(CompletionToken::new(id))
    }

    fn await_completion(&self, token: CompletionToken) -> Result<(), AcceleratorError> {
        if !lock(&self.pending).remove(&token.id()) {
            return Err(AcceleratorError::UnknownHandle {
                kind: "completion",
                id: token.id(),
            });
        }
        self.wait_idle().map_err(AcceleratorError::Await)
    }

    fn read_buffer(&self, handle: &BufferHandle) -> Result<Vec<u8>, AcceleratorError> {
        let size = handle.size_bytes() as u64;
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("staging"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        {
            let table = lock(&self.buffers);
            let source = table.get(&handle.id()).ok_or(AcceleratorError::UnknownHandle {
                kind: "buffer",
                id: handle.id(),
            })?;
            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("read") });
            encoder.copy_buffer_to_buffer(source, 0, &staging, 0, size);
            self.queue.submit(Some(encoder.finish()));
        }

        let slice = staging.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.wait_idle().map_err(AcceleratorError::Read)?;
        rx.recv()
            .map_err(|e| AcceleratorError::Read(e.to_string()))?
            .map_err(|e| AcceleratorError::Read(e.to_string()))?;

        let bytes = slice.get_mapped_range().to_vec();
        staging.unmap();
        Ok(bytes)
    }

    fn release_buffer(&self, handle: &BufferHandle) -> Result<(), AcceleratorError> {
        let buffer = lock(&self.buffers)
            .remove(&handle.id())
            .ok_or(AcceleratorError::UnknownHandle {
                kind: "buffer",
                id: handle.id(),
            })?;
        buffer.destroy();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::{kernels, run_elementwise};
    use crate::math::dot_product::{dot_product_sequential, AcceleratorReduction, ReductionStrategy};
    use crate::utils::generator::VectorGenerator;
    use std::sync::Arc;

    /// `None` on machines without a usable adapter.
    fn device() -> Option<WgpuDevice> {
        match WgpuDevice::new() {
            Ok(device) => Some(device),
            Err(AcceleratorError::Unavailable(reason)) => {
                eprintln!("skipping, no wgpu adapter: {reason}");
                None
            }
            Err(e) => panic!("unexpected device error: {e}"),
        }
    }

    // Needs more workgroups than fit in one grid dimension
    const LARGE: usize = 4_194_240 * 2 + 17;

    #[test]
    fn test_large_vector_add_matches_host() {
        let Some(device) = device() else { return };
        let inputs = VectorGenerator::new(31).pair(LARGE);
        let program = device.compile(&kernels::VECTOR_ADD).unwrap();

        let out = run_elementwise(&device, &program, inputs.a(), inputs.b()).unwrap();
        assert_eq!(out.len(), LARGE);
        for (i, value) in out.iter().enumerate() {
            assert_eq!(*value, inputs.a()[i] + inputs.b()[i], "element {i}");
        }
    }

    #[test]
    fn test_large_dot_product_matches_sequential() {
        let Some(device) = device() else { return };
        let strategy = AcceleratorReduction::new(Arc::new(device));
        let inputs = VectorGenerator::new(32).pair(LARGE);

        let expected = dot_product_sequential(inputs.a(), inputs.b()).unwrap();
        let got = strategy.reduce(inputs.a(), inputs.b()).unwrap();
        assert!(
            (got - expected).abs() <= 1e-4 * expected.abs(),
            "expected {expected}, got {got} on {}",
            strategy.device_name()
        );
    }
}
