//! Compute kernels shipped with the crate.
//!
//! Sources are WGSL. Every kernel binds `a` at 0, `b` at 1 and the output
//! at 2, and guards against invocations past the end of the output.
//! Invocations are laid out on a 2-D grid of workgroups (see
//! [`dispatch_grid`]) and flattened row by row.

/// Host-side meaning of a kernel, used by backends that emulate execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KernelOp {
    /// `out[i] = a[i] * b[i]`
    Multiply,
    /// `out[i] = a[i] + b[i]`
    Add,
}

impl KernelOp {
    #[inline]
    pub fn apply(self, x: f32, y: f32) -> f32 {
        match self {
            KernelOp::Multiply => x * y,
            KernelOp::Add => x + y,
        }
    }
}

/// Kernel source plus the entry point to compile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Kernel {
    pub entry_point: &'static str,
    pub source: &'static str,
    pub op: KernelOp,
}

/// Workgroup width baked into the WGSL sources below
pub const WORKGROUP_SIZE: u32 = 64;

/// Elementwise products; the host sums them into the dot product.
pub const DOT_PRODUCT: Kernel = Kernel {
    entry_point: "dot_product",
    op: KernelOp::Multiply,
    source: r#"
@group(0) @binding(0) var<storage, read> a: array<f32>;
@group(0) @binding(1) var<storage, read> b: array<f32>;
@group(0) @binding(2) var<storage, read_write> result: array<f32>;

@compute @workgroup_size(64)
fn dot_product(
    @builtin(global_invocation_id) id: vec3<u32>,
    @builtin(num_workgroups) groups: vec3<u32>,
) {
    let i = id.x + id.y * groups.x * 64u;
    if (i >= arrayLength(&result)) {
        return;
    }
    result[i] = a[i] * b[i];
}
"#,
};

pub const VECTOR_ADD: Kernel = Kernel {
    entry_point: "vector_add",
    op: KernelOp::Add,
    source: r#"
@group(0) @binding(0) var<storage, read> a: array<f32>;
@group(0) @binding(1) var<storage, read> b: array<f32>;
@group(0) @binding(2) var<storage, read_write> out: array<f32>;

@compute @workgroup_size(64)
fn vector_add(
    @builtin(global_invocation_id) id: vec3<u32>,
    @builtin(num_workgroups) groups: vec3<u32>,
) {
    let i = id.x + id.y * groups.x * 64u;
    if (i >= arrayLength(&out)) {
        return;
    }
    out[i] = a[i] + b[i];
}
"#,
};

/// Number of buffers every shipped kernel binds
pub const BINDINGS: usize = 3;

/// Workgroup grid `(x, y)` covering `elements` invocations when each
/// dimension holds at most `max_per_dimension` workgroups.
///
/// Rows are filled first, so inputs that fit one dimension dispatch as
/// `(groups, 1)`. `None` when even a square grid is too small.
pub fn dispatch_grid(elements: usize, max_per_dimension: u32) -> Option<(u32, u32)> {
    let groups = elements.div_ceil(WORKGROUP_SIZE as usize).max(1);
    let max = usize::try_from(max_per_dimension).ok()?.max(1);
    let x = groups.min(max);
    let y = groups.div_ceil(x);
    if y > max {
        return None;
    }
    Some((u32::try_from(x).ok()?, u32::try_from(y).ok()?))
}
