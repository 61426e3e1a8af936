//! Test utilities for dot product implementations.

#[cfg(test)]
mod tests {
    use crate::accel::{
        kernels, Accelerator, AcceleratorError, BufferHandle, CompiledProgram, CompletionToken, Kernel,
        SoftwareDevice,
    };
    use crate::error::{BenchError, PreconditionViolation};
    use crate::math::dot_product::code::*;
    use crate::utils::generator::VectorGenerator;
    use std::sync::Arc;

    const EPSILON: f32 = 1e-5;

    fn assert_close(a: f32, b: f32, msg: &str) {
        let diff = (a - b).abs();
        assert!(
            diff < EPSILON * b.abs().max(1.0),
            "{}: expected {}, got {}, diff = {}",
            msg,
            b,
            a,
            diff
        );
    }

    fn strategies(workers: usize) -> Vec<Box<dyn ReductionStrategy>> {
        available_variants(workers, Arc::new(SoftwareDevice::new())).unwrap()
    }

    #[test]
    fn test_sequential_basic() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [5.0, 6.0, 7.0, 8.0];
        // 1*5 + 2*6 + 3*7 + 4*8 = 5 + 12 + 21 + 32 = 70
        let result = dot_product_sequential(&a, &b).unwrap();
        assert_close(result, 70.0, "sequential basic");
    }

    #[test]
    fn test_sequential_single() {
        let result = dot_product_sequential(&[3.0], &[4.0]).unwrap();
        assert_close(result, 12.0, "sequential single");
    }

    #[test]
    fn test_all_strategies_basic() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [5.0, 6.0, 7.0, 8.0];
        for strategy in strategies(2) {
            let result = strategy.reduce(&a, &b).unwrap();
            assert_eq!(result, 70.0, "{}", strategy.name());
        }
    }

    #[test]
    fn test_all_strategies_empty() {
        for strategy in strategies(4) {
            let result = strategy.reduce(&[], &[]).unwrap();
            assert_eq!(result, 0.0, "{}", strategy.name());
        }
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let a = [1.0, 2.0, 3.0];
        let b = [1.0, 2.0, 3.0, 4.0];
        for strategy in strategies(2) {
            let err = strategy.reduce(&a, &b).unwrap_err();
            match err {
                BenchError::Precondition(PreconditionViolation::LengthMismatch { left, right }) => {
                    assert_eq!((left, right), (3, 4));
                }
                other => panic!("{}: unexpected error {other}", strategy.name()),
            }
        }
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = dot_product_chunked(&[1.0], &[1.0], 0).unwrap_err();
        assert!(matches!(err, BenchError::Precondition(PreconditionViolation::NoWorkers)));
        assert!(ChunkedParallel::new(0).is_err());
    }

    #[test]
    fn test_chunked_matches_sequential_for_any_worker_count() {
        let inputs = VectorGenerator::new(42).pair(1000);
        let expected = dot_product_sequential(inputs.a(), inputs.b()).unwrap();
        for workers in [1, 2, 3, 7, 64, 1000, 1005] {
            let result = dot_product_chunked(inputs.a(), inputs.b(), workers).unwrap();
            assert_close(result, expected, &format!("chunked with {workers} workers"));
        }
    }

    #[test]
    fn test_single_worker_is_bit_identical() {
        let inputs = VectorGenerator::new(7).pair(513);
        let expected = dot_product_sequential(inputs.a(), inputs.b()).unwrap();
        let result = dot_product_chunked(inputs.a(), inputs.b(), 1).unwrap();
        assert_eq!(result.to_bits(), expected.to_bits());
    }

    #[test]
    fn test_more_workers_than_elements_clamps() {
        let inputs = VectorGenerator::new(3).pair(10);
        let exact = dot_product_chunked(inputs.a(), inputs.b(), 10).unwrap();
        let oversubscribed = dot_product_chunked(inputs.a(), inputs.b(), 200).unwrap();
        assert_eq!(exact.to_bits(), oversubscribed.to_bits());
    }

    #[test]
    fn test_sequential_is_deterministic() {
        let inputs = VectorGenerator::new(11).pair(4096);
        let first = dot_product_sequential(inputs.a(), inputs.b()).unwrap();
        let second = dot_product_sequential(inputs.a(), inputs.b()).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_accelerator_matches_sequential_and_releases_buffers() {
        let device = Arc::new(SoftwareDevice::with_max_workgroup(16));
        let strategy = AcceleratorReduction::new(device.clone());
        assert_eq!(strategy.device_name(), "software");
        let inputs = VectorGenerator::new(99).pair(1023);

        let expected = dot_product_sequential(inputs.a(), inputs.b()).unwrap();
        let result = strategy.reduce(inputs.a(), inputs.b()).unwrap();
        assert_eq!(result.to_bits(), expected.to_bits());

        strategy.reduce(inputs.a(), inputs.b()).unwrap();
        assert_eq!(device.live_buffers(), 0);
        assert_eq!(device.compiled_programs(), 1);
    }

    #[test]
    fn test_accelerator_empty_input_never_touches_device() {
        let device = Arc::new(SoftwareDevice::new());
        let strategy = AcceleratorReduction::new(device.clone());
        assert_eq!(strategy.reduce(&[], &[]).unwrap(), 0.0);
        assert_eq!(device.compiled_programs(), 0);
    }

    /// Device that compiles fine but refuses every allocation.
    struct OutOfMemory;

    impl Accelerator for OutOfMemory {
        fn name(&self) -> &str {
            "out-of-memory"
        }

        fn max_workgroup_size(&self) -> u32 {
            kernels::WORKGROUP_SIZE
        }

        fn compile(&self, kernel: &Kernel) -> Result<CompiledProgram, AcceleratorError> {
            Ok(CompiledProgram::new(1, kernel.entry_point))
        }

        fn allocate_buffer(&self, size_bytes: usize, _init: Option<&[u8]>) -> Result<BufferHandle, AcceleratorError> {
            Err(AcceleratorError::Allocate {
                size_bytes,
                reason: "device memory exhausted".to_string(),
            })
        }

        fn dispatch(
            &self,
            _program: &CompiledProgram,
            _buffers: &[&BufferHandle],
            _workgroup_size: u32,
        ) -> Result<CompletionToken, AcceleratorError> {
            unreachable!("no buffer was ever allocated")
        }

        fn await_completion(&self, _token: CompletionToken) -> Result<(), AcceleratorError> {
            unreachable!("nothing was dispatched")
        }

        fn read_buffer(&self, _handle: &BufferHandle) -> Result<Vec<u8>, AcceleratorError> {
            unreachable!("no buffer was ever allocated")
        }

        fn release_buffer(&self, _handle: &BufferHandle) -> Result<(), AcceleratorError> {
            Ok(())
        }
    }

    #[test]
    fn test_accelerator_failure_is_surfaced() {
        let strategy = AcceleratorReduction::new(Arc::new(OutOfMemory));
        let err = strategy.reduce(&[1.0, 2.0], &[3.0, 4.0]).unwrap_err();
        assert!(matches!(
            err,
            BenchError::Accelerator(AcceleratorError::Allocate { size_bytes: 8, .. })
        ));
    }

    #[test]
    fn test_variant_order() {
        let names: Vec<_> = strategies(4).iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["sequential", "chunked_parallel", "accelerator"]);
    }
}
