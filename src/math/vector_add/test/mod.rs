//! Test utilities for vector add implementations.

#[cfg(test)]
mod tests {
    use crate::accel::SoftwareDevice;
    use crate::error::BenchError;
    use crate::math::vector_add::code::*;
    use crate::utils::generator::VectorGenerator;
    use std::sync::Arc;

    fn strategies(workers: usize) -> Vec<Box<dyn ElementwiseStrategy>> {
        available_variants(workers, Arc::new(SoftwareDevice::new())).unwrap()
    }

    #[test]
    fn test_basic_add() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [5.0, 6.0, 7.0, 8.0];
        for strategy in strategies(3) {
            let out = strategy.apply(&a, &b).unwrap();
            assert_eq!(out, vec![6.0, 8.0, 10.0, 12.0], "{}", strategy.name());
        }
    }

    #[test]
    fn test_empty_gives_empty() {
        for strategy in strategies(2) {
            assert!(strategy.apply(&[], &[]).unwrap().is_empty(), "{}", strategy.name());
        }
    }

    #[test]
    fn test_length_mismatch_rejected() {
        for strategy in strategies(2) {
            let err = strategy.apply(&[1.0], &[1.0, 2.0]).unwrap_err();
            assert!(err.is_precondition(), "{}: {err}", strategy.name());
        }
    }

    #[test]
    fn test_chunked_exact_for_any_worker_count() {
        let inputs = VectorGenerator::new(5).pair(777);
        let expected = vector_add_sequential(inputs.a(), inputs.b()).unwrap();
        for workers in [1, 2, 10, 777, 800] {
            let out = vector_add_chunked(inputs.a(), inputs.b(), workers).unwrap();
            assert_eq!(out, expected, "{workers} workers");
        }
    }

    #[test]
    fn test_accelerator_exact() {
        let device = Arc::new(SoftwareDevice::with_max_workgroup(32));
        let strategy = AcceleratorAdd::new(device.clone());
        let inputs = VectorGenerator::new(6).pair(100);
        let expected = vector_add_sequential(inputs.a(), inputs.b()).unwrap();
        assert_eq!(strategy.apply(inputs.a(), inputs.b()).unwrap(), expected);
        assert_eq!(device.live_buffers(), 0);
    }

    #[test]
    fn test_checksum() {
        assert_eq!(checksum(&[]), 0.0);
        assert_eq!(checksum(&[6.0, 8.0, 10.0, 12.0]), 36.0);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = vector_add_chunked(&[1.0], &[2.0], 0).unwrap_err();
        assert!(matches!(err, BenchError::Precondition(_)));
    }
}
