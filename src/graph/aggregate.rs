//! Permutation-invariant aggregation primitives.
//!
//! Both primitives reduce a variable number of feature rows into fixed
//! buckets by unweighted summation, so the result cannot depend on the order
//! in which rows sharing a bucket are visited.

use burn::tensor::{Int, Tensor, backend::Backend};

/// Builds an integer index tensor from host-side indices.
pub(crate) fn index_tensor<B: Backend>(indices: &[usize], device: &B::Device) -> Tensor<B, 1, Int> {
    let indices: Vec<i32> = indices.iter().map(|&i| i as i32).collect();
    Tensor::from_ints(indices.as_slice(), device)
}

/// Sums the rows of `values` into `num_segments` buckets selected per row by
/// `indices`. Buckets no row points at stay zero.
pub fn scatter_sum<B: Backend>(
    values: Tensor<B, 2>,
    indices: &[usize],
    num_segments: usize,
) -> Tensor<B, 2> {
    let [num_rows, width] = values.dims();
    debug_assert_eq!(num_rows, indices.len());

    let device = values.device();
    let out = Tensor::zeros([num_segments, width], &device);
    if indices.is_empty() {
        return out;
    }
    out.select_assign(0, index_tensor(indices, &device), values)
}

/// Sums contiguous row segments, one per entry of `counts`. A zero count
/// yields a zero row rather than an error.
pub fn segment_sum<B: Backend>(values: Tensor<B, 2>, counts: &[usize]) -> Tensor<B, 2> {
    let indices: Vec<usize> = counts
        .iter()
        .enumerate()
        .flat_map(|(segment, &count)| std::iter::repeat(segment).take(count))
        .collect();
    scatter_sum(values, &indices, counts.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn to_vec(tensor: Tensor<TestBackend, 2>) -> Vec<f32> {
        tensor.to_data().to_vec().unwrap()
    }

    #[test]
    fn test_scatter_sum_known_values() {
        let device = <TestBackend as Backend>::Device::default();
        let values = Tensor::<TestBackend, 2>::from_floats(
            [[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]],
            &device,
        );

        let out = scatter_sum(values, &[1, 1, 0], 3);

        assert_eq!(to_vec(out), vec![5.0, 6.0, 4.0, 6.0, 0.0, 0.0]);
    }

    #[test]
    fn test_scatter_sum_permutation_invariant() {
        let device = <TestBackend as Backend>::Device::default();
        let values = Tensor::<TestBackend, 2>::from_floats(
            [[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]],
            &device,
        );
        let permuted = Tensor::<TestBackend, 2>::from_floats(
            [[5.0, 6.0], [1.0, 2.0], [3.0, 4.0]],
            &device,
        );

        // Rows 0 and 2 share bucket 0 in the first layout; after permuting
        // the rows (and their bucket indices with them) the sums must agree.
        let a = scatter_sum(values, &[0, 1, 0], 2);
        let b = scatter_sum(permuted, &[0, 0, 1], 2);

        assert_eq!(to_vec(a), to_vec(b));
    }

    #[test]
    fn test_scatter_sum_empty_rows() {
        let device = <TestBackend as Backend>::Device::default();
        let values = Tensor::<TestBackend, 2>::zeros([0, 4], &device);

        let out = scatter_sum(values, &[], 3);

        assert_eq!(out.dims(), [3, 4]);
        assert_eq!(to_vec(out), vec![0.0; 12]);
    }

    #[test]
    fn test_segment_sum_per_graph() {
        let device = <TestBackend as Backend>::Device::default();
        let values = Tensor::<TestBackend, 2>::from_floats(
            [[1.0], [2.0], [3.0], [4.0]],
            &device,
        );

        let out = segment_sum(values, &[3, 1]);

        assert_eq!(to_vec(out), vec![6.0, 4.0]);
    }

    #[test]
    fn test_segment_sum_zero_count_segment() {
        let device = <TestBackend as Backend>::Device::default();
        let values = Tensor::<TestBackend, 2>::from_floats([[1.0], [2.0]], &device);

        // The middle graph owns no rows; its sum is a zero vector.
        let out = segment_sum(values, &[1, 0, 1]);

        assert_eq!(to_vec(out), vec![1.0, 0.0, 2.0]);
    }
}
