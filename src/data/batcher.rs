// ============================================================
// Layer 4 - Tabular Batcher
// ============================================================
// Turns rows of an EncodedTable into burn tensors.
//
// How batching works here:
//   Input:  EncodedTable (row-major host matrices) + row indices
//   Output: TabularBatch with x of shape [N, d_x] and
//           context of shape [N, d_context]
//
// The selected rows are copied into one flat Vec per matrix,
// then handed to burn as TensorData with a 2D shape.

use burn::prelude::*;

use crate::data::codec::EncodedTable;
use crate::domain::error::{Result, WganError};

// ─── TabularBatch ─────────────────────────────────────────────────────────────
/// A mini-batch ready for the forward pass.
/// B is the burn Backend, so the same batcher feeds the autodiff
/// backend during training and the inner backend during evaluation.
#[derive(Debug, Clone)]
pub struct TabularBatch<B: Backend> {
    /// Encoded features, shape [batch_size, d_x]
    pub x: Tensor<B, 2>,
    /// Normalised context, shape [batch_size, d_context]
    pub context: Tensor<B, 2>,
}

// ─── TabularBatcher ───────────────────────────────────────────────────────────
/// Holds the target device so tensors are created in the right place.
#[derive(Clone, Debug)]
pub struct TabularBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> TabularBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// Gather `rows` of `data` into a batch
    pub fn batch(&self, data: &EncodedTable, rows: &[usize]) -> TabularBatch<B> {
        let x_flat: Vec<f32> = rows.iter().flat_map(|&r| data.x_row(r).iter().copied()).collect();
        let context_flat: Vec<f32> = rows
            .iter()
            .flat_map(|&r| data.context_row(r).iter().copied())
            .collect();

        TabularBatch {
            x: matrix(x_flat, rows.len(), data.x_width, &self.device),
            context: matrix(context_flat, rows.len(), data.context_width, &self.device),
        }
    }
}

/// Row-major values -> [rows, cols] tensor
pub fn matrix<B: Backend>(values: Vec<f32>, rows: usize, cols: usize, device: &B::Device) -> Tensor<B, 2> {
    Tensor::from_data(TensorData::new(values, [rows, cols]), device)
}

/// Tensor -> row-major host values
pub fn to_host<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| WganError::Record(format!("cannot read tensor data: {e:?}")))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_gathers_rows_in_order() {
        let data = EncodedTable {
            x: vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            context: vec![10.0, 20.0, 30.0],
            rows: 3,
            x_width: 2,
            context_width: 1,
        };
        let batcher = TabularBatcher::<NdArray>::new(Default::default());
        let batch = batcher.batch(&data, &[2, 0]);

        assert_eq!(batch.x.dims(), [2, 2]);
        assert_eq!(to_host(batch.x).unwrap(), vec![4.0, 5.0, 0.0, 1.0]);
        assert_eq!(to_host(batch.context).unwrap(), vec![30.0, 10.0]);
    }
}
