use burn::prelude::*;
use replay_buffer::{Batch, TensorRole};

use super::ModelError;

/// The three roles of a batch as dense tensors on a device.
#[derive(Debug, Clone)]
pub struct BatchTensors<B: Backend> {
    pub board_features: Tensor<B, 2>,
    pub policy_targets: Tensor<B, 2>,
    pub value_targets: Tensor<B, 2>,
}

impl<B: Backend> BatchTensors<B> {
    /// Validates the shape of every role and copies the rows onto `device`.
    ///
    /// Validation happens before any tensor is created, so a malformed batch never reaches the model.
    pub fn from_batch(
        batch: &Batch,
        input_size: usize,
        output_size: usize,
        device: &B::Device,
    ) -> Result<Self, ModelError> {
        let rows = check_batch_shape(batch, input_size, output_size)?;

        Ok(Self {
            board_features: rows_to_tensor(&batch.board_features, input_size, device),
            policy_targets: rows_to_tensor(&batch.policy_targets, output_size, device),
            value_targets: Tensor::from_data(
                TensorData::new(batch.value_targets.clone(), [rows, 1]),
                device,
            ),
        })
    }

    pub fn rows(&self) -> usize {
        self.board_features.dims()[0]
    }
}

/// Checks that every role has the same, non-zero number of rows and that rows have the expected
/// width. Returns the number of rows.
pub fn check_batch_shape(
    batch: &Batch,
    input_size: usize,
    output_size: usize,
) -> Result<usize, ModelError> {
    let rows = batch.rows(TensorRole::BoardFeatures);

    for role in TensorRole::ALL {
        let actual = batch.rows(role);
        if actual != rows {
            return Err(ModelError::BatchShapeMismatch {
                role,
                expected: rows,
                actual,
            });
        }
    }

    if rows == 0 {
        return Err(ModelError::EmptyBatch);
    }

    check_row_widths(&batch.board_features, TensorRole::BoardFeatures, input_size)?;
    check_row_widths(&batch.policy_targets, TensorRole::PolicyTarget, output_size)?;

    Ok(rows)
}

/// Builds the board feature tensor alone, for forward passes without targets.
pub fn features_to_tensor<B: Backend>(
    board_features: &[Vec<f32>],
    input_size: usize,
    device: &B::Device,
) -> Result<Tensor<B, 2>, ModelError> {
    if board_features.is_empty() {
        return Err(ModelError::EmptyBatch);
    }

    check_row_widths(board_features, TensorRole::BoardFeatures, input_size)?;

    Ok(rows_to_tensor(board_features, input_size, device))
}

fn check_row_widths(rows: &[Vec<f32>], role: TensorRole, expected: usize) -> Result<(), ModelError> {
    match rows.iter().position(|row| row.len() != expected) {
        Some(row) => Err(ModelError::RowWidthMismatch {
            role,
            row,
            expected,
            actual: rows[row].len(),
        }),
        None => Ok(()),
    }
}

fn rows_to_tensor<B: Backend>(rows: &[Vec<f32>], width: usize, device: &B::Device) -> Tensor<B, 2> {
    let flat = rows.iter().flatten().copied().collect::<Vec<f32>>();

    Tensor::from_data(TensorData::new(flat, [rows.len(), width]), device)
}

#[cfg(test)]
mod test {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn batch(rows: usize) -> Batch {
        Batch {
            board_features: vec![vec![0.0; 50]; rows],
            policy_targets: vec![vec![0.04; 25]; rows],
            value_targets: vec![1.0; rows],
        }
    }

    #[test]
    fn test_from_batch_shapes() {
        let tensors =
            BatchTensors::<TestBackend>::from_batch(&batch(3), 50, 25, &Default::default()).unwrap();

        assert_eq!(tensors.rows(), 3);
        assert_eq!(tensors.board_features.dims(), [3, 50]);
        assert_eq!(tensors.policy_targets.dims(), [3, 25]);
        assert_eq!(tensors.value_targets.dims(), [3, 1]);
    }

    #[test]
    fn test_row_count_mismatch() {
        let mut batch = batch(3);
        batch.policy_targets.pop();

        let err = check_batch_shape(&batch, 50, 25).unwrap_err();

        assert_eq!(
            err,
            ModelError::BatchShapeMismatch {
                role: TensorRole::PolicyTarget,
                expected: 3,
                actual: 2
            }
        );
        assert!(err.is_shape_mismatch());
    }

    #[test]
    fn test_row_width_mismatch() {
        let mut batch = batch(2);
        batch.board_features[1].push(1.0);

        let err = check_batch_shape(&batch, 50, 25).unwrap_err();

        assert_eq!(
            err,
            ModelError::RowWidthMismatch {
                role: TensorRole::BoardFeatures,
                row: 1,
                expected: 50,
                actual: 51
            }
        );
    }

    #[test]
    fn test_empty_batch() {
        assert_eq!(check_batch_shape(&Batch::new(), 50, 25), Err(ModelError::EmptyBatch));
    }
}
