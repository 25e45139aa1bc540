//! Chronological train/test splitting

/// Index where the training part ends: `floor(len * train_ratio)`
pub fn split_index(len: usize, train_ratio: f64) -> usize {
    let ratio = train_ratio.clamp(0.0, 1.0);
    ((len as f64) * ratio) as usize
}

/// Split a series in temporal order, the first `train_ratio` share for training
pub fn chronological_split<T>(data: &[T], train_ratio: f64) -> (&[T], &[T]) {
    data.split_at(split_index(data.len(), train_ratio))
}
