//! Flat `f32` row storage.
use super::{BatchBase, StackableBatch};

/// Fixed-width `f32` rows over a flat buffer.
///
/// The row width is adopted from the first pushed batch; until then the
/// storage is unallocated. Used by the tests and the bundled demo;
/// tensor-backed replacements implement the same traits downstream.
#[derive(Clone, Debug)]
pub struct VecBatch {
    buf: Vec<f32>,
    /// Row width in elements. Zero until the first push.
    dim: usize,
    capacity: usize,
}

impl VecBatch {
    /// A batch of one row.
    pub fn from_row(row: Vec<f32>) -> Self {
        Self {
            dim: row.len(),
            capacity: 1,
            buf: row,
        }
    }

    /// Row width in elements.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of rows currently represented.
    pub fn n_rows(&self) -> usize {
        match self.dim {
            0 => 0,
            d => self.buf.len() / d,
        }
    }

    /// The flat row-major contents.
    pub fn as_slice(&self) -> &[f32] {
        &self.buf
    }
}

impl BatchBase for VecBatch {
    fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::new(),
            dim: 0,
            capacity,
        }
    }

    fn push(&mut self, ix: usize, data: Self) {
        if data.dim == 0 {
            return;
        }
        if self.dim == 0 {
            self.dim = data.dim;
            self.buf = vec![0.; self.capacity * self.dim];
        }
        debug_assert_eq!(self.dim, data.dim);

        let mut j = ix;
        for row in data.buf.chunks(data.dim) {
            self.buf[j * self.dim..(j + 1) * self.dim].copy_from_slice(row);
            j += 1;
            if j == self.capacity {
                j = 0;
            }
        }
    }

    fn sample(&self, ixs: &[usize]) -> Self {
        let mut buf = Vec::with_capacity(ixs.len() * self.dim);
        for &ix in ixs {
            buf.extend_from_slice(&self.buf[ix * self.dim..(ix + 1) * self.dim]);
        }
        Self {
            buf,
            dim: self.dim,
            capacity: ixs.len(),
        }
    }
}

impl StackableBatch for VecBatch {
    fn stack(&self, windows: &[Vec<usize>]) -> Self {
        let h = windows.first().map_or(0, |w| w.len());
        let mut buf = Vec::with_capacity(windows.len() * h * self.dim);
        for w in windows {
            debug_assert_eq!(w.len(), h);
            for &ix in w {
                buf.extend_from_slice(&self.buf[ix * self.dim..(ix + 1) * self.dim]);
            }
        }
        Self {
            buf,
            dim: h * self.dim,
            capacity: windows.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_wraps_at_capacity() {
        let mut batch = VecBatch::new(3);
        batch.push(0, VecBatch::from_row(vec![1., 2.]));
        batch.push(1, VecBatch::from_row(vec![3., 4.]));
        batch.push(2, VecBatch::from_row(vec![5., 6.]));
        // Overwrites row 0.
        batch.push(0, VecBatch::from_row(vec![7., 8.]));

        assert_eq!(batch.n_rows(), 3);
        assert_eq!(batch.as_slice(), &[7., 8., 3., 4., 5., 6.]);
    }

    #[test]
    fn multi_row_push_wraps() {
        let mut batch = VecBatch::new(3);
        let two_rows = VecBatch {
            buf: vec![1., 2., 3., 4.],
            dim: 2,
            capacity: 2,
        };
        batch.push(2, two_rows);

        // Second row wrapped to slot 0.
        assert_eq!(batch.as_slice(), &[3., 4., 0., 0., 1., 2.]);
    }

    #[test]
    fn sample_gathers_rows() {
        let mut batch = VecBatch::new(4);
        for k in 0..4 {
            batch.push(k, VecBatch::from_row(vec![k as f32]));
        }
        let sampled = batch.sample(&[3, 1]);
        assert_eq!(sampled.as_slice(), &[3., 1.]);
        assert_eq!(sampled.n_rows(), 2);
    }

    #[test]
    fn stack_concatenates_window_rows() {
        let mut batch = VecBatch::new(4);
        for k in 0..4 {
            batch.push(k, VecBatch::from_row(vec![k as f32, 10. * k as f32]));
        }
        let stacked = batch.stack(&[vec![0, 1], vec![2, 3]]);
        assert_eq!(stacked.dim(), 4);
        assert_eq!(stacked.as_slice(), &[0., 0., 1., 10., 2., 20., 3., 30.]);
    }
}
