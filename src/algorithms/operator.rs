//! Row-streaming linear operators over a disk store.
//!
//! The Lanczos recurrence only needs one operation from the matrix: apply it
//! to a vector. Abstracting that behind [`StreamOp`] keeps the recurrence
//! independent of how the matrix is addressed, and lets the same engine serve
//! both the symmetric eigenproblem (the store applied directly) and the
//! singular-value reduction (the store embedded in the augmented bipartite
//! operator `[[0, A], [A^T, 0]]`).
//!
//! Both operators re-read the store from scratch on every application; a
//! k-step decomposition therefore costs k full row scans. That is the
//! intended trade-off: bounded memory against repeated sequential I/O.

use crate::element::Element;
use crate::error::{ErrorKind, Result};
use crate::kernels::{axpy, dot};
use crate::store::MatStore;

/// A symmetric linear operator applied by streaming rows from disk.
pub trait StreamOp<T: Element> {
    /// Dimension N of the vectors the operator acts on.
    fn dim(&self) -> usize;

    /// Length of the start-vector prefix that is filled with random draws;
    /// entries beyond it stay zero. Defaults to the full dimension.
    fn start_prefix(&self) -> usize {
        self.dim()
    }

    /// Computes `v = A * q`. Both slices have length [`Self::dim`].
    fn apply(&mut self, q: &[T], v: &mut [T]) -> Result<()>;
}

/// The store itself as a symmetric n x n operator, one row read per output
/// entry: `v[j] = dot(row_j, q)`.
pub struct SymmetricRows<'a, T: Element> {
    store: &'a mut MatStore,
    n: usize,
    row: Vec<T>,
}

impl<'a, T: Element> SymmetricRows<'a, T> {
    /// Borrows `store` as a symmetric operator over its leading `n x n`
    /// block. The caller declares `n`; it must fit inside the store.
    pub fn new(store: &'a mut MatStore, n: usize) -> Result<Self> {
        let (rows, cols) = store.shape();
        if n > rows || n > cols {
            return Err(ErrorKind::ShapeMismatch {
                expected_rows: n as u64,
                expected_cols: n as u64,
                found_rows: rows as u64,
                found_cols: cols as u64,
            }
            .into());
        }
        Ok(Self {
            store,
            n,
            row: vec![<T as Element>::zero(); n],
        })
    }
}

impl<T: Element> StreamOp<T> for SymmetricRows<'_, T> {
    fn dim(&self) -> usize {
        self.n
    }

    fn apply(&mut self, q: &[T], v: &mut [T]) -> Result<()> {
        for j in 0..self.n {
            self.store.read_rows_into(j, 1, 0, self.n, &mut self.row)?;
            v[j] = dot(&self.row, q);
        }
        Ok(())
    }
}

/// The bipartite operator `[[0, A], [A^T, 0]]` over the stacked basis of
/// length m + n, realized from a single scan of A's rows per application.
///
/// Splitting a vector as `[p; s]` (m-part, n-part), the product is
/// `[A s; A^T p]`: row j of A contributes `dot(row_j, s)` to the m-part and
/// `row_j * p[j]` accumulated into the n-part. The non-negative half of this
/// operator's spectrum is exactly the singular values of A, which is the
/// standard reduction of the SVD to a symmetric eigenproblem.
pub struct AugmentedCross<'a, T: Element> {
    store: &'a mut MatStore,
    m: usize,
    n: usize,
    row: Vec<T>,
}

impl<'a, T: Element> AugmentedCross<'a, T> {
    /// Borrows `store` as the augmented operator over its leading `m x n`
    /// block.
    pub fn new(store: &'a mut MatStore, m: usize, n: usize) -> Result<Self> {
        let (rows, cols) = store.shape();
        if m > rows || n > cols {
            return Err(ErrorKind::ShapeMismatch {
                expected_rows: m as u64,
                expected_cols: n as u64,
                found_rows: rows as u64,
                found_cols: cols as u64,
            }
            .into());
        }
        Ok(Self {
            store,
            m,
            n,
            row: vec![<T as Element>::zero(); n],
        })
    }
}

impl<T: Element> StreamOp<T> for AugmentedCross<'_, T> {
    fn dim(&self) -> usize {
        self.m + self.n
    }

    // The start vector is random on the m-part only; the n-part is zero and
    // gets populated by the first application.
    fn start_prefix(&self) -> usize {
        self.m
    }

    fn apply(&mut self, q: &[T], v: &mut [T]) -> Result<()> {
        let (p, s) = q.split_at(self.m);
        let (vm, vn) = v.split_at_mut(self.m);
        for slot in vn.iter_mut() {
            *slot = <T as Element>::zero();
        }
        for j in 0..self.m {
            self.store.read_rows_into(j, 1, 0, self.n, &mut self.row)?;
            axpy(p[j], &self.row, vn);
            vm[j] = dot(&self.row, s);
        }
        Ok(())
    }
}
