//! The public operation surface: streaming crossproducts over a destination
//! store, Lanczos eigen/singular value estimation over a source store, and
//! the in-place row-wise scale.
//!
//! Every entry point is generic over [`Element`]; the working precision is
//! chosen once here and fixed for all internal buffers, the stores involved,
//! and the returned values. Failures propagate as a single [`crate::Error`];
//! a destination store touched by a failed operation may be partially written
//! and must be discarded by the caller.

use faer::linalg::matmul::matmul;
use faer::{Accum, Mat, MatRef, Par, Side};
use rand::Rng;

use crate::algorithms::{AugmentedCross, SymmetricRows, lanczos};
use crate::element::Element;
use crate::error::{ErrorKind, Result};
use crate::kernels::scale_slice;
use crate::store::MatStore;

/// Computes the crossproduct `x^T x` (n x n) of the in-memory `m x n` matrix
/// `x`, writing the result one row at a time to `dest`.
///
/// Row i of the product is obtained from a single transpose-left
/// matrix-vector multiply of `x` against its own column i, so the scratch
/// footprint is O(m + n) regardless of n. `dest` must be an n x n store of
/// the same element kind.
pub fn crossprod<T: Element>(x: MatRef<'_, T>, dest: &mut MatStore) -> Result<()> {
    let (m, n) = (x.nrows(), x.ncols());
    check_dest_shape(dest, n, n)?;

    let mut y = Mat::<T>::zeros(m, 1);
    let mut product = Mat::<T>::zeros(n, 1);
    let mut out_row = vec![<T as Element>::zero(); n];

    for i in 0..n {
        for r in 0..m {
            y[(r, 0)] = x[(r, i)];
        }
        matmul(
            product.as_mut(),
            Accum::Replace,
            x.transpose(),
            y.as_ref(),
            <T as Element>::one(),
            Par::Seq,
        );
        for j in 0..n {
            out_row[j] = product[(j, 0)];
        }
        dest.write_rows(i, 1, 0, n, &out_row)?;
    }
    Ok(())
}

/// Computes the transpose-crossproduct `x x^T` (m x m), writing one row at a
/// time to `dest`, which must be an m x m store of the same element kind.
pub fn transpose_crossprod<T: Element>(x: MatRef<'_, T>, dest: &mut MatStore) -> Result<()> {
    let (m, n) = (x.nrows(), x.ncols());
    check_dest_shape(dest, m, m)?;

    let mut r = Mat::<T>::zeros(n, 1);
    let mut product = Mat::<T>::zeros(m, 1);
    let mut out_row = vec![<T as Element>::zero(); m];

    for i in 0..m {
        for c in 0..n {
            r[(c, 0)] = x[(i, c)];
        }
        matmul(
            product.as_mut(),
            Accum::Replace,
            x,
            r.as_ref(),
            <T as Element>::one(),
            Par::Seq,
        );
        for j in 0..m {
            out_row[j] = product[(j, 0)];
        }
        dest.write_rows(i, 1, 0, m, &out_row)?;
    }
    Ok(())
}

/// Estimates the top-k eigenvalues of the symmetric n x n matrix held in
/// `store`, streamed row by row.
///
/// Returns k values in descending order with negatives clamped to exactly
/// zero: the intended operators are positive semidefinite (crossproduct
/// spectra), and small negative residuals of the approximate recurrence are
/// rounded away rather than reported.
pub fn eigen_sym<T: Element, R: Rng + ?Sized>(
    k: usize,
    n: usize,
    store: &mut MatStore,
    rng: &mut R,
) -> Result<Vec<T>> {
    log::debug!("eigen_sym: {n}x{n} store, rank {k}");
    let mut op = SymmetricRows::<T>::new(store, n)?;
    let decomposition = lanczos(&mut op, k, rng)?;
    tridiagonal_values(&decomposition.alpha, &decomposition.beta)
}

/// Estimates the top-k singular values of the m x n matrix held in `store`.
///
/// The matrix is applied through the augmented bipartite operator
/// `[[0, A], [A^T, 0]]` over a basis of length m + n, whose non-negative
/// spectrum is the singular values of A; the returned estimates are therefore
/// singular values directly, not their squares. Descending, clamped at zero.
pub fn svd_values<T: Element, R: Rng + ?Sized>(
    k: usize,
    m: usize,
    n: usize,
    store: &mut MatStore,
    rng: &mut R,
) -> Result<Vec<T>> {
    log::debug!("svd_values: {m}x{n} store, augmented dimension {}, rank {k}", m + n);
    let mut op = AugmentedCross::<T>::new(store, m, n)?;
    let decomposition = lanczos(&mut op, k, rng)?;
    tridiagonal_values(&decomposition.alpha, &decomposition.beta)
}

/// Multiplies every element of the store by `factor`, one row at a time.
pub fn scale<T: Element>(store: &mut MatStore, factor: T) -> Result<()> {
    let (m, n) = store.shape();
    let mut row = vec![<T as Element>::zero(); n];
    for i in 0..m {
        store.read_rows_into(i, 1, 0, n, &mut row)?;
        scale_slice(&mut row, factor);
        store.write_rows(i, 1, 0, n, &row)?;
    }
    Ok(())
}

/// Eigenvalues of the k x k symmetric tridiagonal matrix defined by the
/// Lanczos coefficients, in descending order with negatives clamped to zero.
///
/// The diagonal is `alpha`, the off-diagonals `beta[0..k-1]`; `beta[k-1]` is
/// not an entry of the matrix. The dense eigensolve is delegated to faer's
/// self-adjoint decomposition; its failure to converge propagates as an
/// error with no partial result.
pub fn tridiagonal_values<T: Element>(alpha: &[T], beta: &[T]) -> Result<Vec<T>> {
    let k = alpha.len();
    debug_assert!(beta.len() >= k.saturating_sub(1));

    let mut t = Mat::<T>::zeros(k, k);
    for (i, &a) in alpha.iter().enumerate() {
        t[(i, i)] = a;
    }
    for i in 0..k.saturating_sub(1) {
        t[(i, i + 1)] = beta[i];
        t[(i + 1, i)] = beta[i];
    }

    let evd = t
        .as_ref()
        .self_adjoint_eigen(Side::Lower)
        .map_err(|e| crate::error::Error::from(ErrorKind::Evd(e)))?;
    let s = evd.S();

    let mut values: Vec<T> = (0..k).map(|i| s[i]).collect();
    // Normalize the eigensolver's ordering, then flip to descending.
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal));
    values.reverse();
    let mut clamped = 0usize;
    for v in values.iter_mut() {
        if *v < <T as Element>::zero() {
            *v = <T as Element>::zero();
            clamped += 1;
        }
    }
    if clamped > 0 {
        log::debug!("clamped {clamped} negative Ritz values to zero");
    }
    Ok(values)
}

fn check_dest_shape(dest: &MatStore, rows: usize, cols: usize) -> Result<()> {
    let (found_rows, found_cols) = dest.shape();
    if (found_rows, found_cols) != (rows, cols) {
        return Err(ErrorKind::ShapeMismatch {
            expected_rows: rows as u64,
            expected_cols: cols as u64,
            found_rows: found_rows as u64,
            found_cols: found_cols as u64,
        }
        .into());
    }
    Ok(())
}
