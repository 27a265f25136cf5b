//! The streaming three-term Lanczos recurrence.
//!
//! Given a symmetric operator of dimension N accessible only through
//! [`StreamOp::apply`], `lanczos` runs k steps of the classical recurrence
//! and returns the tridiagonal coefficients. The basis matrix Q (N x k,
//! column-major) is allocated once, used only to drive the recurrence, and
//! dropped on return.
//!
//! No reorthogonalization is performed: the basis is orthonormal only up to
//! the drift inherent in the plain recurrence, and large k may produce
//! duplicate Ritz values. That is an accepted approximation error of this
//! method, not a defect.

use rand::Rng;

use super::{LanczosDecomposition, StreamOp};
use crate::element::Element;
use crate::error::{ErrorKind, Result};
use crate::kernels::{axpy, dot, l2norm};

/// Attempts at finding a fresh direction after an exact invariant-subspace
/// breakdown before giving up.
const RESTART_ATTEMPTS: usize = 8;

/// Runs k steps of the Lanczos recurrence against `op`, using `rng` for the
/// start vector.
///
/// Errors with an invalid-rank error unless `1 <= k <= N`, and propagates any
/// I/O failure from the operator. When an iterate's norm reaches exact zero
/// the Krylov subspace is invariant; the recurrence then continues from a
/// fresh random direction orthogonalized against the basis built so far
/// (`beta` keeps the zero), failing with a breakdown error only if no such
/// direction can be found. A merely *near*-zero norm is not special-cased:
/// the division still yields a unit vector and the recurrence proceeds, as
/// the requested k = N on a full-rank operator requires.
pub fn lanczos<T, O, R>(op: &mut O, k: usize, rng: &mut R) -> Result<LanczosDecomposition<T>>
where
    T: Element,
    O: StreamOp<T>,
    R: Rng + ?Sized,
{
    let n = op.dim();
    if k == 0 || k > n {
        return Err(ErrorKind::InvalidRank { k, dim: n as u64 }.into());
    }

    log::debug!("lanczos: dimension {n}, rank {k}");

    let mut alpha: Vec<T> = Vec::with_capacity(k);
    let mut beta: Vec<T> = Vec::with_capacity(k);

    // Basis matrix, column-major: column i starts at i * n.
    let mut q = vec![<T as Element>::zero(); n * k];
    let mut v = vec![<T as Element>::zero(); n];

    random_unit(&mut q[..n], op.start_prefix(), rng);

    for i in 0..k {
        let (head, tail) = q.split_at_mut((i + 1) * n);
        let q_i = &head[i * n..];

        op.apply(q_i, &mut v)?;

        let a_i = dot(q_i, &v);
        axpy(-a_i, q_i, &mut v);
        if i > 0 {
            let q_prev = &head[(i - 1) * n..i * n];
            axpy(-beta[i - 1], q_prev, &mut v);
        }
        let b_i = l2norm(&v);

        alpha.push(a_i);
        beta.push(b_i);

        if i < k - 1 {
            let q_next = &mut tail[..n];
            if b_i == <T as Element>::zero() {
                log::debug!("invariant subspace at step {i}; extending with a fresh direction");
                extend_basis(head, n, q_next, rng)
                    .ok_or_else(|| crate::error::Error::from(ErrorKind::Breakdown { step: i }))?;
            } else {
                for (slot, &vj) in q_next.iter_mut().zip(v.iter()) {
                    *slot = vj / b_i;
                }
            }
        }
    }

    Ok(LanczosDecomposition { alpha, beta })
}

/// Fills the random prefix of `q0` with uniform draws and normalizes the
/// whole vector, redrawing in the vanishingly unlikely all-zero case.
fn random_unit<T: Element, R: Rng + ?Sized>(q0: &mut [T], prefix: usize, rng: &mut R) {
    loop {
        for slot in q0[..prefix].iter_mut() {
            *slot = T::from_f64(rng.random::<f64>());
        }
        let norm = l2norm(q0);
        if norm > <T as Element>::zero() {
            for slot in q0.iter_mut() {
                *slot /= norm;
            }
            return;
        }
    }
}

/// Draws a random vector, orthogonalizes it against the columns already in
/// `basis`, and normalizes it into `out`. Returns `None` when every attempt
/// collapses, which only happens once the basis already spans the space.
fn extend_basis<T: Element, R: Rng + ?Sized>(
    basis: &[T],
    n: usize,
    out: &mut [T],
    rng: &mut R,
) -> Option<()> {
    for _ in 0..RESTART_ATTEMPTS {
        for slot in out.iter_mut() {
            *slot = T::from_f64(rng.random::<f64>());
        }
        for col in basis.chunks_exact(n) {
            let proj = dot(col, out);
            axpy(-proj, col, out);
        }
        let norm = l2norm(out);
        if norm > <T as Element>::zero() {
            for slot in out.iter_mut() {
                *slot /= norm;
            }
            return Some(());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    /// An in-memory diagonal operator, enough to exercise the recurrence
    /// without touching the disk store.
    struct Diag(Vec<f64>);

    impl StreamOp<f64> for Diag {
        fn dim(&self) -> usize {
            self.0.len()
        }

        fn apply(&mut self, q: &[f64], v: &mut [f64]) -> Result<()> {
            for (j, slot) in v.iter_mut().enumerate() {
                *slot = self.0[j] * q[j];
            }
            Ok(())
        }
    }

    #[test]
    fn rank_zero_and_oversized_rank_are_rejected() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut op = Diag(vec![1.0, 2.0, 3.0]);
        assert!(lanczos(&mut op, 0, &mut rng).unwrap_err().is_bounds());
        assert!(lanczos(&mut op, 4, &mut rng).unwrap_err().is_bounds());
    }

    #[test]
    fn coefficients_have_requested_length() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(7);
        let mut op = Diag((1..=8).map(|v| v as f64).collect());
        let decomp = lanczos(&mut op, 5, &mut rng)?;
        assert_eq!(decomp.steps(), 5);
        assert_eq!(decomp.alpha.len(), 5);
        assert_eq!(decomp.beta.len(), 5);
        Ok(())
    }

    #[test]
    fn alpha_stays_within_the_spectrum() -> Result<()> {
        // Each alpha is a Rayleigh quotient of a unit vector, so it must lie
        // inside the operator's spectral interval.
        let mut rng = StdRng::seed_from_u64(11);
        let mut op = Diag(vec![1.0, 2.0, 5.0, 9.0]);
        let decomp = lanczos(&mut op, 4, &mut rng)?;
        let slack = 1e-9;
        for &a in &decomp.alpha {
            assert!(
                (1.0 - slack..=9.0 + slack).contains(&a),
                "alpha {a} outside [1, 9]"
            );
        }
        for &b in &decomp.beta {
            assert!(b >= 0.0);
        }
        Ok(())
    }
}
