//! Streaming Lanczos tridiagonalization over a disk-resident operator.
//!
//! The submodules split the engine at its natural seam: [`operator`] defines
//! how a disk matrix is applied to a vector one row at a time, and
//! [`lanczos`] runs the three-term recurrence against any such operator.

pub mod lanczos;
pub mod operator;

pub use lanczos::lanczos;
pub use operator::{AugmentedCross, StreamOp, SymmetricRows};

/// The scalar output of a Lanczos run: the coefficients of the k x k
/// symmetric tridiagonal matrix T_k.
///
/// `alpha[i]` is the diagonal entry of step i and `beta[i]` the off-diagonal
/// coupling steps i and i+1. `beta[k-1]` is computed by the final step but
/// never used as an off-diagonal entry (and never as a divisor). The basis
/// built during the run is internal to the engine and is dropped when this
/// struct is produced.
#[derive(Debug, Clone)]
pub struct LanczosDecomposition<T> {
    pub alpha: Vec<T>,
    pub beta: Vec<T>,
}

impl<T> LanczosDecomposition<T> {
    /// Number of steps taken, which equals the requested rank k.
    pub fn steps(&self) -> usize {
        self.alpha.len()
    }
}
