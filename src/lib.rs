//! Out-of-core linear algebra over flat disk-resident matrix stores.
//!
//! This crate keeps dense matrices in a single flat file ([`MatStore`]) and
//! runs its numerical operations by streaming one row slab at a time, so the
//! resident footprint of every operation stays O(n) regardless of how large
//! the stored matrix is. It targets the setting where an n x n crossproduct
//! or covariance matrix fits comfortably on disk but not in memory.
//!
//! Dense in-memory pieces use the [`faer`] linear algebra framework; the
//! working precision (f32 or f64) is chosen once per store through the
//! [`Element`] trait and enforced on every subsequent access.
//!
//! ## Operations
//!
//! **Crossproducts** ([`crossprod`], [`transpose_crossprod`]): form x^T x or
//! x x^T of an in-memory matrix row by row into a destination store, without
//! ever materializing the product.
//!
//! **Spectral estimates** ([`eigen_sym`], [`svd_values`]): top-k eigenvalues
//! of a stored symmetric matrix, or top-k singular values of a stored
//! rectangular matrix, via the symmetric Lanczos recurrence run directly
//! against the store. Each estimate reads k row sweeps of the file and keeps
//! only the current basis in memory.
//!
//! **In-place updates** ([`scale`], [`fillers`]): element-wise scaling and
//! bulk initialization patterns, streamed the same way.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use diskmat::{CreateOptions, ElementKind, MatStore, crossprod, eigen_sym};
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! # fn main() -> diskmat::Result<()> {
//! // An in-memory 100 x 8 data matrix.
//! let x = faer::Mat::from_fn(100, 8, |i, j| ((i + 1) * (j + 1)) as f64);
//!
//! // Its 8 x 8 crossproduct lives on disk.
//! let mut cp = MatStore::create(
//!     "crossprod.dm",
//!     8,
//!     8,
//!     ElementKind::F64,
//!     CreateOptions::default(),
//! )?;
//! crossprod(x.as_ref(), &mut cp)?;
//!
//! // Estimate its two dominant eigenvalues without loading it back.
//! let mut rng = StdRng::seed_from_u64(42);
//! let top: Vec<f64> = eigen_sym(2, 8, &mut cp, &mut rng)?;
//! assert!(top[0] >= top[1]);
//! # Ok(())
//! # }
//! ```
//!
//! The Lanczos recurrence runs without reorthogonalization, so for larger k
//! the smaller Ritz values drift; the dominant values it is meant for stay
//! accurate. See [`eigen_sym`] for details.

pub mod algorithms;
pub mod element;
pub mod error;
pub mod fillers;
pub mod kernels;
pub mod solvers;
pub mod store;

pub use element::{Element, ElementKind};
pub use error::{Error, Result};
pub use solvers::{crossprod, eigen_sym, scale, svd_values, transpose_crossprod};
pub use store::{CreateOptions, MatStore};
