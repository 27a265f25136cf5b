//! Element kinds supported by the disk store, and the [`Element`] trait that
//! carries a matrix operation's working precision.
//!
//! The store persists one of two IEEE binary floating point kinds, both
//! little-endian. Precision is selected exactly once, at the public entry
//! point, by instantiating the generic operation with `f32` or `f64`; every
//! internal buffer and the destination store then share that kind. The store
//! verifies at access time that the requested [`Element`] matches its
//! persisted width.

use core::fmt::Debug;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use faer::traits::RealField;

/// The element kind persisted in a store's header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// 32-bit IEEE binary floating point, little-endian.
    F32,
    /// 64-bit IEEE binary floating point, little-endian.
    F64,
}

impl ElementKind {
    /// Width of one element in bytes.
    pub const fn width(self) -> usize {
        match self {
            ElementKind::F32 => 4,
            ElementKind::F64 => 8,
        }
    }

    /// Decodes a persisted element width. Any other width is an unsupported
    /// store.
    pub(crate) const fn from_width(width: u32) -> Option<Self> {
        match width {
            4 => Some(ElementKind::F32),
            8 => Some(ElementKind::F64),
            _ => None,
        }
    }
}

impl core::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ElementKind::F32 => write!(f, "f32"),
            ElementKind::F64 => write!(f, "f64"),
        }
    }
}

/// A real scalar the streaming engines can work in.
///
/// Implemented for `f32` and `f64` only. The `RealField` supertrait lets the
/// same type parameter drive `faer::Mat` storage, the crossproduct GEMV, and
/// the dense tridiagonal eigensolve.
pub trait Element:
    RealField
    + Copy
    + PartialOrd
    + Debug
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
{
    /// The runtime tag matching this type, checked against the store header.
    const KIND: ElementKind;
    /// Width of the little-endian encoding in bytes.
    const WIDTH: usize;

    fn zero() -> Self;
    fn one() -> Self;

    /// Narrowing conversion used by fillers and the random start vector.
    fn from_f64(v: f64) -> Self;
    fn to_f64(self) -> f64;

    fn sqrt(self) -> Self;

    /// Decodes one element from its little-endian byte representation.
    /// `bytes` must hold at least [`Self::WIDTH`] bytes.
    fn read_le(bytes: &[u8]) -> Self;

    /// Encodes one element into `out`, which must hold at least
    /// [`Self::WIDTH`] bytes.
    fn write_le(self, out: &mut [u8]);
}

impl Element for f32 {
    const KIND: ElementKind = ElementKind::F32;
    const WIDTH: usize = 4;

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn one() -> Self {
        1.0
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        f32::from_le_bytes(bytes[..4].try_into().unwrap())
    }

    #[inline]
    fn write_le(self, out: &mut [u8]) {
        out[..4].copy_from_slice(&self.to_le_bytes());
    }
}

impl Element for f64 {
    const KIND: ElementKind = ElementKind::F64;
    const WIDTH: usize = 8;

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn one() -> Self {
        1.0
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        f64::from_le_bytes(bytes[..8].try_into().unwrap())
    }

    #[inline]
    fn write_le(self, out: &mut [u8]) {
        out[..8].copy_from_slice(&self.to_le_bytes());
    }
}
