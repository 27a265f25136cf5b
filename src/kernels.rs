//! Small slice-based numeric kernels shared by the streaming engines.
//!
//! These helpers operate on buffers that are already bounded (a single row or
//! a single basis vector), so they stay simple sequential loops. Reduction
//! order for the dot-product sum is unspecified and callers must not rely on
//! a particular association.

use crate::element::Element;

/// Dot product of two equal-length slices.
#[inline]
pub fn dot<T: Element>(x: &[T], y: &[T]) -> T {
    debug_assert_eq!(x.len(), y.len());
    let mut acc = <T as Element>::zero();
    for (&a, &b) in x.iter().zip(y.iter()) {
        acc += a * b;
    }
    acc
}

/// Euclidean norm of a slice.
#[inline]
pub fn l2norm<T: Element>(x: &[T]) -> T {
    dot(x, x).sqrt()
}

/// `v += c * x`, the update form used by the three-term recurrence.
#[inline]
pub fn axpy<T: Element>(c: T, x: &[T], v: &mut [T]) {
    debug_assert_eq!(x.len(), v.len());
    for (vj, &xj) in v.iter_mut().zip(x.iter()) {
        *vj += c * xj;
    }
}

/// Multiplies every element of `x` by `factor` in place.
#[inline]
pub fn scale_slice<T: Element>(x: &mut [T], factor: T) {
    for xj in x.iter_mut() {
        *xj *= factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_matches_hand_computation() {
        let x = [1.0f64, 2.0, 3.0];
        let y = [4.0f64, -5.0, 6.0];
        assert_eq!(dot(&x, &y), 4.0 - 10.0 + 18.0);
    }

    #[test]
    fn l2norm_of_pythagorean_triple() {
        let x = [3.0f64, 4.0];
        assert_eq!(l2norm(&x), 5.0);
    }

    #[test]
    fn axpy_accumulates() {
        let x = [1.0f32, 2.0];
        let mut v = [10.0f32, 20.0];
        axpy(-2.0, &x, &mut v);
        assert_eq!(v, [8.0, 16.0]);
    }

    #[test]
    fn scale_by_one_is_identity() {
        let mut x = [0.1f64, -7.25, 3.5e-300];
        let before = x;
        scale_slice(&mut x, 1.0);
        assert_eq!(x, before);
    }
}
