//! Bulk initialization of a store's contents, one row slab at a time.

use rand::Rng;

use crate::element::Element;
use crate::error::Result;
use crate::store::MatStore;

/// Sets every element of the store to `value`.
pub fn fill_value<T: Element>(store: &mut MatStore, value: T) -> Result<()> {
    let (m, n) = store.shape();
    let row = vec![value; n];
    for i in 0..m {
        store.write_rows(i, 1, 0, n, &row)?;
    }
    Ok(())
}

/// Fills the store with `m * n` evenly spaced values from `start` to `stop`
/// inclusive, laid out in column-major index order: the element at `(i, j)`
/// is `start + step * (i + m * j)`.
pub fn fill_linspace<T: Element>(store: &mut MatStore, start: T, stop: T) -> Result<()> {
    let (m, n) = store.shape();
    let total = m * n;
    let step = if total <= 1 {
        <T as Element>::zero()
    } else {
        (stop - start) / T::from_f64((total - 1) as f64)
    };

    let mut row = vec![<T as Element>::zero(); n];
    for i in 0..m {
        for (j, slot) in row.iter_mut().enumerate() {
            *slot = start + step * T::from_f64((i + m * j) as f64);
        }
        store.write_rows(i, 1, 0, n, &row)?;
    }
    Ok(())
}

/// Fills the store with independent draws from the uniform distribution on
/// `[min, max)`, in row-major generation order.
pub fn fill_uniform<T: Element, R: Rng + ?Sized>(
    store: &mut MatStore,
    min: T,
    max: T,
    rng: &mut R,
) -> Result<()> {
    let (m, n) = store.shape();
    let span = max - min;
    let mut row = vec![<T as Element>::zero(); n];
    for i in 0..m {
        for slot in row.iter_mut() {
            *slot = min + span * T::from_f64(rng.random::<f64>());
        }
        store.write_rows(i, 1, 0, n, &row)?;
    }
    Ok(())
}

/// Writes `values` cyclically along the main diagonal of the `min(m, n)`
/// prefix, one positioned element at a time. Off-diagonal elements are left
/// as they are.
pub fn fill_diagonal<T: Element>(store: &mut MatStore, values: &[T]) -> Result<()> {
    assert!(!values.is_empty(), "diagonal fill needs at least one value");
    let (m, n) = store.shape();
    let len = m.min(n);
    for i in 0..len {
        let cell = [values[i % values.len()]];
        store.write_rows(i, 1, i, 1, &cell)?;
    }
    Ok(())
}
