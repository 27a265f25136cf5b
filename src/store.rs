//! The disk-resident row store.
//!
//! A [`MatStore`] is a logical 2-D array of `m` rows by `n` columns of a
//! single element kind, backed by a flat little-endian file with a
//! self-describing header. Shape and element kind are fixed at creation and
//! introspected on open; every region access is bounds-checked against the
//! declared dimensions.
//!
//! Access is positioned and rectangular: a full-width region is served by one
//! positioned read or write, a column sub-slab by one positioned call per
//! row. Nothing is cached; callers that need several rows should request them
//! as one region instead of issuing single-row calls in a loop.
//!
//! The store is exclusively owned by whoever created or opened it. The
//! streaming engines only borrow a handle for the duration of one operation
//! and never close it.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::element::{Element, ElementKind};
use crate::error::{ErrorKind, Result};

const MAGIC: [u8; 8] = *b"DISKMAT\0";
const FORMAT_VERSION: u32 = 1;
/// magic + version + element width + nrows + ncols + chunk hint + padding.
const HEADER_LEN: u64 = 8 + 4 + 4 + 8 + 8 + 4 + 4;

/// Creation-time layout parameters.
///
/// The chunk-rows hint is recorded in the header for consumers that want to
/// size their batched reads; the payload itself is stored flat and
/// uncompressed.
#[derive(Debug, Clone, Copy)]
pub struct CreateOptions {
    /// Preferred number of rows per batched access. Zero means "no
    /// preference"; accessors fall back to single rows.
    pub chunk_rows: u32,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self { chunk_rows: 1 }
    }
}

/// A disk-resident `m x n` matrix of one element kind.
pub struct MatStore {
    file: File,
    path: PathBuf,
    nrows: u64,
    ncols: u64,
    kind: ElementKind,
    chunk_rows: u32,
}

impl MatStore {
    /// Creates a new store of `nrows x ncols` elements of `kind`, replacing
    /// any existing file at `path`. The payload starts out as all zeros.
    pub fn create(
        path: impl AsRef<Path>,
        nrows: usize,
        ncols: usize,
        kind: ElementKind,
        options: CreateOptions,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        let mut header = [0u8; HEADER_LEN as usize];
        header[0..8].copy_from_slice(&MAGIC);
        header[8..12].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
        header[12..16].copy_from_slice(&(kind.width() as u32).to_le_bytes());
        header[16..24].copy_from_slice(&(nrows as u64).to_le_bytes());
        header[24..32].copy_from_slice(&(ncols as u64).to_le_bytes());
        header[32..36].copy_from_slice(&options.chunk_rows.to_le_bytes());
        file.write_all(&header)?;

        let payload = (nrows as u64) * (ncols as u64) * kind.width() as u64;
        file.set_len(HEADER_LEN + payload)?;

        log::debug!(
            "created store {path:?}: {nrows}x{ncols} {kind}, chunk hint {}",
            options.chunk_rows
        );

        Ok(Self {
            file,
            path,
            nrows: nrows as u64,
            ncols: ncols as u64,
            kind,
            chunk_rows: options.chunk_rows,
        })
    }

    /// Opens an existing store, introspecting its persisted shape and element
    /// width from the header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new().read(true).write(true).open(&path)?;

        let mut header = [0u8; HEADER_LEN as usize];
        file.read_exact(&mut header)?;

        if header[0..8] != MAGIC {
            return Err(ErrorKind::InvalidFormat(format!("{path:?} has no store magic")).into());
        }
        let version = u32::from_le_bytes(header[8..12].try_into().unwrap());
        if version != FORMAT_VERSION {
            return Err(
                ErrorKind::InvalidFormat(format!("unknown format version {version}")).into(),
            );
        }
        let width = u32::from_le_bytes(header[12..16].try_into().unwrap());
        let kind = ElementKind::from_width(width).ok_or_else(|| {
            crate::error::Error::from(ErrorKind::InvalidFormat(format!(
                "unsupported element width {width}"
            )))
        })?;
        let nrows = u64::from_le_bytes(header[16..24].try_into().unwrap());
        let ncols = u64::from_le_bytes(header[24..32].try_into().unwrap());
        let chunk_rows = u32::from_le_bytes(header[32..36].try_into().unwrap());

        let expected = HEADER_LEN + nrows * ncols * kind.width() as u64;
        let actual = file.metadata()?.len();
        if actual != expected {
            return Err(ErrorKind::InvalidFormat(format!(
                "payload length {actual} does not match declared {nrows}x{ncols} {kind} shape"
            ))
            .into());
        }

        log::debug!("opened store {path:?}: {nrows}x{ncols} {kind}");

        Ok(Self {
            file,
            path,
            nrows,
            ncols,
            kind,
            chunk_rows,
        })
    }

    /// Declared shape, `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows as usize, self.ncols as usize)
    }

    pub fn nrows(&self) -> usize {
        self.nrows as usize
    }

    pub fn ncols(&self) -> usize {
        self.ncols as usize
    }

    /// The element kind persisted at creation time.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Chunk-rows hint recorded at creation time.
    pub fn chunk_rows(&self) -> u32 {
        self.chunk_rows
    }

    /// Flushes and closes the store. Dropping without calling this is also
    /// safe; `close` only adds the explicit fsync.
    pub fn close(self) -> Result<()> {
        self.file.sync_all()?;
        log::debug!("closed store {:?}", self.path);
        Ok(())
    }

    /// Reads a rectangular region into `buf`, which must hold exactly
    /// `row_count * col_count` elements.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is not sized to the requested region; that is a caller
    /// bug, not a runtime condition.
    pub fn read_rows_into<T: Element>(
        &mut self,
        row_start: usize,
        row_count: usize,
        col_start: usize,
        col_count: usize,
        buf: &mut [T],
    ) -> Result<()> {
        self.check_kind::<T>()?;
        self.check_region(row_start, row_count, col_start, col_count)?;
        assert_eq!(
            buf.len(),
            row_count * col_count,
            "destination buffer does not match the requested region"
        );

        let width = T::WIDTH;
        if col_start == 0 && col_count == self.ncols as usize {
            // Contiguous rows: one positioned read for the whole region.
            let mut bytes = vec![0u8; row_count * col_count * width];
            self.file
                .seek(SeekFrom::Start(self.byte_offset(row_start, 0)))?;
            self.file.read_exact(&mut bytes)?;
            decode(&bytes, buf);
        } else {
            let mut bytes = vec![0u8; col_count * width];
            for r in 0..row_count {
                self.file
                    .seek(SeekFrom::Start(self.byte_offset(row_start + r, col_start)))?;
                self.file.read_exact(&mut bytes)?;
                decode(&bytes, &mut buf[r * col_count..(r + 1) * col_count]);
            }
        }
        Ok(())
    }

    /// Allocating convenience wrapper around [`Self::read_rows_into`].
    pub fn read_rows<T: Element>(
        &mut self,
        row_start: usize,
        row_count: usize,
        col_start: usize,
        col_count: usize,
    ) -> Result<Vec<T>> {
        let mut buf = vec![<T as Element>::zero(); row_count * col_count];
        self.read_rows_into(row_start, row_count, col_start, col_count, &mut buf)?;
        Ok(buf)
    }

    /// Writes a rectangular region from `data`, which must hold exactly
    /// `row_count * col_count` elements in row-major order.
    ///
    /// # Panics
    ///
    /// Panics if `data` is not sized to the requested region.
    pub fn write_rows<T: Element>(
        &mut self,
        row_start: usize,
        row_count: usize,
        col_start: usize,
        col_count: usize,
        data: &[T],
    ) -> Result<()> {
        self.check_kind::<T>()?;
        self.check_region(row_start, row_count, col_start, col_count)?;
        assert_eq!(
            data.len(),
            row_count * col_count,
            "source buffer does not match the requested region"
        );

        let width = T::WIDTH;
        if col_start == 0 && col_count == self.ncols as usize {
            let mut bytes = vec![0u8; data.len() * width];
            encode(data, &mut bytes);
            self.file
                .seek(SeekFrom::Start(self.byte_offset(row_start, 0)))?;
            self.file.write_all(&bytes)?;
        } else {
            let mut bytes = vec![0u8; col_count * width];
            for r in 0..row_count {
                encode(&data[r * col_count..(r + 1) * col_count], &mut bytes);
                self.file
                    .seek(SeekFrom::Start(self.byte_offset(row_start + r, col_start)))?;
                self.file.write_all(&bytes)?;
            }
        }
        Ok(())
    }

    fn byte_offset(&self, row: usize, col: usize) -> u64 {
        HEADER_LEN + (row as u64 * self.ncols + col as u64) * self.kind.width() as u64
    }

    fn check_kind<T: Element>(&self) -> Result<()> {
        if T::KIND != self.kind {
            return Err(ErrorKind::ElementMismatch {
                stored: self.kind,
                requested: T::KIND,
            }
            .into());
        }
        Ok(())
    }

    fn check_region(
        &self,
        row_start: usize,
        row_count: usize,
        col_start: usize,
        col_count: usize,
    ) -> Result<()> {
        let row_end = row_start as u64 + row_count as u64;
        let col_end = col_start as u64 + col_count as u64;
        if row_end > self.nrows || col_end > self.ncols {
            return Err(ErrorKind::OutOfBounds {
                row_start: row_start as u64,
                row_end,
                col_start: col_start as u64,
                col_end,
                nrows: self.nrows,
                ncols: self.ncols,
            }
            .into());
        }
        Ok(())
    }
}

impl std::fmt::Debug for MatStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatStore")
            .field("path", &self.path)
            .field("nrows", &self.nrows)
            .field("ncols", &self.ncols)
            .field("kind", &self.kind)
            .finish()
    }
}

fn decode<T: Element>(bytes: &[u8], out: &mut [T]) {
    for (chunk, slot) in bytes.chunks_exact(T::WIDTH).zip(out.iter_mut()) {
        *slot = T::read_le(chunk);
    }
}

fn encode<T: Element>(data: &[T], out: &mut [u8]) {
    for (&value, chunk) in data.iter().zip(out.chunks_exact_mut(T::WIDTH)) {
        value.write_le(chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        (dir, path)
    }

    #[test]
    fn create_then_open_introspects_shape_and_kind() -> Result<()> {
        let (_dir, path) = scratch("shape.dm");
        let store = MatStore::create(&path, 3, 5, ElementKind::F32, CreateOptions::default())?;
        store.close()?;

        let reopened = MatStore::open(&path)?;
        assert_eq!(reopened.shape(), (3, 5));
        assert_eq!(reopened.kind(), ElementKind::F32);
        Ok(())
    }

    #[test]
    fn fresh_store_reads_back_zeros() -> Result<()> {
        let (_dir, path) = scratch("zeros.dm");
        let mut store = MatStore::create(&path, 2, 4, ElementKind::F64, CreateOptions::default())?;
        let data: Vec<f64> = store.read_rows(0, 2, 0, 4)?;
        assert!(data.iter().all(|&v| v == 0.0));
        Ok(())
    }

    #[test]
    fn write_read_round_trip_is_bit_identical() -> Result<()> {
        let (_dir, path) = scratch("roundtrip.dm");
        let mut store = MatStore::create(&path, 2, 3, ElementKind::F64, CreateOptions::default())?;
        let data = [1.0f64, -2.5, 3.0e-300, 4.0, 5.0, f64::MIN_POSITIVE];
        store.write_rows(0, 2, 0, 3, &data)?;
        let back: Vec<f64> = store.read_rows(0, 2, 0, 3)?;
        assert_eq!(back, data);
        Ok(())
    }

    #[test]
    fn column_sub_slab_addresses_the_right_elements() -> Result<()> {
        let (_dir, path) = scratch("subslab.dm");
        let mut store = MatStore::create(&path, 3, 3, ElementKind::F64, CreateOptions::default())?;
        let data: Vec<f64> = (0..9).map(|v| v as f64).collect();
        store.write_rows(0, 3, 0, 3, &data)?;

        // Middle column of rows 1..3.
        let sub: Vec<f64> = store.read_rows(1, 2, 1, 1)?;
        assert_eq!(sub, vec![4.0, 7.0]);

        store.write_rows(2, 1, 2, 1, &[-1.0f64])?;
        let last: Vec<f64> = store.read_rows(2, 1, 0, 3)?;
        assert_eq!(last, vec![6.0, 7.0, -1.0]);
        Ok(())
    }

    #[test]
    fn out_of_bounds_region_is_rejected() -> Result<()> {
        let (_dir, path) = scratch("bounds.dm");
        let mut store = MatStore::create(&path, 4, 4, ElementKind::F64, CreateOptions::default())?;
        let err = store.read_rows::<f64>(2, 3, 0, 4).unwrap_err();
        assert!(err.is_bounds());
        let err = store.write_rows(0, 1, 3, 2, &[0.0f64, 0.0]).unwrap_err();
        assert!(err.is_bounds());
        Ok(())
    }

    #[test]
    fn element_kind_mismatch_is_rejected() -> Result<()> {
        let (_dir, path) = scratch("kind.dm");
        let mut store = MatStore::create(&path, 2, 2, ElementKind::F64, CreateOptions::default())?;
        assert!(store.read_rows::<f32>(0, 1, 0, 2).is_err());
        Ok(())
    }

    #[test]
    fn truncated_file_fails_to_open() -> Result<()> {
        let (_dir, path) = scratch("truncated.dm");
        let store = MatStore::create(&path, 4, 4, ElementKind::F64, CreateOptions::default())?;
        store.close()?;
        let full = std::fs::metadata(&path).unwrap().len();
        let file = OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len(full - 8).unwrap();
        assert!(MatStore::open(&path).is_err());
        Ok(())
    }
}
