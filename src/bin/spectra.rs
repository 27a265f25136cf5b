//! Spectral summary of a random data matrix, end to end through the disk
//! store.
//!
//! Generates a seeded m x n data matrix, forms its crossproduct on disk,
//! estimates the top-k eigenvalues of the crossproduct and the top-k singular
//! values of the data matrix itself, and writes both estimates side by side
//! to a CSV. For exact arithmetic each eigenvalue of x^T x is the square of
//! the matching singular value of x, so the output doubles as a quick
//! consistency check of the two estimation paths.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use diskmat::fillers::fill_uniform;
use diskmat::{CreateOptions, Element, MatStore, crossprod, eigen_sym, svd_values};
use faer::Mat;
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use std::path::PathBuf;

/// Working precision for the stores and all arithmetic.
#[derive(ValueEnum, Clone, Debug, Copy)]
enum Precision {
    F32,
    F64,
}

#[derive(Parser, Debug)]
#[clap(
    name = "spectra",
    about = "Estimates dominant eigen and singular values of a random matrix through disk-backed stores."
)]
struct SpectraArgs {
    /// Number of rows of the data matrix.
    #[clap(long, default_value_t = 500)]
    m: usize,

    /// Number of columns of the data matrix.
    #[clap(long, default_value_t = 50)]
    n: usize,

    /// Number of dominant values to estimate.
    #[clap(long, default_value_t = 5)]
    k: usize,

    /// Element width of the stores.
    #[clap(long, value_enum, default_value = "f64")]
    precision: Precision,

    /// Seed for the data matrix and the Lanczos start vectors.
    #[clap(long, default_value_t = 42)]
    seed: u64,

    /// Directory where the intermediate store files are created.
    #[clap(long, value_name = "DIR", default_value = ".")]
    work_dir: PathBuf,

    /// Path to the output CSV file.
    #[clap(long, value_name = "PATH")]
    output: PathBuf,
}

/// One row of the output CSV.
#[derive(Debug, Serialize)]
struct SpectraRow {
    /// Rank of the estimate, 1 being the dominant value.
    rank: usize,
    /// Estimated eigenvalue of x^T x.
    eigenvalue: f64,
    /// Estimated singular value of x.
    singular_value: f64,
    /// Squared singular value, comparable to the eigenvalue column.
    singular_value_squared: f64,
}

fn run<T: Element>(args: &SpectraArgs) -> Result<Vec<SpectraRow>> {
    let mut rng = StdRng::seed_from_u64(args.seed);

    // The source data lives in its own store so svd_values can stream it.
    let mut data = MatStore::create(
        args.work_dir.join("spectra-data.dm"),
        args.m,
        args.n,
        T::KIND,
        CreateOptions::default(),
    )?;
    fill_uniform(&mut data, T::from_f64(-1.0), T::from_f64(1.0), &mut rng)?;

    log::info!(
        "Forming the {n} x {n} crossproduct of the {m} x {n} data matrix...",
        m = args.m,
        n = args.n
    );
    let rows: Vec<T> = data.read_rows(0, args.m, 0, args.n)?;
    let x = Mat::from_fn(args.m, args.n, |i, j| rows[i * args.n + j]);
    let mut cp = MatStore::create(
        args.work_dir.join("spectra-crossprod.dm"),
        args.n,
        args.n,
        T::KIND,
        CreateOptions::default(),
    )?;
    crossprod(x.as_ref(), &mut cp)?;

    log::info!("Estimating the top {} values, k row sweeps each...", args.k);
    let eigenvalues: Vec<T> = eigen_sym(args.k, args.n, &mut cp, &mut rng)?;
    let singular_values: Vec<T> = svd_values(args.k, args.m, args.n, &mut data, &mut rng)?;

    data.close()?;
    cp.close()?;

    Ok(eigenvalues
        .iter()
        .zip(&singular_values)
        .enumerate()
        .map(|(i, (&e, &s))| SpectraRow {
            rank: i + 1,
            eigenvalue: e.to_f64(),
            singular_value: s.to_f64(),
            singular_value_squared: s.to_f64() * s.to_f64(),
        })
        .collect())
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .try_init()?;
    let args = SpectraArgs::parse();
    log::info!(
        "Starting spectral summary: {} x {}, k = {}, precision {:?}",
        args.m,
        args.n,
        args.k,
        args.precision
    );

    let results = match args.precision {
        Precision::F32 => run::<f32>(&args)?,
        Precision::F64 => run::<f64>(&args)?,
    };

    log::info!("Writing results to {:?}...", &args.output);
    let mut writer = csv::Writer::from_path(&args.output)?;
    for record in results {
        writer.serialize(record)?;
    }
    writer.flush()?;

    log::info!("Spectral summary complete.");
    Ok(())
}
