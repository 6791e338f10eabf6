//! Shared fixtures: synthetic wine data shaped like the UCI red wine file

#![allow(dead_code)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io::Write;
use tempfile::NamedTempFile;
use wine_quality::dataset::{Dataset, WINE_COLUMNS};

/// Rows whose alcohol and volatile acidity track quality, the rest is noise
pub fn synthetic_rows(n: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (0..n)
        .map(|_| {
            let quality = rng.gen_range(3..=8) as f64;
            let step = quality - 3.0;
            vec![
                rng.gen_range(4.6..15.9),                       // fixed acidity
                1.2 - step * 0.15 + rng.gen_range(0.0..0.1),    // volatile acidity
                rng.gen_range(0.0..1.0),                        // citric acid
                rng.gen_range(0.9..15.5),                       // residual sugar
                rng.gen_range(0.012..0.611),                    // chlorides
                rng.gen_range(1.0f64..72.0).round(),               // free sulfur dioxide
                rng.gen_range(6.0f64..289.0).round(),              // total sulfur dioxide
                rng.gen_range(0.990..1.004),                    // density
                rng.gen_range(2.74..4.01),                      // pH
                rng.gen_range(0.33..2.0),                       // sulphates
                8.4 + step * 1.1 + rng.gen_range(0.0..0.5),     // alcohol
                quality,
            ]
        })
        .collect()
}

pub fn wine_columns() -> Vec<String> {
    WINE_COLUMNS.iter().map(|s| s.to_string()).collect()
}

pub fn synthetic_dataset(n: usize, seed: u64) -> Dataset {
    Dataset::from_rows(wine_columns(), &synthetic_rows(n, seed)).unwrap()
}

/// Write rows in the UCI layout: `;` separated with quoted headers
pub fn write_uci_csv(rows: &[Vec<f64>]) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();

    let header: Vec<String> = WINE_COLUMNS.iter().map(|c| format!("\"{}\"", c)).collect();
    writeln!(file, "{}", header.join(";")).unwrap();
    for row in rows {
        let fields: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        writeln!(file, "{}", fields.join(";")).unwrap();
    }
    file.flush().unwrap();
    file
}
