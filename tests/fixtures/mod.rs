#![allow(dead_code)]

use serde::{Deserialize, de::DeserializeOwned};
use value_area::{Ohlcv, Price};

/// Daily OHLCV bar parsed from CSV.
#[derive(Debug, Clone, Deserialize)]
pub struct RefBar {
    pub open_time: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Ohlcv for RefBar {
    fn open(&self) -> Price {
        self.open
    }

    fn high(&self) -> Price {
        self.high
    }

    fn low(&self) -> Price {
        self.low
    }

    fn close(&self) -> Price {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }
}

/// Reference value area for one `(bins_count, target_fraction)` pair.
#[derive(Debug, Deserialize)]
pub struct RefValueArea {
    pub bins_count: usize,
    pub target_fraction: f64,
    pub poc_index: usize,
    pub val_index: usize,
    pub vah_index: usize,
    pub poc_price: f64,
    pub val_price: f64,
    pub vah_price: f64,
    pub covered_volume: f64,
    pub total_volume: f64,
    pub insufficient: bool,
}

const OHLCV_PATH: &str = "tests/fixtures/data/ohlcv-1d.csv";

/// Load reference OHLCV bars.
pub fn load_reference_ohlcvs() -> Vec<RefBar> {
    load_records(OHLCV_PATH, "invalid OHLCV record")
}

/// Load value area reference data.
pub fn load_value_area_ref(path: &str) -> Vec<RefValueArea> {
    load_records(path, "invalid value area reference record")
}

/// Assert two f64 values are within tolerance.
pub fn assert_near(actual: f64, expected: f64, tolerance: f64, context: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{context}: expected {expected:.10}, got {actual:.10}, diff {diff:.2e} > tolerance {tolerance:.2e}"
    );
}

/// Deterministic permutation of `bars` (Fisher-Yates driven by an LCG).
pub fn shuffled(bars: &[RefBar], seed: u64) -> Vec<RefBar> {
    let mut out = bars.to_vec();
    let mut state = seed;
    for i in (1..out.len()).rev() {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        #[allow(clippy::cast_possible_truncation)]
        let j = ((state >> 33) % (i as u64 + 1)) as usize;
        out.swap(i, j);
    }
    out
}

fn load_records<D>(path: &str, expect_msg: &str) -> Vec<D>
where
    D: DeserializeOwned,
{
    let mut rdr =
        csv::Reader::from_path(path).unwrap_or_else(|e| panic!("failed to open {path}: {e}"));

    rdr.deserialize().map(|r| r.expect(expect_msg)).collect()
}
