//! Volume profile levels for OHLCV price series.
//!
//! The profile is computed in two pure steps connected by a plain slice of
//! [`PriceBin`]s:
//!
//! 1. [`build_histogram`] discretizes the series' low/high range into
//!    equal-width bins and accumulates each period's volume into the bin
//!    containing its close.
//! 2. [`resolve_value_area`] picks the Point of Control (the heaviest bin)
//!    and greedily grows the Value Area around it until it encloses the
//!    target share of volume.
//!
//! [`VolumeProfile`] runs both from a [`ProfileConfig`] and exposes the
//! three levels (POC, VAH, VAL) and the classified bins used to draw the
//! histogram.
//!
//! Nothing here does I/O or holds shared state: outputs are a deterministic
//! function of the series and the config.
//!
//! # Example
//!
//! ```
//! use value_area::{PricePeriod, ProfileConfig, VolumeProfile};
//!
//! let periods: Vec<PricePeriod> = (0..30)
//!     .map(|i| {
//!         let close = 100.0 + f64::from(i % 7);
//!         PricePeriod::new(close, close + 1.0, close - 1.0, close, 1_000.0)
//!     })
//!     .collect();
//!
//! let config = ProfileConfig::new(9, 0.7).unwrap();
//! let profile = VolumeProfile::compute(&periods, &config).unwrap();
//! let va = profile.value_area();
//!
//! assert!(va.val_index() <= va.poc_index() && va.poc_index() <= va.vah_index());
//! assert!(va.covered_volume() >= va.target_volume());
//! ```

mod config;
mod error;
mod histogram;
mod ohlcv;
mod price_source;
mod profile;
mod value_area;

pub use crate::config::{BinCount, ProfileConfig, ProfileConfigBuilder, TargetFraction};
pub use crate::error::{ProfileError, Result};
pub use crate::ohlcv::{Ohlcv, Price, PricePeriod};
pub use crate::price_source::PriceSource;

pub use crate::histogram::{Histogram, PriceBin, build_histogram, build_histogram_with};
pub use crate::profile::VolumeProfile;
pub use crate::value_area::{
    BinClass, ClassifiedBin, Direction, Expansion, ExpansionStep, InsufficientCoverage, Levels,
    PricePosition, ValueArea, resolve_value_area,
};

#[cfg(test)]
mod test_util;

