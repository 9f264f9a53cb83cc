/// A price value.
///
/// Semantic alias for [`f64`]. Documents intent in function signatures
/// without introducing newtype construction overhead.
pub type Price = f64;

/// OHLCV bar data consumed by the histogram builder.
///
/// Implement this on your own kline/candle type to avoid per-bar
/// conversion. The builder accepts `&[impl Ohlcv]` and reads the low/high
/// extremes for bin edges and the configured [`PriceSource`] for bin
/// membership.
///
/// Periods are expected in chronological order, but only
/// [`VolumeProfile::last_close_position`] depends on it: the profile itself
/// is price-indexed, so duplicates and time gaps are tolerated.
///
/// [`PriceSource`]: crate::PriceSource
/// [`VolumeProfile::last_close_position`]: crate::VolumeProfile::last_close_position
///
/// # Example
///
/// ```
/// use value_area::{Ohlcv, Price};
///
/// struct MyKline {
///     o: f64, h: f64, l: f64, c: f64,
///     v: f64,
/// }
///
/// impl Ohlcv for MyKline {
///     fn open(&self) -> Price { self.o }
///     fn high(&self) -> Price { self.h }
///     fn low(&self) -> Price { self.l }
///     fn close(&self) -> Price { self.c }
///     fn volume(&self) -> f64 { self.v }
/// }
/// ```
pub trait Ohlcv {
    /// Opening price of the period.
    fn open(&self) -> Price;

    /// Highest price during the period.
    fn high(&self) -> Price;

    /// Lowest price during the period.
    fn low(&self) -> Price;

    /// Closing price of the period.
    fn close(&self) -> Price;

    /// Traded volume during the period. Must be non-negative.
    fn volume(&self) -> f64;
}

/// One traded interval.
///
/// Owned implementation of [`Ohlcv`] for callers that don't have a candle
/// type of their own. `close` is expected to lie in `[low, high]`, but this
/// is not enforced.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricePeriod {
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: f64,
}

impl PricePeriod {
    #[must_use]
    pub fn new(open: Price, high: Price, low: Price, close: Price, volume: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl Ohlcv for PricePeriod {
    #[inline]
    fn open(&self) -> Price {
        self.open
    }

    #[inline]
    fn high(&self) -> Price {
        self.high
    }

    #[inline]
    fn low(&self) -> Price {
        self.low
    }

    #[inline]
    fn close(&self) -> Price {
        self.close
    }

    #[inline]
    fn volume(&self) -> f64 {
        self.volume
    }
}
