use std::fmt::Display;

use tracing::{debug, warn};

use crate::{BinCount, Ohlcv, Price, PriceSource, ProfileConfig, ProfileError, Result};

/// One discretized price interval of a volume histogram.
///
/// Bins are stored contiguously and referenced by `index` only, ordered by
/// increasing price.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriceBin {
    index: usize,
    midpoint: Price,
    volume: f64,
}

impl PriceBin {
    #[must_use]
    pub fn new(index: usize, midpoint: Price, volume: f64) -> Self {
        Self {
            index,
            midpoint,
            volume,
        }
    }

    /// Position of the bin, `0` being the lowest price interval.
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Center of the bin's price interval.
    #[inline]
    #[must_use]
    pub fn midpoint(&self) -> Price {
        self.midpoint
    }

    /// Volume accumulated from periods whose membership price fell in the bin.
    #[inline]
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.volume
    }
}

impl Display for PriceBin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bin({}, {}: {})", self.index, self.midpoint, self.volume)
    }
}

/// Volume-by-price histogram.
///
/// The range `[price_min, price_max]` spans the lowest low to the highest
/// high of the series and is cut into equal-width bins. Each bin is
/// half-open, `[lower, upper)`, except the last one which also includes
/// `price_max`. A period's volume lands in the bin containing its
/// membership price (the close, unless configured otherwise).
///
/// Periods whose membership price falls outside the range are dropped and
/// counted in [`dropped_periods`](Histogram::dropped_periods) and
/// [`dropped_volume`](Histogram::dropped_volume); their volume is not part
/// of [`total_volume`](Histogram::total_volume).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Histogram {
    bins: Vec<PriceBin>,
    price_min: Price,
    price_max: Price,
    bin_width: Price,
    dropped_periods: usize,
    dropped_volume: f64,
}

impl Histogram {
    /// Bins ordered by increasing price, indices `0..len()`.
    #[inline]
    #[must_use]
    pub fn bins(&self) -> &[PriceBin] {
        &self.bins
    }

    #[must_use]
    pub fn into_bins(self) -> Vec<PriceBin> {
        self.bins
    }

    /// Number of bins. Never zero.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// Always `false`: a built histogram has at least one bin.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Lowest low of the series.
    #[inline]
    #[must_use]
    pub fn price_min(&self) -> Price {
        self.price_min
    }

    /// Highest high of the series.
    #[inline]
    #[must_use]
    pub fn price_max(&self) -> Price {
        self.price_max
    }

    #[inline]
    #[must_use]
    pub fn bin_width(&self) -> Price {
        self.bin_width
    }

    /// Lower edge of bin `index`; `edge(len())` is `price_max`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    #[must_use]
    pub fn edge(&self, index: usize) -> Price {
        assert!(index <= self.bins.len(), "edge index out of range");
        edge(self.price_min, self.price_max, self.bin_width, index, self.bins.len())
    }

    /// All `len() + 1` edge points, ascending.
    pub fn edges(&self) -> impl Iterator<Item = Price> + '_ {
        (0..=self.bins.len()).map(|i| self.edge(i))
    }

    /// Sum of all bin volumes.
    #[must_use]
    pub fn total_volume(&self) -> f64 {
        self.bins.iter().map(PriceBin::volume).sum()
    }

    /// Number of periods whose membership price fell outside the range.
    #[inline]
    #[must_use]
    pub fn dropped_periods(&self) -> usize {
        self.dropped_periods
    }

    /// Volume carried by the dropped periods.
    #[inline]
    #[must_use]
    pub fn dropped_volume(&self) -> f64 {
        self.dropped_volume
    }

    /// Index of the bin containing `price`, or `None` if it lies outside
    /// `[price_min, price_max]` (or is NaN).
    #[must_use]
    pub fn bin_index(&self, price: Price) -> Option<usize> {
        locate(
            price,
            self.price_min,
            self.price_max,
            self.bin_width,
            self.bins.len(),
        )
    }

    /// Bin containing `price`, see [`bin_index`](Histogram::bin_index).
    #[must_use]
    pub fn bin_at(&self, price: Price) -> Option<&PriceBin> {
        self.bin_index(price).map(|i| &self.bins[i])
    }
}

/// Builds a volume histogram with membership by close price.
///
/// `bins_count` is the number of edge points: the output has
/// `bins_count - 1` bins.
///
/// # Errors
///
/// - [`ProfileError::InvalidParameter`] if `bins_count < 2`, `periods` is
///   empty, a low/high is not finite, or a volume is negative or NaN.
/// - [`ProfileError::DegenerateRange`] if the lowest low equals the highest
///   high.
///
/// # Example
///
/// ```
/// use value_area::{PricePeriod, build_histogram};
///
/// let periods = [
///     PricePeriod::new(10.0, 20.0, 10.0, 12.0, 100.0),
///     PricePeriod::new(12.0, 20.0, 10.0, 15.0, 50.0),
///     PricePeriod::new(15.0, 20.0, 10.0, 20.0, 30.0),
/// ];
///
/// let histogram = build_histogram(&periods, 5).unwrap();
/// let volumes: Vec<f64> = histogram.bins().iter().map(|b| b.volume()).collect();
///
/// assert_eq!(volumes, [100.0, 0.0, 50.0, 30.0]);
/// assert_eq!(histogram.bins()[0].midpoint(), 11.25);
/// ```
pub fn build_histogram(periods: &[impl Ohlcv], bins_count: usize) -> Result<Histogram> {
    build(periods, BinCount::new(bins_count)?, PriceSource::Close)
}

/// Builds a volume histogram using the edge count and membership source of
/// `config`.
///
/// # Errors
///
/// Same as [`build_histogram`], minus the edge count check which `config`
/// has already passed.
pub fn build_histogram_with(periods: &[impl Ohlcv], config: &ProfileConfig) -> Result<Histogram> {
    build(periods, config.bins(), config.source())
}

fn build(periods: &[impl Ohlcv], bins_count: BinCount, source: PriceSource) -> Result<Histogram> {
    let (price_min, price_max) = price_range(periods)?;
    let len = bins_count.intervals();

    #[allow(clippy::cast_precision_loss)]
    let bin_width = (price_max - price_min) / len as f64;

    let mut volumes = vec![0.0; len];
    let mut dropped_periods = 0;
    let mut dropped_volume = 0.0;

    for (i, period) in periods.iter().enumerate() {
        let price = source.extract(period);
        let volume = period.volume();

        if let Some(index) = locate(price, price_min, price_max, bin_width, len) {
            volumes[index] += volume;
        } else {
            warn!(
                period = i,
                price,
                volume,
                price_min,
                price_max,
                %source,
                "membership price outside histogram range, volume dropped"
            );
            dropped_periods += 1;
            dropped_volume += volume;
        }
    }

    let bins: Vec<PriceBin> = volumes
        .into_iter()
        .enumerate()
        .map(|(index, volume)| {
            let lower = edge(price_min, price_max, bin_width, index, len);
            let upper = edge(price_min, price_max, bin_width, index + 1, len);
            PriceBin::new(index, lower + (upper - lower) / 2.0, volume)
        })
        .collect();

    debug!(
        periods = periods.len(),
        bins = len,
        price_min,
        price_max,
        bin_width,
        dropped_periods,
        "built volume histogram"
    );

    Ok(Histogram {
        bins,
        price_min,
        price_max,
        bin_width,
        dropped_periods,
        dropped_volume,
    })
}

/// Validates the series and returns `(min(low), max(high))`.
#[allow(clippy::float_cmp)]
fn price_range(periods: &[impl Ohlcv]) -> Result<(Price, Price)> {
    if periods.is_empty() {
        return Err(ProfileError::invalid("periods", "must not be empty"));
    }

    let mut price_min = f64::INFINITY;
    let mut price_max = f64::NEG_INFINITY;

    for (i, period) in periods.iter().enumerate() {
        let (low, high, volume) = (period.low(), period.high(), period.volume());

        if !low.is_finite() {
            return Err(ProfileError::invalid(
                "low",
                format!("period {i} has non-finite low {low}"),
            ));
        }
        if !high.is_finite() {
            return Err(ProfileError::invalid(
                "high",
                format!("period {i} has non-finite high {high}"),
            ));
        }
        if volume.is_nan() || volume < 0.0 {
            return Err(ProfileError::invalid(
                "volume",
                format!("period {i} has volume {volume}, expected >= 0"),
            ));
        }

        price_min = price_min.min(low);
        price_max = price_max.max(high);
    }

    if price_min == price_max {
        return Err(ProfileError::DegenerateRange { price: price_min });
    }
    if price_min > price_max {
        return Err(ProfileError::invalid(
            "high",
            format!("highest high {price_max} is below lowest low {price_min}"),
        ));
    }
    if !(price_max - price_min).is_finite() {
        return Err(ProfileError::invalid(
            "periods",
            format!("price range {price_min}..{price_max} is too wide to bin"),
        ));
    }

    Ok((price_min, price_max))
}

/// Edge point `index` of `len` bins. The last edge is pinned to `price_max`
/// so the top of the range never drifts with accumulated rounding.
#[inline]
fn edge(price_min: Price, price_max: Price, bin_width: Price, index: usize, len: usize) -> Price {
    if index == len {
        price_max
    } else {
        #[allow(clippy::cast_precision_loss)]
        let offset = index as f64 * bin_width;
        price_min + offset
    }
}

/// Finds the bin whose `[lower, upper)` interval holds `price`; the last bin
/// is closed on both ends. Compares against the computed edges, so a price
/// exactly on an internal edge always goes to the bin above it.
#[allow(clippy::float_cmp)]
fn locate(
    price: Price,
    price_min: Price,
    price_max: Price,
    bin_width: Price,
    len: usize,
) -> Option<usize> {
    if !(price_min..=price_max).contains(&price) {
        return None;
    }

    if price == price_max {
        return Some(len - 1);
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mut index = (((price - price_min) / bin_width) as usize).min(len - 1);

    // Division rounding can land one bin off the edge comparison.
    while index > 0 && price < edge(price_min, price_max, bin_width, index, len) {
        index -= 1;
    }
    while index + 1 < len && price >= edge(price_min, price_max, bin_width, index + 1, len) {
        index += 1;
    }

    Some(index)
}
