use std::{
    fmt::Display,
    hash::{Hash, Hasher},
};

use crate::{PriceSource, ProfileError, Result};

/// Number of histogram edge points.
///
/// A count of `n` edges partitions the price range into `n - 1` bins, so
/// the smallest meaningful value is `2`. Defaults to `100`.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct BinCount(usize);

impl BinCount {
    /// Creates a new edge count.
    ///
    /// # Errors
    ///
    /// [`ProfileError::InvalidParameter`] if `value < 2`.
    pub fn new(value: usize) -> Result<Self> {
        if value < 2 {
            return Err(ProfileError::invalid(
                "bins_count",
                format!("must be at least 2, got {value}"),
            ));
        }
        Ok(Self(value))
    }

    /// Number of edge points.
    #[inline]
    #[must_use]
    pub fn get(self) -> usize {
        self.0
    }

    /// Number of bins produced: one less than the edge count.
    #[inline]
    #[must_use]
    pub fn intervals(self) -> usize {
        self.0 - 1
    }
}

impl Default for BinCount {
    fn default() -> Self {
        Self(100)
    }
}

/// Share of total volume the value area must enclose.
///
/// Wraps a finite `f64` strictly between `0` and `1`. Defaults to `0.7`.
///
/// Implements `Eq` and `Hash` via bit-level comparison, which is safe because
/// NaN is rejected at construction.
#[derive(Clone, Copy, Debug)]
pub struct TargetFraction(f64);

impl TargetFraction {
    /// Creates a new target fraction.
    ///
    /// # Errors
    ///
    /// [`ProfileError::InvalidParameter`] if `value` is NaN or outside `(0, 1)`.
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() {
            return Err(ProfileError::invalid("target_fraction", "must not be NaN"));
        }
        if value <= 0.0 || value >= 1.0 {
            return Err(ProfileError::invalid(
                "target_fraction",
                format!("must be strictly between 0 and 1, got {value}"),
            ));
        }
        Ok(Self(value))
    }

    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for TargetFraction {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for TargetFraction {}

impl Hash for TargetFraction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl Default for TargetFraction {
    fn default() -> Self {
        Self(0.7)
    }
}

/// Parameters of a volume profile computation.
///
/// Configs are value types: cheap to copy, compare, and hash. Together with
/// the input series they fully determine the output, which makes them
/// suitable as part of a cache key.
///
/// # Example
///
/// ```
/// use value_area::{PriceSource, ProfileConfig};
///
/// let config = ProfileConfig::builder()
///     .bins(50)
///     .target_fraction(0.8)
///     .source(PriceSource::HLC3)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.bins().intervals(), 49);
/// assert_eq!(config.to_string(), "ProfileConfig(50, 0.8, HLC3)");
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Default)]
pub struct ProfileConfig {
    bins: BinCount,
    target: TargetFraction,
    source: PriceSource,
}

impl ProfileConfig {
    /// Returns a new builder with default values.
    #[must_use]
    pub fn builder() -> ProfileConfigBuilder {
        ProfileConfigBuilder::new()
    }

    /// Config with the given edge count and target fraction, membership by
    /// close price.
    ///
    /// # Errors
    ///
    /// [`ProfileError::InvalidParameter`] if either value is out of range.
    pub fn new(bins_count: usize, target_fraction: f64) -> Result<Self> {
        Self::builder()
            .bins(bins_count)
            .target_fraction(target_fraction)
            .build()
    }

    #[inline]
    #[must_use]
    pub fn bins(&self) -> BinCount {
        self.bins
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> TargetFraction {
        self.target
    }

    /// Price that decides bin membership.
    #[inline]
    #[must_use]
    pub fn source(&self) -> PriceSource {
        self.source
    }
}

impl Display for ProfileConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ProfileConfig({}, {}, {})",
            self.bins.get(),
            self.target.value(),
            self.source
        )
    }
}

/// Builder for [`ProfileConfig`].
///
/// Defaults: 100 edges, target fraction `0.7`, source =
/// [`PriceSource::Close`]. Values are validated in
/// [`build`](ProfileConfigBuilder::build).
pub struct ProfileConfigBuilder {
    bins: usize,
    target_fraction: f64,
    source: PriceSource,
}

impl ProfileConfigBuilder {
    fn new() -> Self {
        Self {
            bins: BinCount::default().get(),
            target_fraction: TargetFraction::default().value(),
            source: PriceSource::Close,
        }
    }

    /// Sets the number of histogram edge points.
    #[inline]
    #[must_use]
    pub fn bins(mut self, bins_count: usize) -> Self {
        self.bins = bins_count;
        self
    }

    /// Sets the share of total volume the value area must enclose.
    #[inline]
    #[must_use]
    pub fn target_fraction(mut self, target_fraction: f64) -> Self {
        self.target_fraction = target_fraction;
        self
    }

    /// Sets the membership price source.
    #[inline]
    #[must_use]
    pub fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }

    /// Builds the config.
    ///
    /// # Errors
    ///
    /// [`ProfileError::InvalidParameter`] if the edge count is below 2 or the
    /// target fraction is not strictly between 0 and 1.
    pub fn build(self) -> Result<ProfileConfig> {
        Ok(ProfileConfig {
            bins: BinCount::new(self.bins)?,
            target: TargetFraction::new(self.target_fraction)?,
            source: self.source,
        })
    }
}
