use crate::{
    ClassifiedBin, Histogram, Levels, Ohlcv, Price, PricePosition, ProfileConfig, ProfileError,
    Result, ValueArea, histogram::build_histogram_with, value_area::resolve,
};

/// Volume profile of a price series: the histogram together with its
/// Point of Control and Value Area.
///
/// Computed once per `(series, config)` pair and never updated; a changed
/// input means a new profile.
///
/// # Example
///
/// ```
/// use value_area::{PricePeriod, PricePosition, ProfileConfig, VolumeProfile};
///
/// let periods = [
///     PricePeriod::new(100.0, 104.0, 99.0, 103.0, 1_200.0),
///     PricePeriod::new(103.0, 106.0, 101.0, 102.0, 2_500.0),
///     PricePeriod::new(102.0, 103.0, 98.0, 99.5, 900.0),
///     PricePeriod::new(99.5, 103.5, 99.0, 103.0, 1_800.0),
/// ];
///
/// let config = ProfileConfig::new(9, 0.7).unwrap();
/// let profile = VolumeProfile::compute(&periods, &config).unwrap();
///
/// let levels = profile.levels();
/// assert!(levels.val <= levels.poc && levels.poc <= levels.vah);
/// assert_eq!(profile.last_close_position(), Some(PricePosition::Inside));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VolumeProfile {
    histogram: Histogram,
    value_area: ValueArea,
    last_close: Price,
}

impl VolumeProfile {
    /// Builds the histogram of `periods` and resolves its value area.
    ///
    /// # Errors
    ///
    /// Any error of [`build_histogram`](crate::build_histogram) or
    /// [`resolve_value_area`](crate::resolve_value_area).
    pub fn compute(periods: &[impl Ohlcv], config: &ProfileConfig) -> Result<Self> {
        let Some(last) = periods.last() else {
            return Err(ProfileError::invalid("periods", "must not be empty"));
        };

        let histogram = build_histogram_with(periods, config)?;
        let value_area = resolve(histogram.bins(), config.target())?;

        Ok(Self {
            histogram,
            value_area,
            last_close: last.close(),
        })
    }

    #[inline]
    #[must_use]
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    #[inline]
    #[must_use]
    pub fn value_area(&self) -> &ValueArea {
        &self.value_area
    }

    /// POC, VAH and VAL prices.
    #[inline]
    #[must_use]
    pub fn levels(&self) -> Levels {
        self.value_area.levels()
    }

    /// Histogram bins tagged for two-colour rendering with a highlighted POC.
    #[must_use]
    pub fn classified_bins(&self) -> Vec<ClassifiedBin> {
        self.value_area.classify(self.histogram.bins())
    }

    /// Close of the final period in the series.
    #[inline]
    #[must_use]
    pub fn last_close(&self) -> Price {
        self.last_close
    }

    /// Where the final close sits relative to the value area.
    #[must_use]
    pub fn last_close_position(&self) -> Option<PricePosition> {
        self.value_area.position(self.last_close)
    }

    /// `val <= last close <= vah`.
    #[must_use]
    pub fn last_close_in_value_area(&self) -> bool {
        self.value_area.contains(self.last_close)
    }
}
