use std::fmt::Display;

use tracing::debug;

use crate::{Price, PriceBin, ProfileError, Result, TargetFraction};

/// Side the value area grew towards in one expansion step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Towards higher prices.
    Up,
    /// Towards lower prices.
    Down,
}

/// One bin admitted into the value area.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpansionStep {
    /// Side the admitted bin lies on.
    pub direction: Direction,
    /// Index of the admitted bin.
    pub index: usize,
    /// Volume of the admitted bin.
    pub volume: f64,
    /// Volume enclosed after admitting the bin.
    pub covered_volume: f64,
}

/// Greedy bidirectional growth of the value area around the POC.
///
/// Each step compares the bins just above and just below the current window
/// (a missing neighbour counts as zero volume) and admits the larger one;
/// ties go up. Iteration ends once the covered volume reaches the target or
/// when both neighbours carry zero volume, whichever comes first.
///
/// Obtained from [`ValueArea::replay`] to inspect how a value area was
/// reached.
#[derive(Debug, Clone)]
pub struct Expansion<'a> {
    bins: &'a [PriceBin],
    up_index: usize,
    down_index: usize,
    covered_volume: f64,
    target_volume: f64,
    total_volume: f64,
    first_traded: usize,
    last_traded: usize,
}

impl<'a> Expansion<'a> {
    fn new(bins: &'a [PriceBin], poc_index: usize, target_volume: f64, total_volume: f64) -> Self {
        let traded = |bin: &PriceBin| bin.volume() > 0.0;
        let mut expansion = Self {
            bins,
            up_index: poc_index,
            down_index: poc_index,
            covered_volume: 0.0,
            target_volume,
            total_volume,
            first_traded: bins.iter().position(traded).unwrap_or(poc_index),
            last_traded: bins.iter().rposition(traded).unwrap_or(poc_index),
        };
        expansion.admit(bins[poc_index].volume());
        expansion
    }

    /// Adds `volume` to the window. Once every traded bin is inside, the
    /// covered volume is `total_volume` exactly, whatever order it was summed
    /// in.
    fn admit(&mut self, volume: f64) {
        self.covered_volume = if self.down_index <= self.first_traded
            && self.up_index >= self.last_traded
        {
            self.total_volume
        } else {
            (self.covered_volume + volume).min(self.total_volume)
        };
    }

    /// Highest bin index inside the window so far.
    #[inline]
    #[must_use]
    pub fn up_index(&self) -> usize {
        self.up_index
    }

    /// Lowest bin index inside the window so far.
    #[inline]
    #[must_use]
    pub fn down_index(&self) -> usize {
        self.down_index
    }

    /// Volume enclosed by the window so far.
    #[inline]
    #[must_use]
    pub fn covered_volume(&self) -> f64 {
        self.covered_volume
    }
}

impl Iterator for Expansion<'_> {
    type Item = ExpansionStep;

    fn next(&mut self) -> Option<Self::Item> {
        if self.covered_volume >= self.target_volume {
            return None;
        }

        let vol_up = self
            .bins
            .get(self.up_index + 1)
            .map_or(0.0, PriceBin::volume);
        let vol_down = self
            .down_index
            .checked_sub(1)
            .map_or(0.0, |i| self.bins[i].volume());

        if vol_up == 0.0 && vol_down == 0.0 {
            return None;
        }

        let (direction, index, volume) = if vol_up >= vol_down {
            self.up_index += 1;
            (Direction::Up, self.up_index, vol_up)
        } else {
            self.down_index -= 1;
            (Direction::Down, self.down_index, vol_down)
        };
        self.admit(volume);

        Some(ExpansionStep {
            direction,
            index,
            volume,
            covered_volume: self.covered_volume,
        })
    }
}

/// Rendering class of a histogram bin relative to a [`ValueArea`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinClass {
    /// The Point of Control bin.
    PointOfControl,
    /// Inside `[val_index, vah_index]`, other than the POC.
    InsideValueArea,
    /// Outside the value area.
    OutsideValueArea,
}

impl BinClass {
    /// `true` for the POC and the rest of the value area band.
    #[inline]
    #[must_use]
    pub fn is_inside(self) -> bool {
        !matches!(self, Self::OutsideValueArea)
    }
}

/// A histogram bin tagged with its [`BinClass`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassifiedBin {
    bin: PriceBin,
    class: BinClass,
}

impl ClassifiedBin {
    #[inline]
    #[must_use]
    pub fn bin(&self) -> &PriceBin {
        &self.bin
    }

    #[inline]
    #[must_use]
    pub fn class(&self) -> BinClass {
        self.class
    }
}

/// Where a price sits relative to the value area band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PricePosition {
    /// Below the Value Area Low.
    Below,
    /// Between VAL and VAH, both inclusive.
    Inside,
    /// Above the Value Area High.
    Above,
}

/// Expansion stopped before enclosing the target share of volume.
///
/// Informational: the value area is still valid, it just covers less than
/// requested because both sides ran out of volume.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InsufficientCoverage {
    pub covered_volume: f64,
    pub target_volume: f64,
}

impl InsufficientCoverage {
    /// Volume still missing to reach the target.
    #[inline]
    #[must_use]
    pub fn missing_volume(&self) -> f64 {
        self.target_volume - self.covered_volume
    }
}

impl Display for InsufficientCoverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "insufficient coverage: {} of {} target volume",
            self.covered_volume, self.target_volume
        )
    }
}

/// The three summary levels of a volume profile.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Levels {
    /// Point of Control.
    pub poc: Price,
    /// Value Area High.
    pub vah: Price,
    /// Value Area Low.
    pub val: Price,
}

impl Display for Levels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "VA(vah: {}, poc: {}, val: {})",
            self.vah, self.poc, self.val
        )
    }
}

/// Point of Control and Value Area of a volume histogram.
///
/// `val_index <= poc_index <= vah_index` always holds. Prices are the
/// midpoints of the respective bins.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueArea {
    poc_index: usize,
    poc_price: Price,
    vah_index: usize,
    vah_price: Price,
    val_index: usize,
    val_price: Price,
    covered_volume: f64,
    total_volume: f64,
    target_volume: f64,
}

impl ValueArea {
    #[inline]
    #[must_use]
    pub fn poc_index(&self) -> usize {
        self.poc_index
    }

    #[inline]
    #[must_use]
    pub fn poc_price(&self) -> Price {
        self.poc_price
    }

    #[inline]
    #[must_use]
    pub fn vah_index(&self) -> usize {
        self.vah_index
    }

    #[inline]
    #[must_use]
    pub fn vah_price(&self) -> Price {
        self.vah_price
    }

    #[inline]
    #[must_use]
    pub fn val_index(&self) -> usize {
        self.val_index
    }

    #[inline]
    #[must_use]
    pub fn val_price(&self) -> Price {
        self.val_price
    }

    /// Volume enclosed by `[val_index, vah_index]`.
    #[inline]
    #[must_use]
    pub fn covered_volume(&self) -> f64 {
        self.covered_volume
    }

    /// Volume across the whole histogram.
    #[inline]
    #[must_use]
    pub fn total_volume(&self) -> f64 {
        self.total_volume
    }

    /// `total_volume * target_fraction`.
    #[inline]
    #[must_use]
    pub fn target_volume(&self) -> f64 {
        self.target_volume
    }

    /// Share of total volume actually enclosed.
    #[inline]
    #[must_use]
    pub fn coverage(&self) -> f64 {
        self.covered_volume / self.total_volume
    }

    /// Number of bins in the value area, POC included.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.vah_index - self.val_index + 1
    }

    /// `Some` if expansion ran out of volume before reaching the target.
    #[must_use]
    pub fn shortfall(&self) -> Option<InsufficientCoverage> {
        (self.covered_volume < self.target_volume).then_some(InsufficientCoverage {
            covered_volume: self.covered_volume,
            target_volume: self.target_volume,
        })
    }

    #[inline]
    #[must_use]
    pub fn levels(&self) -> Levels {
        Levels {
            poc: self.poc_price,
            vah: self.vah_price,
            val: self.val_price,
        }
    }

    /// `val_price <= price <= vah_price`.
    #[inline]
    #[must_use]
    pub fn contains(&self, price: Price) -> bool {
        (self.val_price..=self.vah_price).contains(&price)
    }

    /// Position of `price` relative to the band, `None` for NaN.
    #[must_use]
    pub fn position(&self, price: Price) -> Option<PricePosition> {
        if price.is_nan() {
            None
        } else if price < self.val_price {
            Some(PricePosition::Below)
        } else if price > self.vah_price {
            Some(PricePosition::Above)
        } else {
            Some(PricePosition::Inside)
        }
    }

    /// Rendering class of the bin at `index`.
    #[must_use]
    pub fn class_of(&self, index: usize) -> BinClass {
        if index == self.poc_index {
            BinClass::PointOfControl
        } else if (self.val_index..=self.vah_index).contains(&index) {
            BinClass::InsideValueArea
        } else {
            BinClass::OutsideValueArea
        }
    }

    /// Tags every bin with its [`BinClass`].
    ///
    /// `bins` should be the histogram this value area was resolved from.
    #[must_use]
    pub fn classify(&self, bins: &[PriceBin]) -> Vec<ClassifiedBin> {
        bins.iter()
            .map(|&bin| ClassifiedBin {
                bin,
                class: self.class_of(bin.index()),
            })
            .collect()
    }

    /// Re-runs the expansion over `bins`, yielding each admitted bin.
    ///
    /// # Panics
    ///
    /// Panics if `bins` has no bin at `poc_index`.
    #[must_use]
    pub fn replay<'a>(&self, bins: &'a [PriceBin]) -> Expansion<'a> {
        Expansion::new(bins, self.poc_index, self.target_volume, self.total_volume)
    }
}

impl Display for ValueArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "VA(vah: {}, poc: {}, val: {}, covered: {}/{})",
            self.vah_price, self.poc_price, self.val_price, self.covered_volume, self.total_volume
        )
    }
}

/// Finds the Point of Control and grows the Value Area around it.
///
/// The POC is the bin with the most volume, the lowest index winning ties.
/// The window then grows one bin at a time towards the heavier neighbour
/// (upwards on ties) until it encloses `target_fraction` of total volume.
/// When both neighbours are empty the expansion stops early; check
/// [`ValueArea::shortfall`] for that case.
///
/// # Errors
///
/// - [`ProfileError::InvalidParameter`] if `target_fraction` is not strictly
///   between 0 and 1, `bins` is empty, indices are not `0..len`, or a
///   volume is negative or NaN.
/// - [`ProfileError::EmptyVolumeProfile`] if total volume is zero.
///
/// # Example
///
/// ```
/// use value_area::{PriceBin, resolve_value_area};
///
/// let bins: Vec<PriceBin> = [10.0, 50.0, 100.0, 30.0, 5.0]
///     .iter()
///     .enumerate()
///     .map(|(i, &v)| PriceBin::new(i, 100.0 + i as f64, v))
///     .collect();
///
/// let va = resolve_value_area(&bins, 0.7).unwrap();
///
/// assert_eq!(va.poc_index(), 2);
/// assert_eq!((va.val_index(), va.vah_index()), (1, 2));
/// assert_eq!(va.covered_volume(), 150.0);
/// ```
pub fn resolve_value_area(bins: &[PriceBin], target_fraction: f64) -> Result<ValueArea> {
    resolve(bins, TargetFraction::new(target_fraction)?)
}

pub(crate) fn resolve(bins: &[PriceBin], target: TargetFraction) -> Result<ValueArea> {
    validate(bins)?;

    let poc_index = point_of_control(bins);
    let total_volume: f64 = bins.iter().map(PriceBin::volume).sum();

    if total_volume == 0.0 {
        return Err(ProfileError::EmptyVolumeProfile);
    }

    let target_volume = total_volume * target.value();

    let mut expansion = Expansion::new(bins, poc_index, target_volume, total_volume);
    let steps = expansion.by_ref().count();

    let (up_index, down_index) = (expansion.up_index(), expansion.down_index());
    let covered_volume = expansion.covered_volume();

    let value_area = ValueArea {
        poc_index,
        poc_price: bins[poc_index].midpoint(),
        vah_index: up_index,
        vah_price: bins[up_index].midpoint(),
        val_index: down_index,
        val_price: bins[down_index].midpoint(),
        covered_volume,
        total_volume,
        target_volume,
    };

    debug!(
        bins = bins.len(),
        poc_index,
        val_index = down_index,
        vah_index = up_index,
        steps,
        covered_volume,
        target_volume,
        "resolved value area"
    );

    if let Some(shortfall) = value_area.shortfall() {
        debug!(
            covered_volume = shortfall.covered_volume,
            target_volume = shortfall.target_volume,
            missing_volume = shortfall.missing_volume(),
            "value area expansion exhausted both sides before reaching target"
        );
    }

    Ok(value_area)
}

fn validate(bins: &[PriceBin]) -> Result<()> {
    if bins.is_empty() {
        return Err(ProfileError::invalid("bins", "must not be empty"));
    }

    for (position, bin) in bins.iter().enumerate() {
        if bin.index() != position {
            return Err(ProfileError::invalid(
                "bins",
                format!("bin at position {position} has index {}", bin.index()),
            ));
        }
        if bin.volume().is_nan() || bin.volume() < 0.0 {
            return Err(ProfileError::invalid(
                "bins",
                format!("bin {position} has volume {}, expected >= 0", bin.volume()),
            ));
        }
    }

    Ok(())
}

/// Index of the first bin holding the maximum volume.
fn point_of_control(bins: &[PriceBin]) -> usize {
    let mut poc_index = 0;
    for bin in &bins[1..] {
        if bin.volume() > bins[poc_index].volume() {
            poc_index = bin.index();
        }
    }
    poc_index
}
