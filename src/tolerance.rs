//! Mass tolerance windows for matching observed masses against targets.
use std::fmt;

use num_traits::{Float, FromPrimitive};

/// The width of an acceptance window around a target mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tolerance {
    /// Parts-per-million of the target mass
    PPM(f64),
    /// An absolute width in Daltons
    Da(f64),
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::PPM(10.0)
    }
}

impl Tolerance {
    /// The numeric value, independent of the unit
    pub fn value(&self) -> f64 {
        match self {
            Self::PPM(v) | Self::Da(v) => *v,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::PPM(_) => "ppm",
            Self::Da(_) => "Da",
        }
    }

    /// The half-width of the window around `target`, never negative.
    ///
    /// A tolerance that cannot be represented in `T` yields NaN, which no mass falls within.
    pub fn window<T: Float + FromPrimitive>(&self, target: T) -> T {
        match self {
            Self::PPM(ppm) => (target * Self::cast::<T>(*ppm) / Self::cast::<T>(1e6)).abs(),
            Self::Da(width) => Self::cast::<T>(*width).abs(),
        }
    }

    /// The inclusive `(lower, upper)` bounds of the window around `target`.
    ///
    /// For ppm windows each bound is the wider of `target ± window` and
    /// `target * (1 ± ppm / 1e6)`, which round differently in the last place.
    pub fn bounds<T: Float + FromPrimitive>(&self, target: T) -> (T, T) {
        let width = self.window(target);
        let (mut lower, mut upper) = (target - width, target + width);
        if let Self::PPM(ppm) = self {
            let scale = Self::cast::<T>(*ppm) / Self::cast::<T>(1e6);
            let a = target * (T::one() - scale);
            let b = target * (T::one() + scale);
            lower = lower.min(a.min(b));
            upper = upper.max(a.max(b));
        }
        (lower, upper)
    }

    #[inline]
    fn cast<T: Float + FromPrimitive>(value: f64) -> T {
        T::from_f64(value).unwrap_or_else(T::nan)
    }

    /// Check whether `query` falls within the window around `target`, both ends inclusive.
    #[inline]
    pub fn test<T: Float + FromPrimitive>(&self, query: T, target: T) -> bool {
        let (lower, upper) = self.bounds(target);
        lower <= query && query <= upper
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value(), self.unit())
    }
}

/// A target mass paired with its precomputed acceptance window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetWindow {
    pub target: f64,
    pub lower: f64,
    pub upper: f64,
}

impl TargetWindow {
    pub fn new(target: f64, tolerance: Tolerance) -> Self {
        let (lower, upper) = tolerance.bounds(target);
        Self {
            target,
            lower,
            upper,
        }
    }

    #[inline]
    pub fn contains(&self, mass: f64) -> bool {
        self.lower <= mass && mass <= self.upper
    }
}
