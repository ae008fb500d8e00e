//! Turns resolved parameter values into concrete numbers.

use std::fmt;

use rand::distr::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Serializer};

use crate::catalog::{AUTOSIZE, ParamValue, ParameterSet};
use crate::error::{Error, Result};

/// A concrete parameter value ready to emit into a model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampledValue {
    Number(f64),
    Autosize,
}

impl SampledValue {
    pub fn as_number(self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(n),
            Self::Autosize => None,
        }
    }
}

impl fmt::Display for SampledValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Autosize => f.write_str(AUTOSIZE),
        }
    }
}

impl Serialize for SampledValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Autosize => serializer.serialize_str(AUTOSIZE),
        }
    }
}

/// Draws values from parameter ranges using an injectable generator.
///
/// Production runs use [`ValueSampler::from_entropy`] (unseeded) or
/// [`ValueSampler::seeded`]; tests may pass any [`Rng`].
#[derive(Debug, Clone)]
pub struct ValueSampler<R = StdRng> {
    rng: R,
}

impl ValueSampler<StdRng> {
    /// Reproducible sampler for a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Non-reproducible sampler seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> ValueSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Elaborates one value.
    ///
    /// Concrete numbers and the autosize sentinel pass through unchanged. A
    /// range flagged `autosize_allowed` yields the sentinel regardless of its
    /// bounds; any other range yields a uniform draw over
    /// `[min_value, max_value]`.
    ///
    /// # Errors
    ///
    /// [`Error::MissingRangeBounds`] when a bound is absent and
    /// [`Error::InvalidRange`] when `min_value > max_value` or the span
    /// `max_value - min_value` is not finite. `param` only labels the error.
    pub fn sample(&mut self, param: &str, value: &ParamValue) -> Result<SampledValue> {
        let spec = match value {
            ParamValue::Number(n) => return Ok(SampledValue::Number(*n)),
            ParamValue::Autosize => return Ok(SampledValue::Autosize),
            ParamValue::Range(spec) => spec,
        };

        if spec.autosize_allowed {
            return Ok(SampledValue::Autosize);
        }

        let (Some(min), Some(max)) = (spec.min_value, spec.max_value) else {
            return Err(Error::MissingRangeBounds {
                param: param.to_string(),
            });
        };

        // fails for inverted or non-finite spans
        let dist = Uniform::new_inclusive(min, max).map_err(|_| Error::InvalidRange {
            param: param.to_string(),
            min,
            max,
        })?;

        Ok(SampledValue::Number(self.rng.sample(dist)))
    }

    /// Samples `param` from a parameter set, falling back to `default` when
    /// the set does not define it.
    pub fn sample_or(
        &mut self,
        set: &ParameterSet,
        param: &str,
        default: f64,
    ) -> Result<SampledValue> {
        match set.get(param) {
            Some(value) => self.sample(param, value),
            None => Ok(SampledValue::Number(default)),
        }
    }
}

/// Surface roughness categories understood by the simulator, smoothest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Roughness {
    VerySmooth,
    Smooth,
    MediumSmooth,
    MediumRough,
    Rough,
    VeryRough,
}

impl Roughness {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VerySmooth => "VerySmooth",
            Self::Smooth => "Smooth",
            Self::MediumSmooth => "MediumSmooth",
            Self::MediumRough => "MediumRough",
            Self::Rough => "Rough",
            Self::VeryRough => "VeryRough",
        }
    }
}

impl fmt::Display for Roughness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a continuous roughness number onto its category.
///
/// Thresholds are inclusive on the smoother side: `0.2` is `VerySmooth`,
/// anything above `1.0` is `VeryRough`.
pub fn map_roughness_value(x: f64) -> Roughness {
    if x <= 0.2 {
        Roughness::VerySmooth
    } else if x <= 0.4 {
        Roughness::Smooth
    } else if x <= 0.6 {
        Roughness::MediumSmooth
    } else if x <= 0.8 {
        Roughness::MediumRough
    } else if x <= 1.0 {
        Roughness::Rough
    } else {
        Roughness::VeryRough
    }
}
