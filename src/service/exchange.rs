//! Currency conversion collaborator.

use rustc_hash::FxHashMap;

use crate::service::{ServiceError, ServiceResult};

/// Source of conversion rates between currency codes.
pub trait ExchangeRateProvider: Send + Sync {
    /// Multiplier turning an amount in `from` into an amount in `to`.
    fn rate(&self, from: &str, to: &str) -> ServiceResult<f64>;
}

/// Static table of rates quoted against one base currency.
///
/// Each entry is "units of the currency per one unit of base", so the rate
/// from `a` to `b` is `rate[b] / rate[a]`. Codes are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct FixedRateProvider {
    per_base: FxHashMap<String, f64>,
}

impl FixedRateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, currency: &str, per_base: f64) -> Self {
        self.per_base.insert(currency.to_uppercase(), per_base);
        self
    }

    fn lookup(&self, currency: &str) -> Option<f64> {
        self.per_base
            .get(&currency.to_uppercase())
            .copied()
            .filter(|r| r.is_finite() && *r > 0.0)
    }
}

impl ExchangeRateProvider for FixedRateProvider {
    fn rate(&self, from: &str, to: &str) -> ServiceResult<f64> {
        if from.eq_ignore_ascii_case(to) {
            return Ok(1.0);
        }
        match (self.lookup(from), self.lookup(to)) {
            (Some(from_rate), Some(to_rate)) => Ok(to_rate / from_rate),
            _ => Err(ServiceError::ExchangeRate(format!(
                "no rate between {from} and {to}"
            ))),
        }
    }
}
