//! Cooling laws: stateless temperature schedules `k -> T(k)`.
//!
//! Each law stores only `T0`; `cool(k)` is a pure function of `(T0, k)`, no
//! internal counter is kept. `initialize` must run before the first `cool`
//! call, enforced by returning `NotInitialized` rather than by a typestate
//! (the Coordinator clones these across threads, so the simplest safe shape
//! wins).

use crate::error::{PsaError, PsaResult};

/// A temperature at or below this floor is treated as a terminal signal by
/// callers (the SA worker's outer loop breaks).
pub const TEMPERATURE_FLOOR: f64 = 1e-10;

/// Capability set every cooling law implements: `initialize` then `cool`.
pub trait CoolingLaw: CoolingLawClone + Send + Sync {
    /// Stores the initial temperature. Must be called before `cool`.
    fn initialize(&mut self, t0: f64) -> PsaResult<()>;

    /// Returns `T(k)` for iteration index `k`. `cool(0)` always returns `T0`.
    fn cool(&self, k: u64) -> PsaResult<f64>;
}

/// Object-safe clone support so `Box<dyn CoolingLaw>` can be cloned per worker.
pub trait CoolingLawClone {
    fn clone_box(&self) -> Box<dyn CoolingLaw>;
}

impl<T> CoolingLawClone for T
where
    T: 'static + CoolingLaw + Clone,
{
    fn clone_box(&self) -> Box<dyn CoolingLaw> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn CoolingLaw> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

fn require_t0(t0: Option<f64>) -> PsaResult<f64> {
    t0.ok_or_else(|| PsaError::NotInitialized("cooling law initialize(T0) was never called".into()))
}

/// `T(k) = T0 / ln(1 + k)` for `k >= 1`; `T(0) = T0`.
///
/// `cool(1) = T0 / ln(2) > T0` is a real, intentional transient of this law —
/// it is not a bug and tests must not flag it.
#[derive(Debug, Clone, Default)]
pub struct BoltzmannCooling {
    t0: Option<f64>,
}

impl CoolingLaw for BoltzmannCooling {
    fn initialize(&mut self, t0: f64) -> PsaResult<()> {
        if !(t0 > 0.0) {
            return Err(PsaError::InvalidArgument("T0 must be positive".into()));
        }
        self.t0 = Some(t0);
        Ok(())
    }

    fn cool(&self, k: u64) -> PsaResult<f64> {
        let t0 = require_t0(self.t0)?;
        if k == 0 {
            return Ok(t0);
        }
        Ok(t0 / ((1.0 + k as f64).ln()))
    }
}

/// `T(k) = T0 / (1 + k)`.
#[derive(Debug, Clone, Default)]
pub struct CauchyCooling {
    t0: Option<f64>,
}

impl CoolingLaw for CauchyCooling {
    fn initialize(&mut self, t0: f64) -> PsaResult<()> {
        if !(t0 > 0.0) {
            return Err(PsaError::InvalidArgument("T0 must be positive".into()));
        }
        self.t0 = Some(t0);
        Ok(())
    }

    fn cool(&self, k: u64) -> PsaResult<f64> {
        let t0 = require_t0(self.t0)?;
        Ok(t0 / (1.0 + k as f64))
    }
}

/// `T(k) = T0 * ln(1 + k) / (1 + k)` for `k >= 1`; `T(0) = T0`.
#[derive(Debug, Clone, Default)]
pub struct LogarithmicCooling {
    t0: Option<f64>,
}

impl CoolingLaw for LogarithmicCooling {
    fn initialize(&mut self, t0: f64) -> PsaResult<()> {
        if !(t0 > 0.0) {
            return Err(PsaError::InvalidArgument("T0 must be positive".into()));
        }
        self.t0 = Some(t0);
        Ok(())
    }

    fn cool(&self, k: u64) -> PsaResult<f64> {
        let t0 = require_t0(self.t0)?;
        if k == 0 {
            return Ok(t0);
        }
        let kf = k as f64;
        Ok(t0 * (1.0 + kf).ln() / (1.0 + kf))
    }
}

/// Parses the `cooling_law` CLI token into a boxed law, per §6's
/// `{boltzmann, cauchy, logarithmic}` enumeration.
pub fn by_name(name: &str) -> PsaResult<Box<dyn CoolingLaw>> {
    match name {
        "boltzmann" => Ok(Box::new(BoltzmannCooling::default())),
        "cauchy" => Ok(Box::new(CauchyCooling::default())),
        "logarithmic" => Ok(Box::new(LogarithmicCooling::default())),
        other => Err(PsaError::InvalidArgument(format!(
            "unknown cooling law '{other}', expected one of boltzmann, cauchy, logarithmic"
        ))),
    }
}
