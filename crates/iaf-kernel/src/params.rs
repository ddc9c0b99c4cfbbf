//! Model constants for the delta-synapse integrate-and-fire neuron
//!
//! Voltages are stored relative to the resting potential `E_L`. The resting
//! potential itself can only be moved through [`IafParams::rebase`], which
//! shifts every relative quantity in the same call.

use crate::error::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default resting potential (mV)
pub const DEFAULT_E_L: f64 = -70.0;

/// Parameters of an `iaf_psc_delta` style neuron
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IafParams {
    /// Membrane time constant (ms)
    pub tau_m: f64,
    /// Membrane capacitance (pF)
    pub c_m: f64,
    /// Absolute refractory period (ms)
    pub t_ref: f64,
    /// Constant external input current (pA)
    pub i_e: f64,
    /// Spike threshold, relative to `E_L` (mV)
    pub v_th: f64,
    /// Reset potential, relative to `E_L` (mV)
    pub v_reset: f64,
    /// Lower bound of the membrane potential, relative to `E_L` (mV).
    /// Negative infinity leaves the potential unclamped.
    pub v_min: f64,
    /// Buffer synaptic input that arrives during refractoriness instead of
    /// discarding it
    pub refractory_input: bool,
    /// Resting potential (mV)
    e_l: f64,
}

impl Default for IafParams {
    fn default() -> Self {
        Self {
            tau_m: 10.0,                  // 10ms membrane time constant
            c_m: 250.0,                   // 250pF capacitance
            t_ref: 2.0,                   // 2ms refractory period
            i_e: 0.0,                     // no bias current
            v_th: -55.0 - DEFAULT_E_L,    // -55mV absolute
            v_reset: -70.0 - DEFAULT_E_L, // -70mV absolute
            v_min: f64::NEG_INFINITY,
            refractory_input: false,
            e_l: DEFAULT_E_L,
        }
    }
}

impl IafParams {
    /// Resting potential (mV)
    pub fn e_l(&self) -> f64 {
        self.e_l
    }

    /// Move the resting potential to `new_e_l`, keeping the absolute values
    /// of threshold, reset and lower bound unchanged.
    ///
    /// Returns the shift `new_e_l - old_e_l` so that owners of state stored
    /// relative to `E_L` can apply the same correction.
    pub fn rebase(&mut self, new_e_l: f64) -> f64 {
        let delta = new_e_l - self.e_l;
        self.v_th -= delta;
        self.v_reset -= delta;
        self.v_min -= delta;
        self.e_l = new_e_l;
        delta
    }

    /// Threshold in absolute millivolts
    pub fn absolute_threshold(&self) -> f64 {
        self.v_th + self.e_l
    }

    /// Reset potential in absolute millivolts
    pub fn absolute_reset(&self) -> f64 {
        self.v_reset + self.e_l
    }

    /// Lower bound in absolute millivolts
    pub fn absolute_v_min(&self) -> f64 {
        self.v_min + self.e_l
    }

    /// Set the membrane time constant
    pub fn with_tau_m(mut self, tau_m: f64) -> Self {
        self.tau_m = tau_m;
        self
    }

    /// Set the membrane capacitance
    pub fn with_c_m(mut self, c_m: f64) -> Self {
        self.c_m = c_m;
        self
    }

    /// Set the refractory period
    pub fn with_t_ref(mut self, t_ref: f64) -> Self {
        self.t_ref = t_ref;
        self
    }

    /// Set the constant external input current
    pub fn with_i_e(mut self, i_e: f64) -> Self {
        self.i_e = i_e;
        self
    }

    /// Set the threshold relative to `E_L`
    pub fn with_v_th(mut self, v_th: f64) -> Self {
        self.v_th = v_th;
        self
    }

    /// Set the reset potential relative to `E_L`
    pub fn with_v_reset(mut self, v_reset: f64) -> Self {
        self.v_reset = v_reset;
        self
    }

    /// Set the lower bound relative to `E_L`
    pub fn with_v_min(mut self, v_min: f64) -> Self {
        self.v_min = v_min;
        self
    }

    /// Enable or disable buffering of refractory input
    pub fn with_refractory_input(mut self, enabled: bool) -> Self {
        self.refractory_input = enabled;
        self
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        require_positive("C_m", self.c_m)?;
        require_positive("tau_m", self.tau_m)?;
        if !(self.t_ref >= 0.0 && self.t_ref.is_finite()) {
            return Err(KernelError::configuration(
                "t_ref",
                self.t_ref.to_string(),
                ">= 0.0 and finite",
            ));
        }
        for (name, value) in [
            ("E_L", self.e_l),
            ("I_e", self.i_e),
            ("V_th", self.v_th),
            ("V_reset", self.v_reset),
        ] {
            if !value.is_finite() {
                return Err(KernelError::configuration(name, value.to_string(), "finite"));
            }
        }
        // a reset at or above threshold would re-trigger during refractoriness
        if self.v_reset >= self.v_th {
            return Err(KernelError::configuration(
                "V_reset",
                format!("{} (with V_th={})", self.v_reset, self.v_th),
                "< V_th",
            ));
        }
        // -inf is the unclamped default
        if self.v_min.is_nan() || self.v_min == f64::INFINITY {
            return Err(KernelError::configuration(
                "V_min",
                self.v_min.to_string(),
                "finite or -inf",
            ));
        }
        if self.v_reset < self.v_min {
            return Err(KernelError::configuration(
                "V_reset",
                format!("{} (with V_min={})", self.v_reset, self.v_min),
                ">= V_min",
            ));
        }
        Ok(())
    }
}
