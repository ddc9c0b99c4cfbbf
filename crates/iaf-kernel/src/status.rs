//! User-facing status of a neuron in absolute units
//!
//! [`IafPscDelta`] keeps voltages relative to `E_L`. The status views convert
//! them to and from absolute millivolts, and a status update that moves
//! `E_L` keeps every voltage that is not set explicitly at its absolute value.

use crate::{error::*, neuron::IafPscDelta};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Snapshot of parameters and membrane potential, voltages absolute (mV)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Status {
    /// Resting potential
    pub e_l: f64,
    /// Constant external input current (pA)
    pub i_e: f64,
    /// Spike threshold
    pub v_th: f64,
    /// Reset potential
    pub v_reset: f64,
    /// Lower bound of the membrane potential
    pub v_min: f64,
    /// Membrane capacitance (pF)
    pub c_m: f64,
    /// Membrane time constant (ms)
    pub tau_m: f64,
    /// Refractory period (ms)
    pub t_ref: f64,
    /// Buffer input during refractoriness
    pub refractory_input: bool,
    /// Membrane potential
    pub v_m: f64,
}

/// Partial status change; `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatusUpdate {
    /// Resting potential
    pub e_l: Option<f64>,
    /// Constant external input current (pA)
    pub i_e: Option<f64>,
    /// Spike threshold
    pub v_th: Option<f64>,
    /// Reset potential
    pub v_reset: Option<f64>,
    /// Lower bound of the membrane potential
    pub v_min: Option<f64>,
    /// Membrane capacitance (pF)
    pub c_m: Option<f64>,
    /// Membrane time constant (ms)
    pub tau_m: Option<f64>,
    /// Refractory period (ms)
    pub t_ref: Option<f64>,
    /// Buffer input during refractoriness
    pub refractory_input: Option<bool>,
    /// Membrane potential
    pub v_m: Option<f64>,
}

impl IafPscDelta {
    /// Current status in absolute units
    pub fn status(&self) -> Status {
        let p = &self.params;
        Status {
            e_l: p.e_l(),
            i_e: p.i_e,
            v_th: p.absolute_threshold(),
            v_reset: p.absolute_reset(),
            v_min: p.absolute_v_min(),
            c_m: p.c_m,
            tau_m: p.tau_m,
            t_ref: p.t_ref,
            refractory_input: p.refractory_input,
            v_m: self.absolute_membrane_potential(),
        }
    }

    /// Apply a status change atomically.
    ///
    /// A new `E_L` is applied first, so absolute voltages given in the same
    /// update are interpreted against it. If the result does not validate,
    /// the neuron is left unchanged. Changing `tau_m`, `C_m` or `t_ref`
    /// drops the propagators; call `calibrate` again before updating.
    pub fn set_status(&mut self, update: &StatusUpdate) -> Result<()> {
        let mut params = self.params.clone();
        let mut v_m = self.state.v_m;

        if let Some(e_l) = update.e_l {
            if !e_l.is_finite() {
                return Err(KernelError::configuration("E_L", e_l.to_string(), "finite"));
            }
            v_m -= params.rebase(e_l);
        }
        let e_l = params.e_l();
        if let Some(v_th) = update.v_th {
            params.v_th = v_th - e_l;
        }
        if let Some(v_reset) = update.v_reset {
            params.v_reset = v_reset - e_l;
        }
        if let Some(v_min) = update.v_min {
            params.v_min = v_min - e_l;
        }
        if let Some(i_e) = update.i_e {
            params.i_e = i_e;
        }
        if let Some(c_m) = update.c_m {
            params.c_m = c_m;
        }
        if let Some(tau_m) = update.tau_m {
            params.tau_m = tau_m;
        }
        if let Some(t_ref) = update.t_ref {
            params.t_ref = t_ref;
        }
        if let Some(enabled) = update.refractory_input {
            params.refractory_input = enabled;
        }
        if let Some(abs_v_m) = update.v_m {
            v_m = abs_v_m - e_l;
        }

        params.validate()?;

        let stale = params.tau_m != self.params.tau_m
            || params.c_m != self.params.c_m
            || params.t_ref != self.params.t_ref;
        if stale && self.propagators.take().is_some() {
            log::warn!("Time constants changed, iaf_psc_delta needs recalibration");
        }
        if !params.refractory_input {
            self.state.refractory_accumulator = 0.0;
        }
        self.params = params;
        self.state.v_m = v_m;
        Ok(())
    }
}
