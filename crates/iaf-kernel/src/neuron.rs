//! Delta-synapse leaky integrate-and-fire neuron
//!
//! Synaptic input arrives as voltage jumps that are added to the membrane
//! potential in the step they are delivered. Between inputs the potential
//! relaxes towards rest with time constant `tau_m`, driven by the injected
//! current and `I_e`. The subthreshold dynamics are linear, so one step is
//! advanced with closed-form propagators computed once in
//! [`IafPscDelta::calibrate`]:
//!
//! ```text
//! V(t+h) = P30 * (I_inj + I_e) + P33 * V(t) + (ex + in)
//! P33 = exp(-h / tau_m)
//! P30 = (1 / C_m) * (1 - P33) * tau_m
//! ```
//!
//! After a spike the potential is held at `V_reset` for `round(t_ref / h)`
//! steps. Input arriving in that window is dropped, or buffered and replayed
//! when the window ends if `refractory_input` is enabled.

use crate::{error::*, params::IafParams};

/// Step propagators derived from the model constants and the resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Propagators {
    /// Membrane decay over one step, `exp(-h / tau_m)`
    pub decay_factor: f64,
    /// Voltage change per unit of constant current over one step
    pub input_gain: f64,
    /// Refractory period in whole steps
    pub refractory_steps: u64,
    /// Simulation resolution the propagators were computed for (ms)
    pub resolution: f64,
}

impl Propagators {
    /// Compute propagators for `params` at step size `resolution`
    pub fn compute(params: &IafParams, resolution: f64) -> Result<Self> {
        require_positive("tau_m", params.tau_m)?;
        require_positive("C_m", params.c_m)?;
        require_positive("resolution", resolution)?;

        let decay_factor = (-resolution / params.tau_m).exp();
        let input_gain = 1.0 / params.c_m * (1.0 - decay_factor) * params.tau_m;
        // Refractoriness only exists on the step grid; a t_ref that is not a
        // multiple of the resolution is rounded to the nearest step count.
        let refractory_steps = (params.t_ref / resolution).round() as u64;

        Ok(Self {
            decay_factor,
            input_gain,
            refractory_steps,
            resolution,
        })
    }
}

/// Logical state of the neuron
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Integrating input normally
    Integrating,
    /// Absolutely refractory with the given number of steps left
    Refractory(u64),
}

/// Dynamic state of a neuron
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeuronState {
    /// Membrane potential relative to `E_L` (mV)
    pub v_m: f64,
    /// Injected input current for the coming step (pA)
    pub resting_input: f64,
    /// Remaining refractory steps
    pub refractory_counter: u64,
    /// Decay-discounted input received while refractory (mV)
    pub refractory_accumulator: f64,
}

/// `iaf_psc_delta` neuron: parameters, state and propagators
#[derive(Debug, Clone)]
pub struct IafPscDelta {
    pub(crate) params: IafParams,
    pub(crate) state: NeuronState,
    pub(crate) propagators: Option<Propagators>,
}

impl IafPscDelta {
    /// Create a neuron at rest. [`calibrate`](Self::calibrate) must run
    /// before the first [`update`](Self::update).
    pub fn new(params: IafParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            state: NeuronState::default(),
            propagators: None,
        })
    }

    /// Precompute the step propagators for `resolution` (ms).
    ///
    /// Safe to call repeatedly. Leaves the dynamic state alone apart from
    /// capping a running refractory counter at the new step count.
    pub fn calibrate(&mut self, resolution: f64) -> Result<()> {
        let propagators = Propagators::compute(&self.params, resolution)?;
        log::debug!(
            "Calibrated iaf_psc_delta: h={}ms P33={} P30={} refractory_steps={}",
            resolution,
            propagators.decay_factor,
            propagators.input_gain,
            propagators.refractory_steps
        );
        self.state.refractory_counter = self
            .state
            .refractory_counter
            .min(propagators.refractory_steps);
        self.propagators = Some(propagators);
        Ok(())
    }

    /// Advance the neuron by one step with the summed excitatory and
    /// inhibitory input delivered for this step. Returns `true` on a spike.
    pub fn update(&mut self, ex_input: f64, in_input: f64) -> bool {
        debug_assert!(
            self.propagators.is_some(),
            "IafPscDelta::update called before calibrate"
        );
        let Some(p) = self.propagators else {
            return false;
        };
        let params = &self.params;
        let state = &mut self.state;
        let input = ex_input + in_input;

        if state.refractory_counter == 0 {
            state.v_m = p.input_gain * (state.resting_input + params.i_e)
                + p.decay_factor * state.v_m
                + input;

            // replay input that arrived while refractory
            if params.refractory_input && state.refractory_accumulator != 0.0 {
                state.v_m += state.refractory_accumulator;
                state.refractory_accumulator = 0.0;
            }

            if state.v_m < params.v_min {
                state.v_m = params.v_min;
            }
        } else {
            // Discount for the decay the input would have undergone by the
            // end of the refractory period.
            if params.refractory_input {
                state.refractory_accumulator += input
                    * (-(state.refractory_counter as f64) * p.resolution / params.tau_m).exp();
            }
            state.refractory_counter -= 1;
        }

        if state.v_m >= params.v_th {
            state.refractory_counter = p.refractory_steps;
            state.v_m = params.v_reset;
            log::trace!("Spike, refractory for {} steps", p.refractory_steps);
            true
        } else {
            false
        }
    }

    /// Set the injected current used from the next step on (pA)
    pub fn set_input_current(&mut self, current: f64) {
        self.state.resting_input = current;
    }

    /// Restore the initial dynamic state; parameters and propagators are kept
    pub fn reset_state(&mut self) {
        self.state = NeuronState::default();
    }

    /// Membrane potential relative to `E_L` (mV)
    pub fn membrane_potential(&self) -> f64 {
        self.state.v_m
    }

    /// Membrane potential in absolute millivolts
    pub fn absolute_membrane_potential(&self) -> f64 {
        self.state.v_m + self.params.e_l()
    }

    /// Set the membrane potential in absolute millivolts
    pub fn set_absolute_membrane_potential(&mut self, v_m: f64) {
        self.state.v_m = v_m - self.params.e_l();
    }

    /// Current logical state
    pub fn phase(&self) -> Phase {
        match self.state.refractory_counter {
            0 => Phase::Integrating,
            n => Phase::Refractory(n),
        }
    }

    /// Whether the neuron is absolutely refractory
    pub fn is_refractory(&self) -> bool {
        self.state.refractory_counter > 0
    }

    /// Remaining refractory steps
    pub fn refractory_counter(&self) -> u64 {
        self.state.refractory_counter
    }

    /// Refractory period in steps, if calibrated
    pub fn refractory_steps(&self) -> Option<u64> {
        self.propagators.map(|p| p.refractory_steps)
    }

    /// Buffered refractory input (mV)
    pub fn refractory_accumulator(&self) -> f64 {
        self.state.refractory_accumulator
    }

    /// Propagators from the last successful calibration
    pub fn propagators(&self) -> Option<&Propagators> {
        self.propagators.as_ref()
    }

    /// Whether `calibrate` has to run before the next update
    pub fn needs_calibration(&self) -> bool {
        self.propagators.is_none()
    }

    /// Model parameters
    pub fn params(&self) -> &IafParams {
        &self.params
    }

    /// Dynamic state
    pub fn state(&self) -> &NeuronState {
        &self.state
    }
}
