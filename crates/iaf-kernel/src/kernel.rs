//! Common interface of neuron update kernels
//!
//! A scheduler drives every neuron through [`NeuronKernel`], so different
//! model families can share one stepping loop. The helpers here apply one
//! global step to a slice of independent neurons; they neither route spikes
//! nor accumulate input.

use crate::{error::*, neuron::IafPscDelta};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-neuron state transition invoked once per simulation step
pub trait NeuronKernel: Send {
    /// Precompute step constants for `resolution` (ms)
    fn calibrate(&mut self, resolution: f64) -> Result<()>;

    /// Advance one step with this step's summed input; `true` on a spike
    fn update(&mut self, ex_input: f64, in_input: f64) -> bool;

    /// Membrane potential relative to rest (mV)
    fn membrane_potential(&self) -> f64;

    /// Whether the neuron is absolutely refractory
    fn is_refractory(&self) -> bool;
}

impl NeuronKernel for IafPscDelta {
    fn calibrate(&mut self, resolution: f64) -> Result<()> {
        IafPscDelta::calibrate(self, resolution)
    }

    #[inline]
    fn update(&mut self, ex_input: f64, in_input: f64) -> bool {
        IafPscDelta::update(self, ex_input, in_input)
    }

    fn membrane_potential(&self) -> f64 {
        IafPscDelta::membrane_potential(self)
    }

    fn is_refractory(&self) -> bool {
        IafPscDelta::is_refractory(self)
    }
}

/// Calibrate every kernel, stopping at the first failure
pub fn calibrate_all<K: NeuronKernel>(kernels: &mut [K], resolution: f64) -> Result<()> {
    for kernel in kernels.iter_mut() {
        kernel.calibrate(resolution)?;
    }
    log::debug!("Calibrated {} kernels at h={}ms", kernels.len(), resolution);
    Ok(())
}

/// Apply one global step to independent neurons.
///
/// `ex_inputs[i]` and `in_inputs[i]` must already hold the complete input of
/// neuron `i` for this step. Returns the indices of the neurons that spiked,
/// in ascending order.
pub fn update_batch<K: NeuronKernel>(
    kernels: &mut [K],
    ex_inputs: &[f64],
    in_inputs: &[f64],
) -> Result<Vec<usize>> {
    for inputs in [ex_inputs, in_inputs] {
        if inputs.len() != kernels.len() {
            return Err(KernelError::InputLength {
                expected: kernels.len(),
                actual: inputs.len(),
            });
        }
    }

    #[cfg(feature = "parallel")]
    let spiked = kernels
        .par_iter_mut()
        .zip(ex_inputs.par_iter().zip(in_inputs.par_iter()))
        .enumerate()
        .filter_map(|(i, (kernel, (&ex, &inh)))| kernel.update(ex, inh).then_some(i))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let spiked = kernels
        .iter_mut()
        .zip(ex_inputs.iter().zip(in_inputs.iter()))
        .enumerate()
        .filter_map(|(i, (kernel, (&ex, &inh)))| kernel.update(ex, inh).then_some(i))
        .collect();

    Ok(spiked)
}
