//! Per-neuron update kernel for discrete-time spiking network simulators
//!
//! This crate advances one integrate-and-fire neuron with delta-shaped
//! synaptic input by one simulation step. The surrounding scheduler owns the
//! clock, accumulates each neuron's input for the step, calls
//! [`IafPscDelta::update`] and fans the returned spike out to its targets.
//!
//! ```
//! use iaf_kernel::{IafParams, IafPscDelta};
//!
//! let mut neuron = IafPscDelta::new(IafParams::default())?;
//! neuron.calibrate(0.1)?;
//! assert!(!neuron.update(5.0, 0.0));
//! assert!(neuron.update(20.0, 0.0));
//! assert!(neuron.is_refractory());
//! # Ok::<(), iaf_kernel::KernelError>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod error;
pub mod params;
pub mod neuron;
pub mod status;
pub mod kernel;
#[cfg(feature = "config")]
pub mod config;

// Re-export essential types
pub use error::{KernelError, Result};
pub use params::IafParams;
pub use neuron::{IafPscDelta, NeuronState, Phase, Propagators};
pub use status::{Status, StatusUpdate};
pub use kernel::{calibrate_all, update_batch, NeuronKernel};
#[cfg(feature = "config")]
pub use config::{KernelConfig, NeuronConfig};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_integration() {
        let params = IafParams::default();
        assert!(params.tau_m > 0.0);

        let neuron = IafPscDelta::new(params).unwrap();
        assert!(neuron.needs_calibration());
        assert_eq!(neuron.phase(), Phase::Integrating);
    }
}
