//! Parameter files for neuron kernels
//!
//! ```toml
//! resolution = 0.1
//!
//! [neuron]
//! tau_m = 10.0
//! C_m = 250.0
//! t_ref = 2.0
//! E_L = -70.0
//! V_th = -55.0
//! V_reset = -70.0
//! refractory_input = true
//! ```
//!
//! Voltages in the file are absolute millivolts.

use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::{
    error::*,
    neuron::IafPscDelta,
    params::IafParams,
    status::StatusUpdate,
};

/// Default simulation resolution (ms)
pub const DEFAULT_RESOLUTION_MS: f64 = 0.1;

/// Neuron kernel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KernelConfig {
    /// Simulation step size (ms)
    pub resolution: f64,
    /// Neuron parameters
    pub neuron: NeuronConfig,
}

/// Neuron parameters as written by users, voltages absolute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NeuronConfig {
    /// Membrane time constant (ms)
    pub tau_m: f64,
    /// Membrane capacitance (pF)
    #[serde(rename = "C_m")]
    pub c_m: f64,
    /// Refractory period (ms)
    pub t_ref: f64,
    /// Resting potential (mV)
    #[serde(rename = "E_L")]
    pub e_l: f64,
    /// Constant external input current (pA)
    #[serde(rename = "I_e")]
    pub i_e: f64,
    /// Spike threshold (mV)
    #[serde(rename = "V_th")]
    pub v_th: f64,
    /// Reset potential (mV)
    #[serde(rename = "V_reset")]
    pub v_reset: f64,
    /// Lower bound of the membrane potential (mV), unclamped if absent
    #[serde(rename = "V_min")]
    pub v_min: Option<f64>,
    /// Buffer input during refractoriness
    pub refractory_input: bool,
    /// Initial membrane potential (mV), `E_L` if absent
    #[serde(rename = "V_m")]
    pub v_m: Option<f64>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION_MS,
            neuron: NeuronConfig::default(),
        }
    }
}

impl Default for NeuronConfig {
    fn default() -> Self {
        let params = IafParams::default();
        Self {
            tau_m: params.tau_m,
            c_m: params.c_m,
            t_ref: params.t_ref,
            e_l: params.e_l(),
            i_e: params.i_e,
            v_th: params.absolute_threshold(),
            v_reset: params.absolute_reset(),
            v_min: None,
            refractory_input: params.refractory_input,
            v_m: None,
        }
    }
}

impl NeuronConfig {
    /// Status update that turns default parameters into this configuration
    pub fn to_status_update(&self) -> StatusUpdate {
        StatusUpdate {
            e_l: Some(self.e_l),
            i_e: Some(self.i_e),
            v_th: Some(self.v_th),
            v_reset: Some(self.v_reset),
            v_min: Some(self.v_min.unwrap_or(f64::NEG_INFINITY)),
            c_m: Some(self.c_m),
            tau_m: Some(self.tau_m),
            t_ref: Some(self.t_ref),
            refractory_input: Some(self.refractory_input),
            v_m: Some(self.v_m.unwrap_or(self.e_l)),
        }
    }

    /// Build an uncalibrated neuron
    pub fn build(&self) -> Result<IafPscDelta> {
        let mut neuron = IafPscDelta::new(IafParams::default())?;
        neuron.set_status(&self.to_status_update())?;
        Ok(neuron)
    }
}

impl KernelConfig {
    /// Parse a configuration from TOML
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| KernelError::config_file(e.to_string()))
    }

    /// Load configuration from file, falling back to defaults if it is missing
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml_str(&content)
        } else {
            log::info!("No parameter file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| KernelError::config_file(format!("Failed to serialize config: {}", e)))
    }

    /// Build a neuron calibrated for the configured resolution
    pub fn build(&self) -> Result<IafPscDelta> {
        let mut neuron = self.neuron.build()?;
        neuron.calibrate(self.resolution)?;
        Ok(neuron)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_default_params() {
        let neuron = KernelConfig::default().build().unwrap();
        assert_eq!(neuron.params(), &IafParams::default());
        assert_eq!(neuron.membrane_potential(), 0.0);
        assert_eq!(neuron.refractory_steps(), Some(20));
    }

    #[test]
    fn test_parse_partial_file() {
        let config = KernelConfig::from_toml_str(
            r#"
            resolution = 0.5

            [neuron]
            E_L = -65.0
            V_th = -50.0
            refractory_input = true
            "#,
        )
        .unwrap();
        assert_eq!(config.resolution, 0.5);
        assert_eq!(config.neuron.tau_m, 10.0);

        let neuron = config.build().unwrap();
        assert_eq!(neuron.params().e_l(), -65.0);
        assert_eq!(neuron.params().v_th, 15.0);
        // default reset of -70mV stays absolute
        assert_eq!(neuron.params().v_reset, -5.0);
        assert!(neuron.params().refractory_input);
        assert_eq!(neuron.refractory_steps(), Some(4));
    }

    #[test]
    fn test_lower_bound_and_initial_potential() {
        let config = KernelConfig::from_toml_str(
            r#"
            [neuron]
            V_min = -80.0
            V_m = -60.0
            "#,
        )
        .unwrap();
        let neuron = config.build().unwrap();
        assert_eq!(neuron.params().v_min, -10.0);
        assert_eq!(neuron.membrane_potential(), 10.0);
    }

    #[test]
    fn test_invalid_values() {
        let config = KernelConfig::from_toml_str("[neuron]\nC_m = 0.0\n").unwrap();
        assert!(config.build().unwrap_err().is_configuration());

        let config = KernelConfig::from_toml_str("resolution = 0.0\n").unwrap();
        assert!(config.build().unwrap_err().is_configuration());
    }

    #[test]
    fn test_malformed_file() {
        let err = KernelConfig::from_toml_str("resolution = \"fast\"").unwrap_err();
        assert!(matches!(err, KernelError::ConfigFile { .. }));

        let err = KernelConfig::from_toml_str("[neuron]\ntau = 1.0\n").unwrap_err();
        assert!(matches!(err, KernelError::ConfigFile { .. }));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = KernelConfig::default();
        config.neuron.v_min = Some(-90.0);
        let text = config.to_toml_string().unwrap();
        assert_eq!(KernelConfig::from_toml_str(&text).unwrap(), config);
    }
}
