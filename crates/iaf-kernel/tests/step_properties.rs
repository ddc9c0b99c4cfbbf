use iaf_kernel::{update_batch, IafParams, IafPscDelta, Phase, Propagators};
use proptest::prelude::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn calibrated(params: IafParams, resolution: f64) -> IafPscDelta {
    let mut neuron = IafPscDelta::new(params).expect("valid params");
    neuron.calibrate(resolution).expect("valid resolution");
    neuron
}

#[test]
fn reference_scenario() {
    init_logging();
    let params = IafParams::default()
        .with_tau_m(10.0)
        .with_c_m(250.0)
        .with_t_ref(2.0)
        .with_v_th(15.0)
        .with_v_reset(0.0);
    assert_eq!(params.e_l(), -70.0);
    let mut neuron = calibrated(params, 0.1);

    let p = *neuron.propagators().unwrap();
    assert!((p.decay_factor - 0.990_049_833_749_168).abs() < 1e-12);
    assert!((p.input_gain - 0.000_398_006_650_0).abs() < 1e-12);
    assert_eq!(p.refractory_steps, 20);

    assert!(neuron.update(20.0, 0.0));
    assert_eq!(neuron.membrane_potential(), 0.0);
    assert_eq!(neuron.refractory_counter(), 20);
}

#[test]
fn refractory_buffer_replays_discounted_input() {
    init_logging();
    let h = 0.1;
    let mut buffered = calibrated(IafParams::default().with_refractory_input(true), h);
    let mut discarding = calibrated(IafParams::default(), h);

    for neuron in [&mut buffered, &mut discarding] {
        assert!(neuron.update(20.0, 0.0));
        // counter 20 -> 19, then 19 -> 18
        neuron.update(2.0, 0.0);
        neuron.update(0.0, -0.5);
        assert_eq!(neuron.membrane_potential(), 0.0);
    }
    assert_eq!(discarding.refractory_accumulator(), 0.0);
    let expected = 2.0 * (-20.0 * h / 10.0f64).exp() - 0.5 * (-19.0 * h / 10.0f64).exp();
    assert!((buffered.refractory_accumulator() - expected).abs() < 1e-12);

    for neuron in [&mut buffered, &mut discarding] {
        while neuron.is_refractory() {
            assert!(!neuron.update(0.0, 0.0));
        }
        neuron.update(0.0, 0.0);
    }
    assert!((buffered.membrane_potential() - expected).abs() < 1e-12);
    assert_eq!(discarding.membrane_potential(), 0.0);
}

#[test]
fn resumes_integration_after_refractoriness() {
    let mut neuron = calibrated(IafParams::default().with_t_ref(0.3), 0.1);
    assert!(neuron.update(20.0, 0.0));
    assert_eq!(neuron.phase(), Phase::Refractory(3));
    neuron.update(0.0, 0.0);
    neuron.update(0.0, 0.0);
    assert!(!neuron.update(0.0, 0.0));
    assert_eq!(neuron.phase(), Phase::Integrating);
    assert!(neuron.update(16.0, 0.0));
    assert_eq!(neuron.phase(), Phase::Refractory(3));
}

#[test]
fn constant_current_reaches_threshold() {
    // steady state of I * tau_m / C_m = 20mV lies above the 15mV threshold
    let mut neuron = calibrated(IafParams::default().with_i_e(500.0), 0.1);
    let first_spike = (1..10_000).find(|_| neuron.update(0.0, 0.0));
    // analytic crossing at tau_m * ln(20 / 5) = 13.86ms
    assert_eq!(first_spike, Some(139));
}

proptest! {
    #[test]
    fn calibrate_yields_valid_propagators(
        tau_m in 0.1f64..100.0,
        c_m in 1.0f64..1000.0,
        resolution in 0.01f64..1.0,
    ) {
        let params = IafParams::default().with_tau_m(tau_m).with_c_m(c_m);
        let p = Propagators::compute(&params, resolution).unwrap();
        prop_assert!(p.decay_factor > 0.0 && p.decay_factor < 1.0);
        prop_assert!(p.input_gain > 0.0);

        let mut neuron = IafPscDelta::new(params).unwrap();
        neuron.calibrate(resolution).unwrap();
        let first = *neuron.propagators().unwrap();
        neuron.calibrate(resolution).unwrap();
        prop_assert_eq!(&first, neuron.propagators().unwrap());
        prop_assert_eq!(first, p);
    }

    #[test]
    fn refractory_period_lasts_exactly_refractory_steps(
        t_ref in 0.0f64..5.0,
        resolution in prop::sample::select(vec![0.05, 0.1, 0.25, 0.5, 1.0]),
    ) {
        let mut neuron = calibrated(IafParams::default().with_t_ref(t_ref), resolution);
        let steps = neuron.refractory_steps().unwrap();
        prop_assert_eq!(steps, (t_ref / resolution).round() as u64);

        prop_assert!(neuron.update(100.0, 0.0));
        for _ in 0..steps {
            prop_assert!(neuron.is_refractory());
            prop_assert!(!neuron.update(100.0, 0.0));
            prop_assert_eq!(neuron.membrane_potential(), 0.0);
        }
        prop_assert_eq!(neuron.phase(), Phase::Integrating);
        prop_assert!(neuron.update(100.0, 0.0));
    }

    #[test]
    fn potential_never_drops_below_lower_bound(
        v_min in -50.0f64..-0.5,
        current in -1.0e6f64..0.0,
        inputs in prop::collection::vec(-500.0f64..0.0, 1..200),
    ) {
        let mut neuron = calibrated(IafParams::default().with_v_min(v_min), 0.1);
        neuron.set_input_current(current);
        for inh in inputs {
            neuron.update(0.0, inh);
            prop_assert!(neuron.membrane_potential() >= v_min);
        }
    }

    #[test]
    fn stepping_is_deterministic(
        refractory_input in any::<bool>(),
        inputs in prop::collection::vec((0.0f64..10.0, -5.0f64..0.0), 1..300),
    ) {
        let params = IafParams::default().with_refractory_input(refractory_input);
        let mut a = calibrated(params.clone(), 0.1);
        let mut b = calibrated(params, 0.1);
        for &(ex, inh) in &inputs {
            prop_assert_eq!(a.update(ex, inh), b.update(ex, inh));
            prop_assert_eq!(a.membrane_potential().to_bits(), b.membrane_potential().to_bits());
        }
        prop_assert_eq!(a.state(), b.state());
    }

    #[test]
    fn zero_input_decays_monotonically(v0 in 0.01f64..14.9, steps in 1usize..500) {
        let mut neuron = calibrated(IafParams::default(), 0.1);
        neuron.set_absolute_membrane_potential(v0 + neuron.params().e_l());
        let mut previous = neuron.membrane_potential();
        for _ in 0..steps {
            prop_assert!(!neuron.update(0.0, 0.0));
            let v = neuron.membrane_potential();
            prop_assert!(v < previous);
            prop_assert!(v >= 0.0);
            previous = v;
        }
    }

    #[test]
    fn batch_matches_sequential_updates(
        inputs in prop::collection::vec(
            prop::collection::vec((0.0f64..20.0, -10.0f64..0.0), 16),
            1..50,
        ),
    ) {
        let mut batch: Vec<_> = (0..16).map(|_| calibrated(IafParams::default(), 0.1)).collect();
        let mut sequential = batch.clone();
        for step in &inputs {
            let ex: Vec<f64> = step.iter().map(|&(ex, _)| ex).collect();
            let inh: Vec<f64> = step.iter().map(|&(_, inh)| inh).collect();
            let spiked = update_batch(&mut batch, &ex, &inh).unwrap();
            let expected: Vec<usize> = sequential
                .iter_mut()
                .enumerate()
                .filter_map(|(i, n)| n.update(ex[i], inh[i]).then_some(i))
                .collect();
            prop_assert_eq!(spiked, expected);
        }
        for (a, b) in batch.iter().zip(&sequential) {
            prop_assert_eq!(a.state(), b.state());
        }
    }
}
