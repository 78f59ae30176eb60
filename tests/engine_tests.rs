// tests/engine_tests.rs

use qfield::{
    EnvironmentEffect, Environment, FieldEngine, FieldError, FixedDraws, Operation, ScheduleBuilder, SeededSource,
    Simulator,
};

const TEST_TOLERANCE: f64 = 1e-9;

fn assert_unit_sum(weights: &[f64], context: &str) {
    let total: f64 = weights.iter().sum();
    assert!((total - 1.0).abs() < TEST_TOLERANCE, "Sum {} is not 1 - {}", total, context);
}

fn flat_engine(weights: Vec<f64>) -> Result<FieldEngine<FixedDraws>, FieldError> {
    let mut engine = FieldEngine::new(weights.len(), 0.0, FixedDraws::constant(0.5))?;
    engine.replace_weights(weights)?;
    Ok(engine)
}

#[test]
fn test_operators_keep_unit_sum() -> Result<(), FieldError> {
    let mut engine = FieldEngine::seeded(8, 6.0, 11)?;
    assert_unit_sum(engine.weights(), "after construction");

    engine.reset(5);
    assert_unit_sum(engine.weights(), "after reset");
    engine.mix(0.7);
    assert_unit_sum(engine.weights(), "after mix");
    engine.local_interference(2, 0.4)?;
    assert_unit_sum(engine.weights(), "after interference");
    engine.phase_shift(5)?;
    assert_unit_sum(engine.weights(), "after phase shift");
    engine.leak(5, 1, 0.3)?;
    assert_unit_sum(engine.weights(), "after leak");
    engine.decohere(1, 0.5)?;
    engine.normalize();
    assert_unit_sum(engine.weights(), "after decoherence and normalize");
    engine.fluctuate(0.2);
    assert_unit_sum(engine.weights(), "after fluctuation");
    Ok(())
}

#[test]
fn test_reset_is_strictly_positive_and_peaked() -> Result<(), FieldError> {
    for difficulty in [0.0, 8.0, 19.0, 500.0] {
        let mut engine = FieldEngine::seeded(8, difficulty, 3)?;
        engine.reset(4);
        assert!(engine.weights().iter().all(|w| *w > 0.0), "difficulty {}", difficulty);
    }

    let mut engine = FieldEngine::new(8, 0.0, FixedDraws::constant(0.0))?;
    engine.reset(0);
    let w = engine.weights();
    for i in 1..w.len() {
        assert!(w[i] < w[i - 1], "weights must fall away from the origin: {:?}", w);
    }
    assert_eq!(engine.brightest(), 0);
    Ok(())
}

#[test]
fn test_reset_clamps_origin_past_last_column() -> Result<(), FieldError> {
    let mut engine = FieldEngine::new(6, 0.0, FixedDraws::constant(0.0))?;
    engine.reset(40);
    assert_eq!(engine.brightest(), 5);
    Ok(())
}

#[test]
fn test_local_interference_exact_values() -> Result<(), FieldError> {
    let mut weights = vec![0.1; 8];
    weights[0] = 0.3;
    let mut engine = flat_engine(weights)?;

    engine.local_interference(0, 1.0)?;
    let w = engine.weights();
    assert!((w[0] - 5.0 / 26.0).abs() < TEST_TOLERANCE, "w0 = {}", w[0]);
    for (i, value) in w.iter().enumerate().skip(1) {
        assert!((value - 3.0 / 26.0).abs() < TEST_TOLERANCE, "w{} = {}", i, value);
    }
    Ok(())
}

#[test]
fn test_leak_moves_mass_without_renormalizing() -> Result<(), FieldError> {
    let mut engine = flat_engine(vec![0.1, 0.2, 0.3, 0.4])?;
    let moved = engine.leak(3, 0, 0.5)?;
    assert!((moved - 0.2).abs() < TEST_TOLERANCE);
    let w = engine.weights();
    assert!((w[0] - 0.3).abs() < TEST_TOLERANCE);
    assert!((w[3] - 0.2).abs() < TEST_TOLERANCE);
    assert_unit_sum(w, "after leak");

    assert_eq!(engine.leak(2, 2, 0.9)?, 0.0);
    Ok(())
}

#[test]
fn test_sampling_is_reproducible_from_seed() -> Result<(), FieldError> {
    let mut a = FieldEngine::seeded(8, 4.0, 99)?;
    let mut b = FieldEngine::seeded(8, 4.0, 99)?;
    for _ in 0..50 {
        a.mix(0.5);
        b.mix(0.5);
        assert_eq!(a.sample(), b.sample());
    }
    assert_eq!(a.weights(), b.weights());
    Ok(())
}

#[test]
fn test_sample_with_cumulative_rule() -> Result<(), FieldError> {
    let engine = flat_engine(vec![0.1, 0.2, 0.3, 0.4])?;
    assert_eq!(engine.sample_with(0.0), 0);
    assert_eq!(engine.sample_with(0.05), 0);
    assert_eq!(engine.sample_with(0.2), 1);
    assert_eq!(engine.sample_with(0.45), 2);
    assert_eq!(engine.sample_with(0.8), 3);
    assert_eq!(engine.sample_with(0.999_999), 3);
    Ok(())
}

#[test]
fn test_zero_weight_columns_are_never_sampled() -> Result<(), FieldError> {
    let engine = flat_engine(vec![0.0, 0.5, 0.5, 0.0])?;
    assert_eq!(engine.sample_with(0.0), 1);
    assert_eq!(engine.sample_with(0.5), 1);
    assert_eq!(engine.sample_with(0.51), 2);
    assert_eq!(engine.sample_with(0.999_999), 2);
    for step in 0..100 {
        let column = engine.sample_with(step as f64 / 100.0);
        assert!(column == 1 || column == 2, "drew empty column {}", column);
    }
    Ok(())
}

#[test]
fn test_mix_blends_toward_bounded_noise() -> Result<(), FieldError> {
    // Construction's reset uses one full cycle of four draws, so mix starts the cycle again.
    let mut engine = FieldEngine::new(4, 0.0, FixedDraws::new(vec![0.0, 1.0, 0.0, 1.0]))?;
    engine.replace_weights(vec![0.1, 0.2, 0.3, 0.4])?;
    engine.mix(1.0);
    // Draw 0 yields noise 0.95, a draw just under 1 yields noise just above 0.05.
    let expected = [0.475, 0.025, 0.475, 0.025];
    for (i, (got, want)) in engine.weights().iter().zip(expected).enumerate() {
        assert!((got - want).abs() < TEST_TOLERANCE, "w{} = {}", i, got);
    }

    let mut engine = FieldEngine::new(4, 0.0, FixedDraws::constant(0.0))?;
    engine.replace_weights(vec![0.1, 0.2, 0.3, 0.4])?;
    engine.mix(0.5);
    // w * 0.5 + 0.95 * 0.5, then normalized by the total 2.4.
    let expected = [0.525 / 2.4, 0.575 / 2.4, 0.625 / 2.4, 0.675 / 2.4];
    for (i, (got, want)) in engine.weights().iter().zip(expected).enumerate() {
        assert!((got - want).abs() < TEST_TOLERANCE, "w{} = {}", i, got);
    }

    let mut engine = FieldEngine::seeded(16, 0.0, 8)?;
    engine.mix(1.0);
    let w = engine.weights();
    let max = w.iter().cloned().fold(f64::MIN, f64::max);
    let min = w.iter().cloned().fold(f64::MAX, f64::min);
    assert!(min > 0.0);
    assert!(max / min <= 0.95 / 0.05 + TEST_TOLERANCE, "noise outside (0.05, 0.95]: {:?}", w);
    Ok(())
}

#[test]
fn test_phase_shift_damps_within_default_range() -> Result<(), FieldError> {
    for seed in 0..20 {
        let mut engine = FieldEngine::new(4, 0.0, SeededSource::from_seed(seed))?;
        engine.replace_weights(vec![0.25; 4])?;
        let factor = engine.phase_shift(1)?;
        assert!((0.88..=0.98).contains(&factor), "factor {}", factor);
        let w = engine.weights();
        let expected = 0.25 * factor / (0.75 + 0.25 * factor);
        assert!((w[1] - expected).abs() < TEST_TOLERANCE);
        assert!(w[1] < 0.25);
        assert!(w[0] > 0.25);
    }

    let mut engine = flat_engine(vec![0.25; 4])?;
    let mut low = FieldEngine::new(4, 0.0, FixedDraws::constant(0.0))?;
    low.replace_weights(vec![0.25; 4])?;
    assert!((low.phase_shift(2)? - 0.88).abs() < TEST_TOLERANCE);
    assert!((engine.phase_shift(2)? - 0.93).abs() < TEST_TOLERANCE);
    Ok(())
}

#[test]
fn test_decohere_leaves_normalization_to_caller() -> Result<(), FieldError> {
    let mut engine = flat_engine(vec![0.25; 4])?;
    engine.decohere(2, 0.5)?;
    engine.decohere(3, 0.0)?;
    let total: f64 = engine.weights().iter().sum();
    assert!((total - 0.625).abs() < TEST_TOLERANCE, "total {}", total);
    assert!((engine.weights()[2] - 0.125).abs() < TEST_TOLERANCE);

    assert!(engine.normalize());
    assert_unit_sum(engine.weights(), "after batch normalize");
    assert!((engine.weights()[0] - 0.4).abs() < TEST_TOLERANCE);
    assert_eq!(engine.weights()[3], 0.0);
    Ok(())
}

#[test]
fn test_degenerate_field_samples_uniformly() -> Result<(), FieldError> {
    let mut engine = FieldEngine::new(8, 0.0, SeededSource::from_seed(2024))?;
    engine.replace_weights(vec![0.0; 8])?;
    assert!(engine.is_degenerate());

    let draws = 8_000;
    let mut counts = [0usize; 8];
    for _ in 0..draws {
        counts[engine.sample()] += 1;
    }
    for (column, count) in counts.iter().enumerate() {
        assert!((800..=1200).contains(count), "column {} drawn {} times", column, count);
    }
    assert_eq!(engine.sample_with(0.99), 7);
    Ok(())
}

#[test]
fn test_brightest_prefers_lowest_index_on_ties() -> Result<(), FieldError> {
    let engine = flat_engine(vec![0.5, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])?;
    assert_eq!(engine.brightest(), 0);
    Ok(())
}

#[test]
fn test_reset_damp_collapse_scenario() -> Result<(), FieldError> {
    let mut engine = FieldEngine::seeded(8, 0.0, 5)?;
    engine.reset(3);
    engine.phase_shift_by(3, 0.9)?;
    assert_unit_sum(engine.weights(), "after damping");
    assert_eq!(engine.sample_with(0.0), 0);
    Ok(())
}

#[test]
fn test_bad_columns_are_rejected() -> Result<(), FieldError> {
    let mut engine = FieldEngine::seeded(4, 0.0, 1)?;
    let before = engine.weights().to_vec();

    assert!(matches!(engine.local_interference(4, 0.5), Err(FieldError::InvalidArgument { .. })));
    assert!(matches!(engine.phase_shift(9), Err(FieldError::InvalidArgument { .. })));
    assert!(matches!(engine.leak(0, 4, 0.5), Err(FieldError::InvalidArgument { .. })));
    assert!(matches!(engine.decohere(7, 0.5), Err(FieldError::InvalidArgument { .. })));
    assert!(matches!(engine.phase_shift_within(1, 0.9, 0.5), Err(FieldError::InvalidArgument { .. })));
    assert!(matches!(engine.replace_weights(vec![0.5; 3]), Err(FieldError::InvalidArgument { .. })));
    assert!(matches!(engine.replace_weights(vec![0.5, -0.1, 0.3, 0.3]), Err(FieldError::InvalidArgument { .. })));
    assert_eq!(engine.weights(), before.as_slice());

    assert!(matches!(FieldEngine::seeded(0, 0.0, 1), Err(FieldError::InvalidArgument { .. })));
    Ok(())
}

#[test]
fn test_environment_runs_through_schedule_and_simulator() -> Result<(), FieldError> {
    let mut engine = flat_engine(vec![0.25; 4])?;
    let env = Environment::new()
        .with_effect(EnvironmentEffect::DecoField { column: 2, retention: 0.0 })
        .with_effect(EnvironmentEffect::Portal { from: 3, to: 0, fraction: 1.0 });
    env.apply(&mut engine)?;
    // [0.25, 0.25, 0, 0.25] / 0.75, then column 3 poured into column 0.
    let w = engine.weights();
    assert!((w[0] - 2.0 / 3.0).abs() < TEST_TOLERANCE);
    assert!((w[1] - 1.0 / 3.0).abs() < TEST_TOLERANCE);
    assert!(w[2].abs() < TEST_TOLERANCE && w[3].abs() < TEST_TOLERANCE);

    let schedule = ScheduleBuilder::new()
        .add_op(Operation::Measure { target: 0 })
        .add_op(Operation::Measure { target: 3 })
        .build();
    let result = Simulator::new().run(&mut engine, &schedule)?;
    assert_eq!(result.collapses(), vec![0, 0]);
    let first = &result.measurements()[0];
    assert!(first.is_coherent());
    assert_eq!(first.mirror(), 3);
    assert!(!result.measurements()[1].is_coherent());
    Ok(())
}

#[test]
fn test_measure_is_rejected_by_apply_operation() -> Result<(), FieldError> {
    let mut engine = FieldEngine::seeded(4, 0.0, 1)?;
    assert!(engine.apply_operation(&Operation::Measure { target: 0 }).is_err());
    engine.apply_operation(&Operation::Leak { source: 0, target: 1, fraction: 0.5 })?;
    Ok(())
}
