// tests/walk_tests.rs

use qfield::remote::{LocalWalkService, ProbabilityService, WalkRequest};
use qfield::{simulate_walk, CoinType, FieldError};

const TEST_TOLERANCE: f64 = 1e-9;

fn assert_unit_sum(probabilities: &[f64]) {
    let total: f64 = probabilities.iter().sum();
    assert!((total - 1.0).abs() < TEST_TOLERANCE, "walk total {}", total);
}

#[test]
fn test_zero_steps_stays_on_start() -> Result<(), FieldError> {
    let p = simulate_walk(8, 0, CoinType::Hadamard, &[], 5)?;
    for (i, value) in p.iter().enumerate() {
        let expected = if i == 5 { 1.0 } else { 0.0 };
        assert!((value - expected).abs() < TEST_TOLERANCE);
    }
    Ok(())
}

#[test]
fn test_one_hadamard_step_splits_evenly() -> Result<(), FieldError> {
    let p = simulate_walk(8, 1, CoinType::Hadamard, &[], 3)?;
    assert!((p[2] - 0.5).abs() < TEST_TOLERANCE);
    assert!((p[4] - 0.5).abs() < TEST_TOLERANCE);
    assert_unit_sum(&p);

    // Column 0 wraps to the last column.
    let p = simulate_walk(8, 1, CoinType::Hadamard, &[], 0)?;
    assert!((p[7] - 0.5).abs() < TEST_TOLERANCE);
    assert!((p[1] - 0.5).abs() < TEST_TOLERANCE);
    Ok(())
}

#[test]
fn test_walks_conserve_probability() -> Result<(), FieldError> {
    let cases: [(CoinType, Vec<f64>); 4] = [
        (CoinType::Hadamard, vec![]),
        (CoinType::Biased, vec![]),
        (CoinType::Biased, vec![1.1]),
        (CoinType::Custom, vec![0.4, 2.0]),
    ];
    for (coin, angles) in cases {
        for steps in [1, 5, 17] {
            let p = simulate_walk(9, steps, coin, &angles, 4)?;
            assert_eq!(p.len(), 9);
            assert!(p.iter().all(|x| *x >= 0.0));
            assert_unit_sum(&p);
        }
    }
    Ok(())
}

#[test]
fn test_walk_rejects_bad_geometry() {
    assert!(matches!(simulate_walk(0, 3, CoinType::Hadamard, &[], 0), Err(FieldError::InvalidArgument { .. })));
    assert!(matches!(simulate_walk(4, 3, CoinType::Hadamard, &[], 4), Err(FieldError::InvalidArgument { .. })));
}

#[test]
fn test_local_service_matches_direct_walk() -> Result<(), Box<dyn std::error::Error>> {
    let request = WalkRequest::new(8, 2).with_steps(6).with_coin(CoinType::Custom, vec![0.3, 0.9]);
    let served = LocalWalkService.fetch(&request)?.into_probabilities()?;
    let direct = simulate_walk(8, 6, CoinType::Custom, &[0.3, 0.9], 2)?;
    assert_eq!(served, direct);
    Ok(())
}
