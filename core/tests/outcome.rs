use pipeline_core::{
    outcome::simulate_outcome,
    rng::DealRng,
    types::Stage,
};

#[test]
fn zero_probability_is_a_certain_loss() {
    for seed in 0..500 {
        let outcome = simulate_outcome(&[0.0, 0.9, 0.9, 0.9, 0.9], &mut DealRng::from_seed(seed));
        assert_eq!(outcome.terminal, Stage::ClosedLost);
        assert_eq!(outcome.highest_reached, Stage::LeadQualification);
    }
}

#[test]
fn certain_advance_always_wins() {
    for seed in 0..500 {
        let outcome = simulate_outcome(&[1.0; 5], &mut DealRng::from_seed(seed));
        assert_eq!(outcome.terminal, Stage::ClosedWon);
        assert_eq!(outcome.highest_reached, Stage::ContractReview);
    }
}

#[test]
fn raising_one_stage_never_lowers_reach() {
    let base: [f64; 5] = [0.8, 0.7, 0.6, 0.75, 0.85];
    for k in 0..5 {
        let mut raised = base;
        raised[k] = (raised[k] + 0.15).min(1.0);
        for seed in 0..1_000 {
            let a = simulate_outcome(&base, &mut DealRng::new(17, seed));
            let b = simulate_outcome(&raised, &mut DealRng::new(17, seed));
            assert!(
                b.highest_reached >= a.highest_reached,
                "stage {k}, seed {seed}: reach dropped from {} to {}",
                a.highest_reached, b.highest_reached
            );
        }
    }
}

#[test]
fn win_rate_matches_product_of_probabilities() {
    let probs = [0.8, 0.7, 0.6, 0.75, 0.85];
    let expected: f64 = probs.iter().product();
    let n = 20_000;
    let wins = (0..n)
        .filter(|&i| simulate_outcome(&probs, &mut DealRng::new(99, i)).terminal == Stage::ClosedWon)
        .count();
    let observed = wins as f64 / n as f64;
    assert!((observed - expected).abs() < 0.015, "observed {observed:.3}, expected {expected:.3}");
}
