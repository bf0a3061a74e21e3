use pipeline_core::{
    config::EngineConfig,
    error::PipelineError,
    profile::{ProfileRegistry, StageTimingCurve},
    types::{Classification, Segment, Stage},
};

#[test]
fn standard_registry_covers_every_pair() {
    let config = EngineConfig::standard();
    let registry = ProfileRegistry::new(config.profiles.clone(), &config.rules).unwrap();
    assert_eq!(registry.len(), 9);
    for segment in Segment::ALL {
        for classification in Classification::ALL {
            let profile = registry.resolve(segment, classification).unwrap();
            assert_eq!(profile.segment, segment);
            assert_eq!(profile.classification, classification);
        }
    }
}

#[test]
fn competitive_deals_run_longer_and_win_less() {
    let config = EngineConfig::standard();
    let registry = ProfileRegistry::new(config.profiles.clone(), &config.rules).unwrap();
    for segment in Segment::ALL {
        let base = registry.resolve(segment, Classification::Baseline).unwrap();
        let comp = registry.resolve(segment, Classification::Competitive).unwrap();
        assert!(comp.cycle_days.mean > base.cycle_days.mean, "{segment}");
        assert!(comp.nominal_win_rate < base.nominal_win_rate, "{segment}");
    }
}

#[test]
fn duplicate_profile_rejected() {
    let config = EngineConfig::standard();
    let mut profiles = config.profiles.clone();
    profiles.push(profiles[0].clone());
    let err = ProfileRegistry::new(profiles, &config.rules).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidConfig(_)), "got {err}");
}

#[test]
fn out_of_range_probability_rejected() {
    let mut config = EngineConfig::standard();
    config.profiles[3].stage_advance_probabilities[2] = 1.2;
    let err = ProfileRegistry::new(config.profiles, &config.rules).unwrap_err();
    match err {
        PipelineError::InvalidProfile { segment, classification, reason } => {
            assert_eq!(segment, Segment::MidMarket);
            assert_eq!(classification, Classification::Baseline);
            assert!(reason.contains("1.2"), "reason: {reason}");
        }
        other => panic!("expected InvalidProfile, got {other}"),
    }
}

#[test]
fn malformed_curve_rejected() {
    let mut config = EngineConfig::standard();
    config.profiles[0].stage_timing_curve =
        StageTimingCurve([0.1, 0.15, 0.35, 0.55, 0.75, 1.0, 1.0]);
    assert!(ProfileRegistry::new(config.profiles, &config.rules).is_err());
}

#[test]
fn unreachable_pair_may_be_missing() {
    // Only Enterprise can be targeting-lapsed under the default rules, but
    // removing the SMB lapsed profile must still leave a valid registry.
    let config = EngineConfig::standard();
    let profiles: Vec<_> = config
        .profiles
        .into_iter()
        .filter(|p| !(p.segment == Segment::Smb && p.classification == Classification::TargetingLapsed))
        .collect();
    let registry = ProfileRegistry::new(profiles, &config.rules).unwrap();
    assert!(matches!(
        registry.resolve(Segment::Smb, Classification::TargetingLapsed),
        Err(PipelineError::Configuration { .. })
    ));
}

#[test]
fn dwell_stretch_conserves_cycle() {
    let config = EngineConfig::standard();
    let curve = config.profiles[1].stage_timing_curve;
    let stretched = curve.with_dwell_modifiers(&[1.0, 1.25, 1.0, 1.3, 1.4]);
    stretched.validate().unwrap();
    assert_eq!(stretched.position(Stage::ClosedWon), 1.0);
    assert_eq!(stretched.position(Stage::LeadQualification), 0.0);
    let before = curve.position(Stage::ContractReview);
    let after = stretched.position(Stage::ContractReview);
    assert!(after < before, "stretched contract review should start earlier: {before} -> {after}");
}
