use chrono::{Duration, NaiveDate};
use pipeline_core::{
    assembler::OpportunityRecord,
    batch::{BatchGenerator, BatchSpec, FailurePolicy},
    config::EngineConfig,
    engine::{DealEngine, DealInput},
    rng::DealRng,
    roster::StaticRoster,
    types::{Classification, Segment, Stage},
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn batch(seed: u64, deals: u64) -> (DealEngine, Vec<OpportunityRecord>) {
    let engine = DealEngine::new(EngineConfig::standard()).unwrap();
    let roster = StaticRoster::standard();
    let spec = BatchSpec {
        deals,
        seed,
        start_date: d(2023, 1, 1),
        as_of:      d(2025, 9, 13),
        policy:     FailurePolicy::AbortAll,
    };
    let records = BatchGenerator::new(&engine, &roster, spec).unwrap().run().unwrap().records;
    (engine, records)
}

#[test]
fn entry_dates_never_run_backwards() {
    let (_, records) = batch(11, 1_000);
    for r in &records {
        let dates: Vec<NaiveDate> = r.stage_entry_dates.present().map(|(_, d)| d).collect();
        for pair in dates.windows(2) {
            assert!(pair[1] >= pair[0], "{}: {} before {}", r.opportunity_id, pair[1], pair[0]);
        }
        assert_eq!(r.stage_entry_dates.get(Stage::LeadQualification), Some(r.created_date));
        for (stage, days) in r.days_in_stage.present() {
            assert!(days >= 0, "{}: negative dwell in {stage}", r.opportunity_id);
        }
    }
}

#[test]
fn won_and_lost_report_fixed_values() {
    let (_, records) = batch(12, 1_000);
    let mut won = 0;
    let mut lost = 0;
    for r in &records {
        match r.stage {
            Stage::ClosedWon => {
                won += 1;
                assert_eq!(r.probability, 100);
                assert_eq!(r.expected_revenue, r.amount);
                assert!(r.is_won && r.is_closed);
                assert_eq!(r.stage_entry_dates.get(Stage::ClosedWon), Some(r.close_date));
                assert_eq!(r.stage_entry_dates.get(Stage::ClosedLost), None);
            }
            Stage::ClosedLost => {
                lost += 1;
                assert_eq!(r.probability, 0);
                assert_eq!(r.expected_revenue, 0.0);
                let highest = r.highest_stage_reached.expect("lost deals report their highest stage");
                for stage in Stage::OPEN {
                    let recorded = r.stage_entry_dates.get(stage).is_some();
                    assert_eq!(
                        recorded,
                        stage <= highest,
                        "{}: {stage} recorded={recorded}, highest={highest}",
                        r.opportunity_id
                    );
                }
            }
            _ => assert!(!r.is_closed),
        }
        if r.stage != Stage::ClosedLost {
            assert_eq!(r.highest_stage_reached, None, "{}", r.opportunity_id);
        }
    }
    assert!(won > 0 && lost > 0, "expected both outcomes, got {won} won / {lost} lost");
}

#[test]
fn closed_dwell_sums_to_cycle() {
    let (_, records) = batch(13, 1_000);
    for r in records.iter().filter(|r| r.is_closed) {
        let total: i64 = r.days_in_stage.present().map(|(_, d)| d).sum();
        assert_eq!(total, (r.close_date - r.created_date).num_days(), "{}", r.opportunity_id);
        assert_eq!(total, r.cycle_days, "{}", r.opportunity_id);
    }
}

#[test]
fn open_deals_report_their_profile_probability() {
    let (engine, records) = batch(14, 1_000);
    let as_of = d(2025, 9, 13);
    let mut open = 0;
    for r in records.iter().filter(|r| !r.is_closed) {
        open += 1;
        let profile = engine.registry().resolve(r.segment, r.classification).unwrap();
        assert_eq!(r.probability, profile.open_probability(r.stage));
        assert_eq!(r.expected_revenue, (r.amount * r.probability as f64 / 100.0).trunc());
        assert!(r.close_date > as_of);
        for (_, entry) in r.stage_entry_dates.present() {
            assert!(entry <= as_of, "{}: entry {entry} after as-of", r.opportunity_id);
        }
        let total: i64 = r.days_in_stage.present().map(|(_, d)| d).sum();
        assert_eq!(total, r.age_days);
    }
    assert!(open > 0, "a recent window should leave some deals open");
}

#[test]
fn competitive_and_off_target_fields_follow_flags() {
    let (engine, records) = batch(15, 500);
    let competitors = &engine.config().competitors;
    for r in &records {
        assert_eq!(r.primary_competitor.is_some(), r.competitive);
        if let Some(name) = &r.primary_competitor {
            assert!(competitors.contains(name));
        }
        assert_eq!(r.icp_mismatch_reason.is_some(), !r.targeted);
        assert!(r.opportunity_name.ends_with("- AI Platform Implementation"));
        assert!(r.opportunity_id.starts_with("OPP-"));
    }
}

#[test]
fn targeting_lapsed_enterprise_deal_stalls_in_discovery() {
    let mut config = EngineConfig::standard();
    config.events.clear();
    config.competitive.curves.enterprise.ceiling = 0.0;
    config.targeting.curves.enterprise.floor = 0.0;
    config.targeting.curves.enterprise.ceiling = 0.0;
    let profile = config
        .profile_mut(Segment::Enterprise, Classification::TargetingLapsed)
        .unwrap();
    profile.cycle_days.mean = 280.0;
    profile.cycle_days.spread = 0.0;
    profile.stage_advance_probabilities = [1.0; 5];

    let engine = DealEngine::new(config).unwrap();
    let roster = StaticRoster::standard();
    let created = d(2024, 1, 1);

    for seed in 0..50 {
        let input = DealInput {
            deal_id:    format!("OPP-{seed:06}"),
            segment:    Segment::Enterprise,
            created_at: created,
            amount:     250_000.0,
            as_of:      d(2025, 9, 13),
        };
        let r = engine.generate(input, &roster, &mut DealRng::new(seed, 0)).unwrap();

        assert_eq!(r.classification, Classification::TargetingLapsed);
        assert_eq!(r.icp_mismatch_reason.as_deref(), Some("Industry not core ICP"));
        assert!(r.is_closed && r.is_won);
        assert_eq!(r.cycle_days, 280);
        assert_eq!(r.close_date, d(2024, 10, 7));

        let discovery = (r.stage_entry_dates.get(Stage::Discovery).unwrap() - created).num_days();
        let proposal = (r.stage_entry_dates.get(Stage::Proposal).unwrap() - created).num_days();
        assert!((12..=16).contains(&discovery), "seed {seed}: discovery at +{discovery}");
        assert!((171..=249).contains(&proposal), "seed {seed}: proposal at +{proposal}");
        assert_eq!(r.highest_stage_reached, None);
        assert!(r.days_in_stage.get(Stage::Discovery).unwrap() >= 155);
    }
}

#[test]
fn open_mid_market_baseline_reports_discovery_probability() {
    let mut config = EngineConfig::standard();
    config.competitive.curves.mid_market.ceiling = 0.0;
    let profile = config
        .profile_mut(Segment::MidMarket, Classification::Baseline)
        .unwrap();
    profile.cycle_days.mean = 90.0;
    profile.cycle_days.spread = 0.0;

    let engine = DealEngine::new(config).unwrap();
    let roster = StaticRoster::standard();
    let as_of = d(2024, 11, 15);

    for seed in 0..50 {
        let input = DealInput {
            deal_id:    "OPP-000001".into(),
            segment:    Segment::MidMarket,
            created_at: as_of - Duration::days(20),
            amount:     50_000.0,
            as_of,
        };
        let r = engine.generate(input, &roster, &mut DealRng::new(seed, 3)).unwrap();

        assert_eq!(r.classification, Classification::Baseline);
        assert!(!r.is_closed);
        assert_eq!(r.stage, Stage::Discovery);
        assert_eq!(r.probability, 25);
        assert_eq!(r.expected_revenue, 12_500.0);
        assert_eq!(r.age_days, 20);
        assert_eq!(r.stage_entry_dates.get(Stage::Proposal), None);
        let json = serde_json::to_value(&r).unwrap();
        assert!(json["highest_stage_reached"].is_null());
    }
}

#[test]
fn events_lengthen_their_stage_without_changing_cycle() {
    let build = |events: bool| {
        let mut config = EngineConfig::standard();
        if !events {
            config.events.clear();
        }
        config.jitter_fraction = 0.0;
        config.competitive.curves.enterprise.ceiling = 0.0;
        config.targeting.curves.enterprise.floor = 1.0;
        let profile = config
            .profile_mut(Segment::Enterprise, Classification::Baseline)
            .unwrap();
        profile.cycle_days.spread = 0.0;
        profile.stage_advance_probabilities = [1.0; 5];
        DealEngine::new(config).unwrap()
    };
    let roster = StaticRoster::standard();
    let input = DealInput {
        deal_id:    "OPP-000001".into(),
        segment:    Segment::Enterprise,
        created_at: d(2024, 9, 1),
        amount:     300_000.0,
        as_of:      d(2025, 9, 13),
    };

    let plain = build(false).generate(input.clone(), &roster, &mut DealRng::from_seed(4)).unwrap();
    let shifted = build(true).generate(input, &roster, &mut DealRng::from_seed(4)).unwrap();

    assert_eq!(plain.cycle_days, 180);
    assert_eq!(shifted.cycle_days, 180);
    assert_eq!(plain.close_date, shifted.close_date);
    assert_eq!(plain.days_in_stage.get(Stage::ContractReview), Some(45));
    assert_eq!(shifted.days_in_stage.get(Stage::ContractReview), Some(52));
}
