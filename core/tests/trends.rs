use chrono::NaiveDate;
use pipeline_core::{
    config::{EngineConfig, TrendCurve},
    trend::stage_modifiers,
    types::{Segment, Stage},
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn month_starts(from_year: i32, months: u32) -> Vec<NaiveDate> {
    (0..months)
        .map(|i| d(from_year + (i / 12) as i32, i % 12 + 1, 1))
        .collect()
}

#[test]
fn competitive_pressure_never_falls_and_plateaus() {
    let config = EngineConfig::standard();
    for segment in Segment::ALL {
        let rates: Vec<f64> = month_starts(2023, 72)
            .into_iter()
            .map(|date| config.competitive.rate(segment, date))
            .collect();
        for pair in rates.windows(2) {
            assert!(pair[1] >= pair[0], "{segment}: rate fell from {} to {}", pair[0], pair[1]);
        }
        let ceiling = config.competitive.curves.get(segment).ceiling;
        assert_eq!(*rates.last().unwrap(), ceiling, "{segment} should plateau at {ceiling}");
    }
}

#[test]
fn targeting_rate_never_rises() {
    let config = EngineConfig::standard();
    for segment in Segment::ALL {
        let rates: Vec<f64> = month_starts(2023, 72)
            .into_iter()
            .map(|date| config.targeting.rate(segment, date))
            .collect();
        for pair in rates.windows(2) {
            assert!(pair[1] <= pair[0], "{segment}: targeting rose from {} to {}", pair[0], pair[1]);
        }
    }
}

#[test]
fn day_of_month_is_ignored() {
    let config = EngineConfig::standard();
    let early = config.competitive.rate(Segment::MidMarket, d(2024, 5, 1));
    let late = config.competitive.rate(Segment::MidMarket, d(2024, 5, 31));
    assert_eq!(early, late);
}

#[test]
fn dates_before_epoch_use_base_rate() {
    let curve = TrendCurve { base: 0.2, slope: 0.05, floor: 0.0, ceiling: 1.0 };
    assert_eq!(curve.rate_at(0), 0.2);

    let config = EngineConfig::standard();
    let before = config.competitive.rate(Segment::Smb, d(2021, 6, 1));
    assert!((before - 0.10).abs() < 1e-12, "got {before}");
}

#[test]
fn events_switch_on_at_their_start_date() {
    let config = EngineConfig::standard();
    let nego = Stage::Negotiation.index();

    let before = stage_modifiers(&config.events, &[d(2024, 6, 30); 5]);
    let after = stage_modifiers(&config.events, &[d(2024, 7, 1); 5]);

    assert!(before[nego].is_neutral());
    assert!((after[nego].advance - 0.80).abs() < 1e-12);
    assert!((after[nego].dwell - 1.3).abs() < 1e-12);
    // The launch event (June 1) is already active on both dates.
    assert!((before[Stage::Discovery.index()].dwell - 1.25).abs() < 1e-12);
}

#[test]
fn seasonality_follows_calendar_quarter() {
    let config = EngineConfig::standard();
    assert_eq!(config.seasonality.factor(d(2024, 2, 10)).volume, 1.3);
    assert_eq!(config.seasonality.factor(d(2024, 8, 10)).quality, 1.05);
    assert_eq!(config.seasonality.factor(d(2024, 12, 31)).quality, 1.1);
}
