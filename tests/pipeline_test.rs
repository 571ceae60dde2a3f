//! Integration tests for the log-to-fingerprint pipeline

use chrono::{DateTime, Duration, TimeZone, Utc};
use habit_dna::{
    core::{compare, mutation, sequence},
    entry::{parse_log, HabitCategory, HabitEntry},
    ComponentVector, Config, DnaEngine,
};

fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap()
}

fn engine() -> DnaEngine {
    DnaEngine::new(&Config::default()).expect("default config is valid")
}

#[test]
fn test_two_workouts_produce_known_fingerprint() {
    let log = r#"[
        {"category": "exercise", "value": 10, "unit": "min", "timestamp": "2024-03-13T09:30:00Z"},
        {"category": "exercise", "value": "20", "unit": "min", "timestamp": "2024-03-14T09:30:00Z"}
    ]"#;

    let engine = engine();
    let entries = engine.prepare(parse_log(log).unwrap());
    let regen = engine.regenerate_at("u1", &entries, None, None, at());
    let fp = &regen.fingerprint;

    assert_eq!(fp.component_vector.values(), [100.0, 14.0, 75.0, 100.0, 50.0]);
    assert_eq!(fp.sequence, "F2BF86A07F5C7");
    assert_eq!(fp.colors.primary, "#FFFFFF");
    assert_eq!(fp.colors.secondary, "#FFFFFF");
    assert_eq!(fp.colors.accent, "#CDD2FE");

    let colors: Vec<&str> = fp.visual_pattern.iter().map(|s| s.color.as_str()).collect();
    assert_eq!(colors.len(), 20);
    assert_eq!(&colors[0..4], ["#D92626"; 4]);
    assert_eq!(&colors[4..8], ["#D9BC26"; 4]);
    assert_eq!(&colors[8..12], ["#8026D9"; 4]);
    assert_eq!(&colors[12..16], ["#D92626"; 4]);
    assert_eq!(&colors[16..20], ["#26D9D9"; 4]);
    assert!(fp.is_consistent());
}

#[test]
fn test_old_log_fingerprints_without_window() {
    let log = "\
{\"category\": \"exercise\", \"value\": 10, \"timestamp\": \"2024-03-13T09:30:00Z\"}
{\"category\": \"exercise\", \"value\": 20, \"timestamp\": \"2024-03-14T09:30:00Z\"}
";
    let engine = engine();
    let entries = engine.prepare(parse_log(log).unwrap());

    let fp = engine.fingerprint_log(&entries, None);
    assert_eq!(fp.component_vector.values(), [100.0, 14.0, 75.0, 100.0, 50.0]);
    assert_eq!(fp.sequence, "F2BF86A07F5C7");

    // The windowed path only sees the trailing lookback ending now.
    let regen = engine.regenerate("u1", &entries, None, None);
    assert_eq!(regen.entries_analyzed, 0);
    assert_eq!(regen.fingerprint.component_vector, ComponentVector::ZERO);
}

#[test]
fn test_empty_log_yields_zero_fingerprint() {
    let engine = engine();
    let entries = engine.prepare(parse_log("[]").unwrap());
    let regen = engine.regenerate_at("u1", &entries, None, None, at());

    assert_eq!(regen.fingerprint.component_vector, ComponentVector::ZERO);
    assert_eq!(regen.fingerprint.sequence, "000002A51222B");
    assert_eq!(regen.fingerprint.colors.primary, "#808080");
    assert_eq!(regen.fingerprint.colors.secondary, "#999999");
    assert_eq!(regen.fingerprint.colors.accent, "#527A52");
}

#[test]
fn test_malformed_entries_are_skipped() {
    let log = "\
{\"category\": \"sleep\", \"value\": 8, \"timestamp\": \"2024-03-10T07:00:00Z\"}
{\"category\": \"sleep\"}
{\"category\": \"dreaming\", \"value\": 1, \"timestamp\": \"2024-03-11T07:00:00Z\"}
{\"value\": 3, \"timestamp\": \"2024-03-11T07:00:00Z\"}
{\"category\": \"sleep\", \"value\": 7, \"timestamp\": \"yesterday\"}
[1, 2, 3]
";
    let engine = engine();
    let entries = engine.prepare(parse_log(log).unwrap());

    assert_eq!(entries.len(), 1);
    assert_eq!(engine.audit().stats().entries_skipped, 5);

    let regen = engine.regenerate_at("u1", &entries, None, None, at());
    let v = regen.fingerprint.component_vector;
    assert_eq!(v.diversity(), 14.0);
    assert_eq!(v.intensity(), 100.0);
}

#[test]
fn test_only_malformed_entries_yield_zero() {
    let engine = engine();
    let entries = engine.prepare(parse_log("{\"category\": \"nope\"}\n{}\n").unwrap());
    assert!(entries.is_empty());

    let regen = engine.regenerate_at("u1", &entries, None, None, at());
    assert_eq!(regen.fingerprint.component_vector, ComponentVector::ZERO);
}

#[test]
fn test_fractional_change_alters_only_suffix() {
    let a = ComponentVector::new(50.0, 50.0, 50.0, 50.0, 50.0);
    let b = ComponentVector::new(50.0, 50.0, 50.0, 50.0, 50.0);
    assert_eq!(sequence::encode(&a), sequence::encode(&b));
    assert_eq!(sequence::encode(&a), "8888864DCD39C");

    let nudged = ComponentVector::new(40.2, 40.0, 40.0, 40.0, 40.0);
    let flat = ComponentVector::new(40.0, 40.0, 40.0, 40.0, 40.0);
    assert_eq!(&sequence::encode(&nudged)[..5], &sequence::encode(&flat)[..5]);
    assert_ne!(sequence::encode(&nudged), sequence::encode(&flat));
}

#[test]
fn test_compatibility_is_symmetric_and_reflexive() {
    let vectors = [
        ComponentVector::ZERO,
        ComponentVector::new(100.0, 14.0, 75.0, 100.0, 50.0),
        ComponentVector::new(12.0, 88.0, 40.0, 63.0, 0.0),
        ComponentVector::new(100.0, 100.0, 100.0, 100.0, 100.0),
    ];

    for a in &vectors {
        assert_eq!(compare(a, a).score, 100);
        assert_eq!(compare(a, a).factors.len(), 5);
        for b in &vectors {
            assert_eq!(compare(a, b), compare(b, a));
            assert!(compare(a, b).score <= 100);
        }
    }

    let opposite = compare(&vectors[0], &vectors[3]);
    assert_eq!(opposite.score, 0);
    assert!(opposite.factors.is_empty());
}

#[test]
fn test_mutation_threshold_is_exclusive() {
    let base = ComponentVector::new(50.0, 50.0, 50.0, 50.0, 50.0);
    let at_threshold = ComponentVector::new(100.0, 50.0, 50.0, 50.0, 50.0);
    let past_threshold = ComponentVector::new(100.0, 50.0, 50.0, 50.0, 51.0);

    assert!(mutation::detect(None, &base).is_none());
    assert!(mutation::detect(Some(&base), &at_threshold).is_none());

    let event = mutation::detect(Some(&base), &past_threshold).expect("drift 51 mutates");
    assert_eq!(event.previous_sequence, "8888864DCD39C");
    assert_eq!(event.drift, 51.0);
    assert!(event.description.starts_with("Major behavioral change"));
}

#[test]
fn test_streaks_drive_growth_for_short_logs() {
    let engine = engine();
    let entries: Vec<HabitEntry> = (1..=5)
        .map(|d| {
            HabitEntry::new(HabitCategory::Mindfulness, 15.0, "min", at() - Duration::days(d))
        })
        .collect();

    let with_streaks = engine.regenerate_at(
        "u1",
        &entries,
        Some(&habit_dna::StreakSummary::new(3, 4)),
        None,
        at(),
    );
    assert_eq!(with_streaks.fingerprint.component_vector.growth(), 75.0);

    let derived = engine.derive_streaks(&entries, at());
    assert_eq!(derived.active_streaks, 1);
    assert_eq!(derived.total_streaks, 1);

    let regen = engine.regenerate_at("u1", &entries, Some(&derived), None, at());
    assert_eq!(regen.fingerprint.component_vector.growth(), 100.0);
}
