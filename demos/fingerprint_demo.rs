//! Demonstration of the Habit DNA pipeline.
//!
//! This example shows how to:
//! 1. Validate a raw activity log
//! 2. Regenerate a fingerprint and store it
//! 3. Detect a mutation after a behavioral shift
//! 4. Compare two users
//!
//! Run with: cargo run --example fingerprint_demo

use chrono::{Duration, Utc};
use habit_dna::{
    config::Config,
    entry::{HabitCategory, HabitEntry, RawHabitEntry},
    store::MemoryStore,
    DnaEngine,
};

fn main() -> anyhow::Result<()> {
    println!("Habit DNA - Fingerprint Demo");
    println!("============================");
    println!();

    let engine = DnaEngine::new(&Config::default())?;
    let store = MemoryStore::new();
    let now = Utc::now();

    // A raw log with one malformed entry
    let raws = vec![
        raw("exercise", 10.0, now - Duration::days(2)),
        raw("exercise", 20.0, now - Duration::days(1)),
        RawHabitEntry {
            category: Some("astrology".into()),
            ..Default::default()
        },
    ];
    let steady = engine.prepare(raws);
    println!("Valid entries: {}", steady.len());

    let first = engine.regenerate_and_store(&store, "alex", &steady, None)?;
    println!();
    println!("alex, revision {}", first.record.revision);
    println!("  vector:   {}", first.record.fingerprint.component_vector);
    println!("  sequence: {}", first.record.fingerprint.sequence);
    println!(
        "  colors:   {} {} {}",
        first.record.fingerprint.colors.primary,
        first.record.fingerprint.colors.secondary,
        first.record.fingerprint.colors.accent
    );

    // Irregular, varied activity
    let mut shifted = steady.clone();
    for (i, category) in HabitCategory::ALL.iter().enumerate() {
        let hours = (i as i64 + 1) * (i as i64 + 1) * 7;
        shifted.push(HabitEntry::new(
            *category,
            (i + 1) as f64 * 3.0,
            "min",
            now - Duration::hours(hours),
        ));
    }

    let second = engine.regenerate_and_store(&store, "alex", &shifted, None)?;
    println!();
    println!("alex, revision {}", second.record.revision);
    println!("  vector:   {}", second.record.fingerprint.component_vector);
    match &second.mutation {
        Some(event) => println!("  mutation: {}", event.description),
        None => println!("  mutation: none"),
    }

    engine.regenerate_and_store(&store, "sam", &steady, None)?;
    let result = engine.compare_users(&store, "alex", "sam")?;
    println!();
    println!("alex vs sam: {} {:?}", result.score, result.factors);

    println!();
    println!("{}", engine.audit().summary());
    Ok(())
}

fn raw(category: &str, value: f64, at: chrono::DateTime<Utc>) -> RawHabitEntry {
    RawHabitEntry {
        category: Some(category.to_string()),
        value: Some(serde_json::json!(value)),
        unit: Some("min".to_string()),
        timestamp: Some(at.to_rfc3339()),
    }
}
