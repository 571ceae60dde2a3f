//! Parallel regeneration for many users.
//!
//! Jobs are fanned out to a fixed pool of scoped worker threads over a
//! bounded channel and results are collected on an unbounded one. Every
//! regeneration is independent, so workers share nothing but the engine.

use crate::engine::{DnaEngine, Regeneration};
use crate::entry::{HabitEntry, StreakSummary};
use crate::store::FingerprintRecord;
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, unbounded};

/// One user's regeneration request.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub user_id: String,
    pub entries: Vec<HabitEntry>,
    pub streaks: Option<StreakSummary>,
    pub previous: Option<FingerprintRecord>,
}

/// One user's regeneration result.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub user_id: String,
    pub regeneration: Regeneration,
}

/// Regenerate every job as of `at` using up to `workers` threads.
///
/// Results are returned sorted by user id.
pub fn run_batch(
    engine: &DnaEngine,
    jobs: Vec<BatchJob>,
    workers: usize,
    at: DateTime<Utc>,
) -> Vec<BatchOutcome> {
    if jobs.is_empty() {
        return Vec::new();
    }

    let workers = workers.clamp(1, jobs.len());
    let (job_tx, job_rx) = bounded::<BatchJob>(workers * 2);
    let (result_tx, result_rx) = unbounded::<BatchOutcome>();

    tracing::info!(jobs = jobs.len(), workers, "starting batch regeneration");

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();

            scope.spawn(move || {
                for job in job_rx.iter() {
                    let regeneration = engine.regenerate_at(
                        &job.user_id,
                        &job.entries,
                        job.streaks.as_ref(),
                        job.previous.as_ref(),
                        at,
                    );
                    let outcome = BatchOutcome {
                        user_id: job.user_id,
                        regeneration,
                    };
                    if result_tx.send(outcome).is_err() {
                        break;
                    }
                }
            });
        }

        drop(result_tx);
        for job in jobs {
            if job_tx.send(job).is_err() {
                tracing::warn!("batch workers exited early");
                break;
            }
        }
        drop(job_tx);
    });

    let mut outcomes: Vec<BatchOutcome> = result_rx.iter().collect();
    outcomes.sort_by(|a, b| a.user_id.cmp(&b.user_id));
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::entry::HabitCategory;
    use chrono::{Duration, TimeZone};

    fn job(user_id: &str, category: HabitCategory, count: i64, at: DateTime<Utc>) -> BatchJob {
        BatchJob {
            user_id: user_id.to_string(),
            entries: (0..count)
                .map(|i| {
                    HabitEntry::new(category, 10.0 + i as f64, "x", at - Duration::hours(i * 12))
                })
                .collect(),
            streaks: None,
            previous: None,
        }
    }

    #[test]
    fn test_batch_matches_sequential() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let engine = DnaEngine::new(&Config::default()).unwrap();

        let jobs: Vec<BatchJob> = (0..12)
            .map(|i| {
                let category = HabitCategory::ALL[i % HabitCategory::COUNT];
                job(&format!("user-{i:02}"), category, (i + 2) as i64, at)
            })
            .collect();

        let expected: Vec<Regeneration> = jobs
            .iter()
            .map(|j| engine.regenerate_at(&j.user_id, &j.entries, None, None, at))
            .collect();

        let outcomes = run_batch(&engine, jobs, 4, at);
        assert_eq!(outcomes.len(), 12);
        for (outcome, expected) in outcomes.iter().zip(expected.iter()) {
            assert_eq!(outcome.user_id, expected.user_id);
            assert_eq!(outcome.regeneration.fingerprint, expected.fingerprint);
        }
    }

    #[test]
    fn test_empty_batch() {
        let engine = DnaEngine::new(&Config::default()).unwrap();
        assert!(run_batch(&engine, Vec::new(), 8, Utc::now()).is_empty());
    }

    #[test]
    fn test_zero_workers_still_runs() {
        let at = Utc::now();
        let engine = DnaEngine::new(&Config::default()).unwrap();
        let outcomes = run_batch(&engine, vec![job("solo", HabitCategory::Sleep, 3, at)], 0, at);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].regeneration.entries_analyzed, 3);
    }
}
