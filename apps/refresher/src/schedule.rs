//! Daily scheduler: fires the sequencer at fixed wall-clock times in a
//! fixed UTC offset. Scheduled failures are logged and never escape.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveTime, TimeZone, Utc};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::refresh::{SequenceError, Sequencer};

#[derive(Debug, Clone)]
pub struct DailySchedule {
    times: Vec<NaiveTime>,
    offset: FixedOffset,
}

/// One upcoming firing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledRun {
    pub at: DateTime<Utc>,
    /// Local wall-clock label, e.g. `"08:30"`.
    pub label: String,
}

impl DailySchedule {
    pub fn new(mut times: Vec<NaiveTime>, offset: FixedOffset) -> Self {
        times.sort();
        times.dedup();
        Self { times, offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Labels of every firing, in order (for the startup banner).
    pub fn labels(&self) -> Vec<String> {
        self.times.iter().map(|t| t.format("%H:%M").to_string()).collect()
    }

    /// First firing strictly after `now`. `None` only for an empty schedule.
    pub fn next_after(&self, now: DateTime<Utc>) -> Option<ScheduledRun> {
        let today = now.with_timezone(&self.offset).date_naive();

        for day in [Some(today), today.succ_opt()].into_iter().flatten() {
            for time in &self.times {
                let at = self
                    .offset
                    .from_local_datetime(&day.and_time(*time))
                    .single()?
                    .with_timezone(&Utc);
                if at > now {
                    return Some(ScheduledRun {
                        at,
                        label: time.format("%H:%M").to_string(),
                    });
                }
            }
        }
        None
    }
}

/// Spawns the scheduler loop on the current runtime.
pub fn spawn(sequencer: Arc<Sequencer>, schedule: DailySchedule) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Scheduled runs at {} (UTC{})",
            schedule.labels().join(", "),
            schedule.offset()
        );

        let mut cursor = Utc::now();
        loop {
            let Some(next) = schedule.next_after(cursor) else {
                warn!("Schedule is empty, scheduler stopped");
                return;
            };

            let wait = (next.at - Utc::now()).to_std().unwrap_or_default();
            info!("Next scheduled run at {} ({})", next.label, next.at);
            tokio::time::sleep(wait).await;

            run_scheduled(&sequencer, &next.label, schedule.offset()).await;

            // Never re-fire the same slot even if the timer woke before the wall clock.
            cursor = Utc::now().max(next.at);
        }
    })
}

/// Runs one scheduled sequence. Returns whether it succeeded; errors are only logged.
pub async fn run_scheduled(sequencer: &Sequencer, label: &str, offset: FixedOffset) -> bool {
    let local_now = Utc::now().with_timezone(&offset);
    info!(
        "Job triggered at {label} | {}",
        local_now.format("%Y-%m-%d %H:%M:%S %:z")
    );

    match sequencer.run(label).await {
        Ok(report) => {
            info!("Completed successfully at {label}: {}", report.summary());
            true
        }
        Err(SequenceError::Busy) => {
            warn!("Skipped at {label}: previous run still in progress");
            false
        }
        Err(e) => {
            error!("Failed at {label}: {e}");
            false
        }
    }
}
