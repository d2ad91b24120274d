//! Schedule runner — fires enabled schedules at their minute.
//!
//! Ticks once per second. A schedule fires when its time of day equals the
//! current local minute and it has not already fired during that same
//! calendar minute, so a schedule fires at most once per day.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use porchlight_domain::intent::Intent;
use porchlight_domain::schedule::{Schedule, ScheduleId};
use porchlight_domain::time::MinuteStamp;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::ports::{Clock, DeviceRegistry, DeviceTransport};
use crate::services::dispatcher::CommandDispatcher;

const TICK: Duration = Duration::from_secs(1);

/// Background task that turns schedule triggers into fan-out dispatches.
pub struct ScheduleRunner<G, T, C> {
    dispatcher: Arc<CommandDispatcher<G, T>>,
    triggers: watch::Receiver<Vec<Schedule>>,
    clock: C,
    last_fired: HashMap<ScheduleId, MinuteStamp>,
}

impl<G, T, C> ScheduleRunner<G, T, C>
where
    G: DeviceRegistry + Sync,
    T: DeviceTransport + Sync,
    C: Clock,
{
    pub fn new(
        dispatcher: Arc<CommandDispatcher<G, T>>,
        triggers: watch::Receiver<Vec<Schedule>>,
        clock: C,
    ) -> Self {
        Self {
            dispatcher,
            triggers,
            clock,
            last_fired: HashMap::new(),
        }
    }

    /// Schedules due at `now` that have not fired during its minute yet.
    ///
    /// Marks each returned schedule as fired. Records from earlier minutes
    /// are dropped; records for the current minute survive even when the
    /// schedule briefly leaves the trigger set.
    fn due(&mut self, now: NaiveDateTime) -> Vec<(ScheduleId, Intent)> {
        let stamp = MinuteStamp::of(now);
        let minute = stamp.time_of_day();
        let triggers = self.triggers.borrow();

        self.last_fired.retain(|_, fired| *fired == stamp);

        let mut due = Vec::new();
        for schedule in triggers.iter().filter(|s| s.is_due(minute)) {
            if self.last_fired.get(&schedule.id) == Some(&stamp) {
                continue;
            }
            self.last_fired.insert(schedule.id, stamp);
            due.push((schedule.id, schedule.action));
        }
        due
    }

    /// Evaluate triggers once and dispatch whatever is due.
    pub async fn tick(&mut self) {
        let now = self.clock.now_local();
        for (id, action) in self.due(now) {
            tracing::info!(schedule = %id, %action, "schedule fired");
            match self.dispatcher.dispatch_all(action).await {
                Ok(report) => {
                    if let Some(summary) = report.failure_summary() {
                        tracing::warn!(schedule = %id, %summary, "scheduled dispatch incomplete");
                    }
                }
                Err(err) => {
                    tracing::error!(schedule = %id, error = %err, "scheduled dispatch failed");
                }
            }
        }
    }

    /// Tick until `shutdown` turns `true` or its sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(TICK);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!("schedule runner started");

        loop {
            tokio::select! {
                _ = interval.tick() => self.tick().await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("schedule runner stopped");
    }
}
