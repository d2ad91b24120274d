//! Schedule service — use-cases for managing schedules.
//!
//! Every successful mutation rebuilds the trigger set published to the
//! [`ScheduleRunner`](crate::schedule_runner::ScheduleRunner), so the runner
//! sees exactly the enabled schedules from the store. A mutation that was
//! persisted still succeeds when that rebuild fails; the failure is logged and
//! the runner keeps its previous set until the next successful rebuild.

use porchlight_domain::error::{NotFoundError, PorchlightError};
use porchlight_domain::schedule::{NewSchedule, Schedule, ScheduleId};
use porchlight_domain::time;
use tokio::sync::watch;

use crate::ports::ScheduleRepository;

/// Application service for schedule CRUD operations.
pub struct ScheduleService<R> {
    repo: R,
    triggers: watch::Sender<Vec<Schedule>>,
}

impl<R: ScheduleRepository + Sync> ScheduleService<R> {
    /// Create a new service backed by the given repository.
    ///
    /// The trigger set starts empty; call [`Self::rebuild_triggers`] once the
    /// store is ready.
    pub fn new(repo: R) -> Self {
        let (triggers, _) = watch::channel(Vec::new());
        Self { repo, triggers }
    }

    /// Subscribe to the set of enabled schedules.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Schedule>> {
        self.triggers.subscribe()
    }

    /// Reload enabled schedules from the store and publish them.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn rebuild_triggers(&self) -> Result<usize, PorchlightError> {
        let enabled = self.repo.get_enabled().await?;
        let count = enabled.len();
        self.triggers.send_replace(enabled);
        tracing::info!(count, "schedule triggers rebuilt");
        Ok(count)
    }

    async fn refresh_triggers(&self) {
        if let Err(err) = self.rebuild_triggers().await {
            tracing::error!(error = %err, "schedule triggers are stale");
        }
    }

    /// Validate and persist a new, enabled schedule.
    ///
    /// # Errors
    ///
    /// Returns [`PorchlightError::Validation`] if `time` or `action` is
    /// malformed (the store is left untouched), or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn create_schedule(
        &self,
        time: &str,
        action: &str,
        days: Option<&str>,
    ) -> Result<Schedule, PorchlightError> {
        let new = NewSchedule::parse(time, action, days)?;
        let schedule = self.repo.create(new, time::now()).await?;
        tracing::info!(id = %schedule.id, time = %schedule.time_of_day, action = %schedule.action, "schedule created");
        self.refresh_triggers().await;
        Ok(schedule)
    }

    /// List all schedules, ordered by time of day.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_schedules(&self) -> Result<Vec<Schedule>, PorchlightError> {
        self.repo.get_all().await
    }

    /// Look up a schedule by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`PorchlightError::NotFound`] when no schedule with `id`
    /// exists, or a storage error from the repository.
    pub async fn get_schedule(&self, id: ScheduleId) -> Result<Schedule, PorchlightError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Flip the enabled flag of a schedule.
    ///
    /// # Errors
    ///
    /// Returns [`PorchlightError::NotFound`] when no schedule with `id`
    /// exists, or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_schedule(&self, id: ScheduleId) -> Result<Schedule, PorchlightError> {
        let current = self.get_schedule(id).await?;
        let updated = self
            .repo
            .set_enabled(id, !current.enabled)
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::info!(enabled = updated.enabled, "schedule toggled");
        self.refresh_triggers().await;
        Ok(updated)
    }

    /// Delete a schedule by id.
    ///
    /// # Errors
    ///
    /// Returns [`PorchlightError::NotFound`] when no schedule with `id`
    /// exists, or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_schedule(&self, id: ScheduleId) -> Result<(), PorchlightError> {
        if !self.repo.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::info!("schedule deleted");
        self.refresh_triggers().await;
        Ok(())
    }
}

fn not_found(id: ScheduleId) -> PorchlightError {
    NotFoundError {
        entity: "Schedule",
        id: id.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use porchlight_domain::error::ValidationError;
    use porchlight_domain::intent::Intent;
    use porchlight_domain::time::Timestamp;
    use std::collections::BTreeMap;
    use std::future::Future;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct InMemoryScheduleRepo {
        rows: Mutex<BTreeMap<i64, Schedule>>,
        broken_reads: AtomicBool,
    }

    impl InMemoryScheduleRepo {
        fn sorted(&self, only_enabled: bool) -> Vec<Schedule> {
            let mut all: Vec<Schedule> = self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|s| !only_enabled || s.enabled)
                .cloned()
                .collect();
            all.sort_by_key(|s| (s.time_of_day, s.id));
            all
        }
    }

    impl ScheduleRepository for InMemoryScheduleRepo {
        fn create(
            &self,
            schedule: NewSchedule,
            created_at: Timestamp,
        ) -> impl Future<Output = Result<Schedule, PorchlightError>> + Send {
            let mut rows = self.rows.lock().unwrap();
            let id = rows.keys().next_back().map_or(1, |last| last + 1);
            let stored = Schedule {
                id: ScheduleId::new(id),
                time_of_day: schedule.time_of_day,
                action: schedule.action,
                enabled: true,
                days: schedule.days,
                created_at,
            };
            rows.insert(id, stored.clone());
            async { Ok(stored) }
        }

        fn get_by_id(
            &self,
            id: ScheduleId,
        ) -> impl Future<Output = Result<Option<Schedule>, PorchlightError>> + Send {
            let found = self.rows.lock().unwrap().get(&id.as_i64()).cloned();
            async { Ok(found) }
        }

        fn get_all(&self) -> impl Future<Output = Result<Vec<Schedule>, PorchlightError>> + Send {
            let all = self.sorted(false);
            async { Ok(all) }
        }

        fn get_enabled(
            &self,
        ) -> impl Future<Output = Result<Vec<Schedule>, PorchlightError>> + Send {
            let enabled = if self.broken_reads.load(Ordering::SeqCst) {
                Err(PorchlightError::Storage("database is locked".into()))
            } else {
                Ok(self.sorted(true))
            };
            async { enabled }
        }

        fn set_enabled(
            &self,
            id: ScheduleId,
            enabled: bool,
        ) -> impl Future<Output = Result<Option<Schedule>, PorchlightError>> + Send {
            let updated = self
                .rows
                .lock()
                .unwrap()
                .get_mut(&id.as_i64())
                .map(|s| {
                    s.enabled = enabled;
                    s.clone()
                });
            async { Ok(updated) }
        }

        fn delete(&self, id: ScheduleId) -> impl Future<Output = Result<bool, PorchlightError>> + Send {
            let removed = self.rows.lock().unwrap().remove(&id.as_i64()).is_some();
            async move { Ok(removed) }
        }
    }

    fn make_service() -> ScheduleService<InMemoryScheduleRepo> {
        ScheduleService::new(InMemoryScheduleRepo::default())
    }

    #[tokio::test]
    async fn should_create_enabled_schedule_with_default_days() {
        let svc = make_service();

        let created = svc.create_schedule("07:30", "ON", None).await.unwrap();

        assert!(created.enabled);
        assert_eq!(created.action, Intent::On);
        assert_eq!(created.time_of_day.to_string(), "07:30");
        assert_eq!(created.days, "daily");
    }

    #[tokio::test]
    async fn should_reject_out_of_range_time_without_touching_store() {
        let svc = make_service();

        let result = svc.create_schedule("25:99", "ON", None).await;

        assert!(matches!(
            result,
            Err(PorchlightError::Validation(ValidationError::InvalidTimeOfDay(_)))
        ));
        assert!(svc.list_schedules().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_reject_unknown_action() {
        let svc = make_service();

        let result = svc.create_schedule("07:30", "DIM", None).await;

        assert!(matches!(
            result,
            Err(PorchlightError::Validation(ValidationError::InvalidAction(_)))
        ));
    }

    #[tokio::test]
    async fn should_list_schedules_ordered_by_time() {
        let svc = make_service();
        svc.create_schedule("22:00", "OFF", None).await.unwrap();
        svc.create_schedule("06:15", "ON", None).await.unwrap();

        let times: Vec<String> = svc
            .list_schedules()
            .await
            .unwrap()
            .iter()
            .map(|s| s.time_of_day.to_string())
            .collect();
        assert_eq!(times, ["06:15", "22:00"]);
    }

    #[tokio::test]
    async fn should_publish_enabled_schedules_after_create() {
        let svc = make_service();
        let rx = svc.subscribe();

        let created = svc.create_schedule("07:30", "ON", None).await.unwrap();

        assert_eq!(*rx.borrow(), vec![created]);
    }

    #[tokio::test]
    async fn should_toggle_twice_back_to_enabled() {
        let svc = make_service();
        let rx = svc.subscribe();
        let created = svc.create_schedule("07:30", "ON", None).await.unwrap();

        let off = svc.toggle_schedule(created.id).await.unwrap();
        assert!(!off.enabled);
        assert!(rx.borrow().is_empty());

        let on = svc.toggle_schedule(created.id).await.unwrap();
        assert!(on.enabled);
        assert_eq!(rx.borrow().len(), 1);
    }

    #[tokio::test]
    async fn should_return_not_found_when_toggling_missing_schedule() {
        let svc = make_service();

        let result = svc.toggle_schedule(ScheduleId::new(42)).await;
        assert!(matches!(result, Err(PorchlightError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_drop_trigger_when_schedule_deleted() {
        let svc = make_service();
        let rx = svc.subscribe();
        let created = svc.create_schedule("07:30", "ON", None).await.unwrap();

        svc.delete_schedule(created.id).await.unwrap();

        assert!(rx.borrow().is_empty());
        assert!(matches!(
            svc.get_schedule(created.id).await,
            Err(PorchlightError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_return_not_found_when_deleting_missing_schedule() {
        let svc = make_service();

        let result = svc.delete_schedule(ScheduleId::new(7)).await;
        assert!(matches!(result, Err(PorchlightError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_rebuild_triggers_from_existing_rows() {
        let repo = InMemoryScheduleRepo::default();
        let seeded = repo
            .create(NewSchedule::parse("08:00", "OFF", None).unwrap(), time::now())
            .await
            .unwrap();
        let svc = ScheduleService::new(repo);
        let rx = svc.subscribe();
        assert!(rx.borrow().is_empty());

        let count = svc.rebuild_triggers().await.unwrap();

        assert_eq!(count, 1);
        assert_eq!(*rx.borrow(), vec![seeded]);
    }

    #[tokio::test]
    async fn should_keep_persisted_mutations_when_trigger_rebuild_fails() {
        let svc = make_service();
        let rx = svc.subscribe();
        let first = svc.create_schedule("07:30", "ON", None).await.unwrap();
        svc.repo.broken_reads.store(true, Ordering::SeqCst);

        let second = svc.create_schedule("22:00", "OFF", None).await.unwrap();
        let toggled = svc.toggle_schedule(first.id).await.unwrap();
        svc.delete_schedule(second.id).await.unwrap();

        assert!(!toggled.enabled);
        assert_eq!(svc.list_schedules().await.unwrap(), vec![toggled]);
        assert_eq!(*rx.borrow(), vec![first]);
    }

    #[tokio::test]
    async fn should_report_rebuild_failure_to_direct_callers() {
        let svc = make_service();
        svc.repo.broken_reads.store(true, Ordering::SeqCst);

        let result = svc.rebuild_triggers().await;

        assert!(matches!(result, Err(PorchlightError::Storage(_))));
    }
}
