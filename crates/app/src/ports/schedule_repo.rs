//! Schedule repository port — persistence for schedules.

use std::future::Future;

use porchlight_domain::error::PorchlightError;
use porchlight_domain::schedule::{NewSchedule, Schedule, ScheduleId};
use porchlight_domain::time::Timestamp;

/// Repository for persisting and querying [`Schedule`]s.
///
/// Every method is one short statement; implementations must not hold a
/// lock or transaction across calls.
pub trait ScheduleRepository {
    /// Insert a new, enabled schedule and return it with its generated id.
    fn create(
        &self,
        schedule: NewSchedule,
        created_at: Timestamp,
    ) -> impl Future<Output = Result<Schedule, PorchlightError>> + Send;

    /// Get a schedule by id.
    fn get_by_id(
        &self,
        id: ScheduleId,
    ) -> impl Future<Output = Result<Option<Schedule>, PorchlightError>> + Send;

    /// Get all schedules, ordered by time of day then id.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Schedule>, PorchlightError>> + Send;

    /// Get only enabled schedules, ordered by time of day then id.
    fn get_enabled(&self) -> impl Future<Output = Result<Vec<Schedule>, PorchlightError>> + Send;

    /// Set the enabled flag. Returns the updated row, or `None` if no row has `id`.
    fn set_enabled(
        &self,
        id: ScheduleId,
        enabled: bool,
    ) -> impl Future<Output = Result<Option<Schedule>, PorchlightError>> + Send;

    /// Delete a schedule. Returns whether a row was removed.
    fn delete(&self, id: ScheduleId) -> impl Future<Output = Result<bool, PorchlightError>> + Send;
}
