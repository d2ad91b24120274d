//! `SQLite` implementation of [`ScheduleRepository`].

use std::future::Future;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use porchlight_app::ports::ScheduleRepository;
use porchlight_domain::error::PorchlightError;
use porchlight_domain::schedule::{NewSchedule, Schedule, ScheduleId};
use porchlight_domain::time::Timestamp;

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`Schedule`].
struct Wrapper(Schedule);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Schedule> {
        value.map(|w| w.0)
    }

    fn all(values: Vec<Self>) -> Vec<Schedule> {
        values.into_iter().map(|w| w.0).collect()
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let time_of_day: String = row.try_get("time_of_day")?;
        let action: String = row.try_get("action")?;
        let enabled: bool = row.try_get("enabled")?;
        let days: String = row.try_get("days")?;
        let created_at: String = row.try_get("created_at")?;

        let time_of_day = time_of_day
            .parse()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let action = action
            .parse()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .with_timezone(&Utc);

        Ok(Self(Schedule {
            id: ScheduleId::new(id),
            time_of_day,
            action,
            enabled,
            days,
            created_at,
        }))
    }
}

const INSERT: &str = "INSERT INTO schedules (time_of_day, action, enabled, days, created_at) \
     VALUES (?, ?, 1, ?, ?) RETURNING *";
const SELECT_BY_ID: &str = "SELECT * FROM schedules WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM schedules ORDER BY time_of_day, id";
const SELECT_ENABLED: &str = "SELECT * FROM schedules WHERE enabled = 1 ORDER BY time_of_day, id";
const UPDATE_ENABLED: &str = "UPDATE schedules SET enabled = ? WHERE id = ? RETURNING *";
const DELETE_BY_ID: &str = "DELETE FROM schedules WHERE id = ?";

/// `SQLite`-backed schedule repository.
#[derive(Clone)]
pub struct SqliteScheduleRepository {
    pool: SqlitePool,
}

impl SqliteScheduleRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ScheduleRepository for SqliteScheduleRepository {
    fn create(
        &self,
        schedule: NewSchedule,
        created_at: Timestamp,
    ) -> impl Future<Output = Result<Schedule, PorchlightError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Wrapper = sqlx::query_as(INSERT)
                .bind(schedule.time_of_day.to_string())
                .bind(schedule.action.to_string())
                .bind(&schedule.days)
                .bind(created_at.to_rfc3339())
                .fetch_one(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.0)
        }
    }

    fn get_by_id(
        &self,
        id: ScheduleId,
    ) -> impl Future<Output = Result<Option<Schedule>, PorchlightError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.as_i64())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Schedule>, PorchlightError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::all(rows))
        }
    }

    fn get_enabled(&self) -> impl Future<Output = Result<Vec<Schedule>, PorchlightError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ENABLED)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::all(rows))
        }
    }

    fn set_enabled(
        &self,
        id: ScheduleId,
        enabled: bool,
    ) -> impl Future<Output = Result<Option<Schedule>, PorchlightError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(UPDATE_ENABLED)
                .bind(enabled)
                .bind(id.as_i64())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn delete(&self, id: ScheduleId) -> impl Future<Output = Result<bool, PorchlightError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(DELETE_BY_ID)
                .bind(id.as_i64())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(result.rows_affected() > 0)
        }
    }
}
