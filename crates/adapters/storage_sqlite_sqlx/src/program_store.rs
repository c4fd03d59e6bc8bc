//! `SQLite` implementation of [`ProgramStore`].

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Row, Sqlite, SqlitePool};

use irrigo_app::ports::ProgramStore;
use irrigo_domain::error::{IrrigoError, NotFoundError};
use irrigo_domain::id::ProgramId;
use irrigo_domain::program::{NewProgram, Program, ProgramPatch};
use irrigo_domain::schedule::{TimeOfDay, WeekdaySet};
use irrigo_domain::zone::ZoneId;

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`Program`].
struct Wrapper(Program);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Program> {
        value.map(|w| w.0)
    }
}

fn decode<T, E>(raw: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = E>,
    E: std::error::Error + Send + Sync + 'static,
{
    T::from_str(raw).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let zone: String = row.try_get("zone")?;
        let active_day: String = row.try_get("active_day")?;
        let start_time: String = row.try_get("start_time")?;
        let duration: i64 = row.try_get("duration")?;
        let is_active: bool = row.try_get("is_active")?;
        let is_running: bool = row.try_get("is_running")?;

        let duration_secs =
            u32::try_from(duration).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Program {
            id: ProgramId::from_row(id),
            definition: NewProgram {
                name,
                zone: decode::<ZoneId, _>(&zone)?,
                active_days: decode::<WeekdaySet, _>(&active_day)?,
                start_time: decode::<TimeOfDay, _>(&start_time)?,
                duration_secs,
                is_active,
                is_running,
            },
        }))
    }
}

const INSERT: &str = "INSERT INTO programs (name, zone, active_day, start_time, duration, is_active, is_running) VALUES (?, ?, ?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM programs WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM programs ORDER BY id";
const DELETE_BY_ID: &str = "DELETE FROM programs WHERE id = ?";

fn not_found(id: ProgramId) -> IrrigoError {
    NotFoundError {
        entity: "Program",
        id: id.to_string(),
    }
    .into()
}

async fn fetch(pool: &SqlitePool, id: ProgramId) -> Result<Option<Program>, StorageError> {
    let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
        .bind(id.as_row())
        .fetch_optional(pool)
        .await?;
    Ok(Wrapper::maybe(row))
}

/// `UPDATE` statement touching only the columns present in `patch`, or
/// `None` when the patch is empty.
fn update_query(id: ProgramId, patch: ProgramPatch) -> Option<QueryBuilder<'static, Sqlite>> {
    if patch.is_empty() {
        return None;
    }
    let mut builder = QueryBuilder::new("UPDATE programs SET ");
    let mut columns = builder.separated(", ");
    if let Some(name) = patch.name {
        columns.push("name = ").push_bind_unseparated(name);
    }
    if let Some(zone) = patch.zone {
        columns.push("zone = ").push_bind_unseparated(zone.to_string());
    }
    if let Some(days) = patch.active_days {
        columns
            .push("active_day = ")
            .push_bind_unseparated(days.to_string());
    }
    if let Some(start) = patch.start_time {
        columns
            .push("start_time = ")
            .push_bind_unseparated(start.to_string());
    }
    if let Some(duration) = patch.duration_secs {
        columns
            .push("duration = ")
            .push_bind_unseparated(i64::from(duration));
    }
    if let Some(active) = patch.is_active {
        columns.push("is_active = ").push_bind_unseparated(active);
    }
    if let Some(running) = patch.is_running {
        columns.push("is_running = ").push_bind_unseparated(running);
    }
    builder.push(" WHERE id = ").push_bind(id.as_row());
    Some(builder)
}

/// `SQLite`-backed program store.
#[derive(Clone)]
pub struct SqliteProgramStore {
    pool: SqlitePool,
}

impl SqliteProgramStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ProgramStore for SqliteProgramStore {
    fn list_all(&self) -> impl Future<Output = Result<Vec<Program>, IrrigoError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<SqliteRow> = sqlx::query(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            let programs = rows
                .iter()
                .filter_map(|row| match Wrapper::from_row(row) {
                    Ok(wrapper) => Some(wrapper.0),
                    Err(err) => {
                        let id = row.try_get::<i64, _>("id").ok();
                        tracing::warn!(?id, error = %err, "skipping unreadable program row");
                        None
                    }
                })
                .collect();
            Ok(programs)
        }
    }

    fn get(
        &self,
        id: ProgramId,
    ) -> impl Future<Output = Result<Option<Program>, IrrigoError>> + Send {
        let pool = self.pool.clone();
        async move { Ok(fetch(&pool, id).await?) }
    }

    fn insert(
        &self,
        program: NewProgram,
    ) -> impl Future<Output = Result<Program, IrrigoError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(INSERT)
                .bind(&program.name)
                .bind(program.zone.to_string())
                .bind(program.active_days.to_string())
                .bind(program.start_time.to_string())
                .bind(i64::from(program.duration_secs))
                .bind(program.is_active)
                .bind(program.is_running)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(program.with_id(ProgramId::from_row(result.last_insert_rowid())))
        }
    }

    fn update(
        &self,
        id: ProgramId,
        patch: ProgramPatch,
    ) -> impl Future<Output = Result<Program, IrrigoError>> + Send {
        let pool = self.pool.clone();
        async move {
            if let Some(mut query) = update_query(id, patch) {
                let result = query
                    .build()
                    .execute(&pool)
                    .await
                    .map_err(StorageError::from)?;
                if result.rows_affected() == 0 {
                    return Err(not_found(id));
                }
            }

            fetch(&pool, id).await?.ok_or_else(|| not_found(id))
        }
    }

    fn delete(&self, id: ProgramId) -> impl Future<Output = Result<(), IrrigoError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(DELETE_BY_ID)
                .bind(id.as_row())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            if result.rows_affected() == 0 {
                return Err(not_found(id));
            }
            Ok(())
        }
    }
}
