//! Meetup repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the store gateway primitives used by reconciliation: upsert,
//!   existence probe, read-back, and the community deletion sweep.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Event::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Upserts replace all mutable fields wholesale, never a partial merge.

use crate::db::{migrations, DbError};
use crate::model::event::{Event, EventKind, EventValidationError};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MEETUP_SELECT_SQL: &str = "SELECT
    meetup_id,
    community,
    title,
    registration,
    type,
    location,
    abstract,
    date
FROM meetups";

const MEETUP_COLUMNS: [&str; 8] = [
    "meetup_id",
    "community",
    "title",
    "registration",
    "type",
    "location",
    "abstract",
    "date",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for meetup persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Event failed structural validation before a write.
    Validation(EventValidationError),
    /// Connection-level database failure.
    Db(DbError),
    /// Row-level constraint violation (duplicate registration URL and the
    /// like). Recoverable by skipping the row.
    Conflict(String),
    /// Persisted state that no longer parses into the domain model.
    InvalidData(String),
    /// Connection schema version does not match this binary.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// A table required by this repository is missing.
    MissingRequiredTable(&'static str),
    /// A column required by this repository is missing.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Conflict(message) => write!(f, "constraint violation: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted meetup data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{column}` in table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EventValidationError> for RepoError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if value.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation) {
            return Self::Conflict(value.to_string());
        }
        Self::Db(DbError::Sqlite(value))
    }
}

/// Store gateway for canonical meetup rows.
pub trait MeetupRepository {
    /// Inserts the event or replaces all mutable fields of the existing row
    /// with the same id.
    fn upsert(&self, event: &Event) -> RepoResult<()>;
    /// Reads one event by stable id.
    fn get(&self, id: &str) -> RepoResult<Option<Event>>;
    /// Returns whether a row with the given id exists.
    fn exists(&self, id: &str) -> RepoResult<bool>;
    /// Deletes every row of `community` whose id is not in `keep_ids`.
    /// Returns the number of deleted rows.
    fn delete_community_except(&self, community: &str, keep_ids: &[String]) -> RepoResult<usize>;
}

/// SQLite-backed meetup repository.
pub struct SqliteMeetupRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMeetupRepository<'conn> {
    /// Constructs a repository from a migrated, ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `PRAGMA user_version` does not match
    ///   the latest migration.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   lacks the `meetups` shape this repository expects.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_meetup_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl MeetupRepository for SqliteMeetupRepository<'_> {
    fn upsert(&self, event: &Event) -> RepoResult<()> {
        event.validate()?;

        self.conn.execute(
            "INSERT INTO meetups (
                meetup_id,
                community,
                title,
                registration,
                type,
                location,
                abstract,
                date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (meetup_id) DO UPDATE SET
                community = excluded.community,
                title = excluded.title,
                registration = excluded.registration,
                type = excluded.type,
                location = excluded.location,
                abstract = excluded.abstract,
                date = excluded.date;",
            params![
                event.id.as_str(),
                event.community.as_str(),
                event.title.as_str(),
                event.registration_url.as_str(),
                event_kind_to_db(event.kind),
                event.location.as_deref(),
                event.abstract_text.as_str(),
                date_to_db(event.date),
            ],
        )?;

        Ok(())
    }

    fn get(&self, id: &str) -> RepoResult<Option<Event>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEETUP_SELECT_SQL} WHERE meetup_id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_meetup_row(row)?));
        }

        Ok(None)
    }

    fn exists(&self, id: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM meetups
                WHERE meetup_id = ?1
            );",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn delete_community_except(&self, community: &str, keep_ids: &[String]) -> RepoResult<usize> {
        let mut sql = String::from("DELETE FROM meetups WHERE community = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(community.to_string())];

        if !keep_ids.is_empty() {
            sql.push_str(" AND meetup_id NOT IN (");
            for (index, id) in keep_ids.iter().enumerate() {
                if index > 0 {
                    sql.push_str(", ");
                }
                sql.push('?');
                bind_values.push(Value::Text(id.clone()));
            }
            sql.push(')');
        }
        sql.push(';');

        let deleted = self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(deleted)
    }
}

fn parse_meetup_row(row: &Row<'_>) -> RepoResult<Event> {
    let kind_text: String = row.get("type")?;
    let kind = parse_event_kind(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid event type `{kind_text}` in meetups.type"))
    })?;

    let date_text: String = row.get("date")?;
    let date = parse_db_date(&date_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid date value `{date_text}` in meetups.date"))
    })?;

    let event = Event {
        id: row.get("meetup_id")?,
        community: row.get("community")?,
        title: row.get("title")?,
        registration_url: row.get("registration")?,
        kind,
        location: row.get("location")?,
        abstract_text: row.get::<_, Option<String>>("abstract")?.unwrap_or_default(),
        date,
    };
    event.validate()?;
    Ok(event)
}

fn event_kind_to_db(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Meetup => "meetup",
    }
}

fn parse_event_kind(value: &str) -> Option<EventKind> {
    match value {
        "meetup" => Some(EventKind::Meetup),
        _ => None,
    }
}

fn date_to_db(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_db_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn ensure_meetup_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = migrations::latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "meetups")? {
        return Err(RepoError::MissingRequiredTable("meetups"));
    }

    for column in MEETUP_COLUMNS {
        if !table_has_column(conn, "meetups", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "meetups",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
