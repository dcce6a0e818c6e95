//! Statement execution against the store.
//!
//! [`PgExecutor`] opens a connection per call, runs one statement and closes
//! it again. [`mock::RecordingExecutor`] captures statements for tests.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Column, ConnectOptions, Connection, Executor, PgConnection, Postgres, Row, TypeInfo};
use tracing::{debug, warn};

use configs::DatabaseConfig;

use crate::errors::FleetError;
use crate::row_set::{Cell, RowSet};
use crate::statement::{RenderedSql, SqlParam, SqlStatement};

#[async_trait]
pub trait StatementExecutor: Send + Sync {
    /// Run a statement that produces rows and materialize all of them.
    async fn query(&self, stmt: &SqlStatement) -> Result<RowSet, FleetError>;
    /// Run a command and report the affected row count.
    async fn execute(&self, stmt: &SqlStatement) -> Result<u64, FleetError>;
}

#[derive(Debug, Clone)]
pub struct PgExecutor {
    options: PgConnectOptions,
}

impl PgExecutor {
    pub fn new(cfg: &DatabaseConfig) -> Result<Self, FleetError> {
        let options = PgConnectOptions::from_str(&cfg.url)
            .map_err(|e| FleetError::Unavailable(format!("invalid database url: {e}")))?;
        let options = if cfg.sqlx_logging { options } else { options.disable_statement_logging() };
        Ok(Self { options })
    }

    async fn open(&self) -> Result<PgConnection, FleetError> {
        PgConnection::connect_with(&self.options).await.map_err(|e| {
            warn!(error = %e, "store connection failed");
            match FleetError::from(e) {
                FleetError::StoreRejected(msg) => FleetError::Unavailable(msg),
                other => other,
            }
        })
    }

    async fn finish(conn: PgConnection) {
        if let Err(e) = conn.close().await {
            debug!(error = %e, "closing store connection failed");
        }
    }
}

#[async_trait]
impl StatementExecutor for PgExecutor {
    async fn query(&self, stmt: &SqlStatement) -> Result<RowSet, FleetError> {
        let rendered = stmt.render()?;
        debug!(sql = %rendered.sql, args = rendered.args.len(), "query");
        let mut conn = self.open().await?;
        let result = fetch_rows(&mut conn, &rendered).await;
        Self::finish(conn).await;
        result
    }

    async fn execute(&self, stmt: &SqlStatement) -> Result<u64, FleetError> {
        let rendered = stmt.render()?;
        debug!(sql = %rendered.sql, args = rendered.args.len(), "execute");
        let mut conn = self.open().await?;
        let result = bind_all(sqlx::query(&rendered.sql), &rendered.args)
            .execute(&mut conn)
            .await
            .map(|done| done.rows_affected())
            .map_err(FleetError::from);
        Self::finish(conn).await;
        result
    }
}

async fn fetch_rows(conn: &mut PgConnection, rendered: &RenderedSql) -> Result<RowSet, FleetError> {
    let rows = bind_all(sqlx::query(&rendered.sql), &rendered.args).fetch_all(&mut *conn).await?;
    let columns: Vec<String> = match rows.first() {
        Some(first) => first.columns().iter().map(|c| c.name().to_string()).collect(),
        // No rows to read column names from; ask the store to describe the statement
        None => conn
            .describe(&rendered.sql)
            .await?
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect(),
    };
    let mut set = RowSet::new(columns);
    for row in &rows {
        let mut cells = Vec::with_capacity(row.len());
        for idx in 0..row.len() {
            cells.push(decode_cell(row, idx)?);
        }
        set.push_row(cells);
    }
    Ok(set)
}

fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    args: &'q [SqlParam],
) -> Query<'q, Postgres, PgArguments> {
    for arg in args {
        query = match arg {
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Decimal(v) => query.bind(*v),
            SqlParam::Text(v) => query.bind(v.as_deref()),
            SqlParam::Date(v) => query.bind(*v),
            SqlParam::Timestamp(v) => query.bind(*v),
        };
    }
    query
}

fn decode_cell(row: &PgRow, idx: usize) -> Result<Cell, FleetError> {
    let type_name = row.column(idx).type_info().name().to_ascii_uppercase();
    let cell = match type_name.as_str() {
        "BOOL" => row.try_get::<Option<bool>, _>(idx)?.map(Cell::Bool),
        "INT2" => row.try_get::<Option<i16>, _>(idx)?.map(|v| Cell::Int(v.into())),
        "INT4" => row.try_get::<Option<i32>, _>(idx)?.map(|v| Cell::Int(v.into())),
        "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(Cell::Int),
        "FLOAT4" => row.try_get::<Option<f32>, _>(idx)?.map(|v| Cell::Float(v.into())),
        "FLOAT8" => row.try_get::<Option<f64>, _>(idx)?.map(Cell::Float),
        "NUMERIC" => row.try_get::<Option<Decimal>, _>(idx)?.map(Cell::Decimal),
        "DATE" => row.try_get::<Option<NaiveDate>, _>(idx)?.map(Cell::Date),
        "TIMESTAMP" => row.try_get::<Option<NaiveDateTime>, _>(idx)?.map(Cell::Timestamp),
        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(idx)?
            .map(|v| Cell::Timestamp(v.naive_utc())),
        "VOID" => None,
        // TEXT, VARCHAR, BPCHAR, NAME and anything that decodes as a string
        _ => row.try_get::<Option<String>, _>(idx).ok().flatten().map(Cell::Text),
    };
    Ok(cell.unwrap_or(Cell::Null))
}

/// Recording executor for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex, MutexGuard};

    #[derive(Default)]
    struct State {
        statements: Vec<SqlStatement>,
        responses: Vec<(String, Result<RowSet, FleetError>)>,
        affected: u64,
    }

    /// Records every statement it receives and answers from canned responses.
    ///
    /// A response registered with [`RecordingExecutor::respond`] is returned for
    /// any statement whose text contains its fragment; later registrations win.
    /// Unmatched queries return an empty row set. Clones share state.
    #[derive(Clone, Default)]
    pub struct RecordingExecutor {
        state: Arc<Mutex<State>>,
    }

    impl RecordingExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        fn lock(&self) -> MutexGuard<'_, State> {
            self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }

        pub fn respond(&self, fragment: &str, rows: RowSet) -> &Self {
            self.lock().responses.push((fragment.to_string(), Ok(rows)));
            self
        }

        pub fn fail(&self, fragment: &str, err: FleetError) -> &Self {
            self.lock().responses.push((fragment.to_string(), Err(err)));
            self
        }

        pub fn set_affected(&self, rows: u64) -> &Self {
            self.lock().affected = rows;
            self
        }

        pub fn statements(&self) -> Vec<SqlStatement> {
            self.lock().statements.clone()
        }

        pub fn last(&self) -> Option<SqlStatement> {
            self.lock().statements.last().cloned()
        }

        pub fn clear(&self) {
            self.lock().statements.clear();
        }

        fn answer(&self, stmt: &SqlStatement) -> Option<Result<RowSet, FleetError>> {
            let mut state = self.lock();
            state.statements.push(stmt.clone());
            state
                .responses
                .iter()
                .rev()
                .find(|(fragment, _)| stmt.text().contains(fragment.as_str()))
                .map(|(_, response)| response.clone())
        }
    }

    #[async_trait]
    impl StatementExecutor for RecordingExecutor {
        async fn query(&self, stmt: &SqlStatement) -> Result<RowSet, FleetError> {
            stmt.render()?;
            self.answer(stmt).unwrap_or_else(|| Ok(RowSet::default()))
        }

        async fn execute(&self, stmt: &SqlStatement) -> Result<u64, FleetError> {
            stmt.render()?;
            match self.answer(stmt) {
                Some(Err(e)) => Err(e),
                _ => Ok(self.lock().affected),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::RecordingExecutor;
    use super::*;

    #[tokio::test]
    async fn recording_executor_matches_fragments() {
        let exec = RecordingExecutor::new();
        exec.respond("FROM vehicles", RowSet::with_rows(&["vehicle_id"], vec![vec![1.into()]]));
        exec.fail("maintenance_records", FleetError::StoreRejected("boom".into()));

        let rows = exec.query(&SqlStatement::new("SELECT * FROM vehicles LIMIT 100")).await.unwrap();
        assert_eq!(rows.len(), 1);
        let err = exec.execute(&SqlStatement::new("DELETE FROM maintenance_records")).await.unwrap_err();
        assert_eq!(err, FleetError::StoreRejected("boom".into()));
        assert!(exec.query(&SqlStatement::new("SELECT * FROM trips")).await.unwrap().is_empty());
        assert_eq!(exec.statements().len(), 3);
    }

    #[tokio::test]
    async fn recording_executor_surfaces_binding_errors() {
        let exec = RecordingExecutor::new();
        let err = exec.query(&SqlStatement::new("SELECT * FROM trips WHERE trip_id = @TripID")).await.unwrap_err();
        assert!(matches!(err, FleetError::Binding(_)));
        assert!(exec.statements().is_empty());
    }

    #[test]
    fn rejects_unparseable_url() {
        let cfg = DatabaseConfig::with_url("not a url");
        assert!(matches!(PgExecutor::new(&cfg), Err(FleetError::Unavailable(_))));
    }
}
