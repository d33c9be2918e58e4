use std::fs;
use std::path::PathBuf;

use duckdb::{AccessMode, Connection};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::db::discovery::{self, AttachKind};
use crate::db::value;
use crate::error::GateError;

/// Name of the optional initialization script executed on every new session.
const INIT_SCRIPT: &str = "init.sql";

/// Opens one read-only database session per request.
///
/// Sessions are never pooled or shared; every `acquire` call discovers the
/// attachable sibling files afresh, so a file dropped into the working
/// directory is visible to the next request.
pub struct SessionProvider {
    root: PathBuf,
    db_file: String,
}

impl SessionProvider {
    pub fn new(root: impl Into<PathBuf>, db_file: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            db_file: db_file.into(),
        }
    }

    /// Open the primary database read-only, run the init script if present,
    /// load the lake extension when lake siblings exist, and attach every
    /// discovered sibling in deterministic order.
    ///
    /// Any failure here is fatal for the request, not the process.
    pub fn acquire(&self) -> Result<Session, GateError> {
        let primary = self.root.join(&self.db_file);
        let config = duckdb::Config::default()
            .access_mode(AccessMode::ReadOnly)
            .map_err(connection_err)?;
        let conn = Connection::open_with_flags(&primary, config).map_err(connection_err)?;

        let init_path = self.root.join(INIT_SCRIPT);
        if init_path.exists() {
            let script = fs::read_to_string(&init_path).map_err(connection_err)?;
            conn.execute_batch(&script).map_err(connection_err)?;
            debug!(path = %init_path.display(), "executed init script");
        }

        let targets = discovery::discover(&self.root, &self.db_file).map_err(connection_err)?;

        if targets.iter().any(|t| t.kind == AttachKind::Lake) {
            conn.execute_batch("INSTALL ducklake; LOAD ducklake;")
                .map_err(connection_err)?;
        }

        let mut attached: Vec<String> = Vec::with_capacity(targets.len());
        for target in &targets {
            if attached.contains(&target.alias) {
                warn!(
                    alias = %target.alias,
                    file = %target.file_name,
                    "alias collision; later attach replaces the earlier one"
                );
            }
            conn.execute_batch(&target.attach_sql())
                .map_err(connection_err)?;
            debug!(alias = %target.alias, file = %target.file_name, "attached database");
            attached.push(target.alias.clone());
        }

        Ok(Session {
            conn: Some(conn),
            attached,
        })
    }
}

/// Per-request handle wrapping one read-only connection and the aliases
/// attached to it. Owned exclusively by the request that created it; the
/// connection is released when the session drops, on every exit path.
#[derive(Debug)]
pub struct Session {
    conn: Option<Connection>,
    attached: Vec<String>,
}

/// Shaped result of one query execution: the wire format of `POST /query`.
#[derive(Debug, Serialize)]
pub struct QueryOutput {
    pub rowcount: usize,
    pub columns: Vec<String>,
    pub results: Vec<JsonValue>,
}

impl Session {
    /// Execute `sql` exactly once and materialize the full result set.
    ///
    /// Engine errors of any kind (syntax, missing table, read-only
    /// violations) surface as `BadRequest` carrying the engine message.
    pub fn run(&self, sql: &str) -> Result<QueryOutput, GateError> {
        let conn = self
            .conn
            .as_ref()
            .ok_or_else(|| GateError::Internal("session already closed".into()))?;

        let mut stmt = conn.prepare(sql).map_err(query_err)?;
        let mut rows = stmt.query([]).map_err(query_err)?;
        let columns: Vec<String> = rows
            .as_ref()
            .map(|s| s.column_names())
            .unwrap_or_default();

        let mut results = Vec::new();
        while let Some(row) = rows.next().map_err(query_err)? {
            let mut obj = serde_json::Map::with_capacity(columns.len());
            for (idx, name) in columns.iter().enumerate() {
                let v: duckdb::types::Value = row.get(idx).map_err(query_err)?;
                obj.insert(name.clone(), value::to_json(&v));
            }
            results.push(JsonValue::Object(obj));
        }

        Ok(QueryOutput {
            rowcount: results.len(),
            columns,
            results,
        })
    }

    pub fn attached_aliases(&self) -> &[String] {
        &self.attached
    }

    /// Close the underlying connection. Idempotent; also invoked from `Drop`.
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take()
            && let Err((_, e)) = conn.close()
        {
            warn!(error = %e, "failed to close database session");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

fn connection_err(e: impl std::fmt::Display) -> GateError {
    GateError::Connection(e.to_string())
}

fn query_err(e: duckdb::Error) -> GateError {
    GateError::BadRequest(format!("Query error: {e}"))
}
