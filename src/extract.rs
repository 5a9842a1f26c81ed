//! Database seams: catalog extraction and transactional script execution.
//!
//! Extraction queries live outside this crate; anything that can produce a
//! [`Catalog`] works, which keeps the pipeline testable without a server. The
//! sqlx-backed executor is provided here because the apply engine's
//! transactional contract is part of the core.

use anyhow::Context;
use sqlx::{Connection, PgConnection};

use crate::catalog::Catalog;

/// Produces catalog snapshots of one database.
#[allow(async_fn_in_trait)]
pub trait CatalogExtractor {
    async fn extract(&mut self) -> anyhow::Result<Catalog>;
}

/// Runs a migration script. Implementations must execute the whole script in
/// one transaction and roll back on any failure.
#[allow(async_fn_in_trait)]
pub trait ScriptExecutor {
    async fn execute(&mut self, script: &str) -> anyhow::Result<()>;
}

/// Executes scripts over a live PostgreSQL connection.
pub struct PgScriptExecutor<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> PgScriptExecutor<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }
}

impl ScriptExecutor for PgScriptExecutor<'_> {
    async fn execute(&mut self, script: &str) -> anyhow::Result<()> {
        let mut tx = self
            .conn
            .begin()
            .await
            .context("failed to open transaction")?;
        // the transaction rolls back on drop if any statement fails
        sqlx::raw_sql(script)
            .execute(&mut *tx)
            .await
            .context("migration script failed")?;
        tx.commit().await.context("failed to commit migration")?;
        Ok(())
    }
}
