//! OPENQUERY bridge connector.
//!
//! Tunnels MDX through a SQL Server linked server: `open` registers the
//! linked server against the OLAP provider, `execute_mdx` wraps the
//! statement in `SELECT * FROM OPENQUERY(...)` and runs it through an
//! injected SQL execution path, `close` drops the linked server again.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::OpenQueryConfig;
use crate::error::{MdxError, Result};
use crate::executor::QueryResult;

use super::OlapConnection;

/// Generic SQL execution path the bridge delegates to. The surrounding
/// application owns the actual SQL Server session.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    async fn run_sql(&self, sql: &str) -> anyhow::Result<QueryResult>;
}

pub struct OpenQueryConnection {
    executor: Arc<dyn SqlExecutor>,
    config: OpenQueryConfig,
}

impl OpenQueryConnection {
    pub fn new(executor: Arc<dyn SqlExecutor>, config: OpenQueryConfig) -> Self {
        Self { executor, config }
    }

    pub fn config(&self) -> &OpenQueryConfig {
        &self.config
    }

    fn wrap_statement(&self, mdx: &str) -> String {
        format!(
            "SELECT * FROM OPENQUERY({},\n'\n{}\n')",
            self.config.linked_server,
            sql_quote_body(mdx)
        )
    }
}

#[async_trait]
impl OlapConnection for OpenQueryConnection {
    async fn open(&self) -> Result<()> {
        let sql = format!(
            "EXEC sp_addlinkedserver\n    @server='{}',\n    @srvproduct='{}',\n    @provider='{}',\n    @datasrc='{}',\n    @catalog='{}'",
            sql_quote_body(&self.config.linked_server),
            sql_quote_body(&self.config.srvproduct),
            sql_quote_body(&self.config.provider),
            sql_quote_body(&self.config.datasrc),
            sql_quote_body(&self.config.catalog),
        );
        tracing::info!(linked_server = %self.config.linked_server, "registering linked server");
        self.executor
            .run_sql(&sql)
            .await
            .map_err(|e| MdxError::Execution(format!("create linked server: {e}")))?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let sql = format!(
            "EXEC sp_dropserver @server='{}'",
            sql_quote_body(&self.config.linked_server)
        );
        tracing::info!(linked_server = %self.config.linked_server, "dropping linked server");
        self.executor
            .run_sql(&sql)
            .await
            .map_err(|e| MdxError::Execution(format!("drop linked server: {e}")))?;
        Ok(())
    }

    async fn execute_mdx(&self, mdx: &str) -> Result<QueryResult> {
        let sql = self.wrap_statement(mdx);
        tracing::trace!(sql = %sql, "executing MDX via OPENQUERY");
        self.executor
            .run_sql(&sql)
            .await
            .map_err(|e| MdxError::query_failed(mdx, e))
    }
}

/// Escape a value embedded in a single-quoted T-SQL literal.
fn sql_quote_body(value: &str) -> String {
    value.replace('\'', "''")
}
