//! OLAP transport connectors.
//!
//! The builder only needs one capability from a connection: execute a raw
//! MDX statement and hand back a normalized row set. Two transport shapes
//! implement it: a relational bridge that tunnels the statement through
//! OPENQUERY on a linked server, and a direct XMLA session.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::executor::QueryResult;

/// Unified interface for all cube connections.
///
/// Execution failures must come back as
/// [`MdxError::QueryFailed`](crate::error::MdxError::QueryFailed) carrying
/// the offending statement text; the builder never retries.
#[async_trait]
pub trait OlapConnection: Send + Sync {
    /// Session setup (e.g. creating the linked server). No-op by default.
    async fn open(&self) -> Result<()> {
        Ok(())
    }

    /// Session teardown. No-op by default.
    async fn close(&self) -> Result<()> {
        Ok(())
    }

    async fn execute_mdx(&self, mdx: &str) -> Result<QueryResult>;
}

/// Minimal connection manager keyed by connection name.
#[derive(Clone, Default)]
pub struct ConnectionManager {
    connections: HashMap<String, Arc<dyn OlapConnection>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, conn: Arc<dyn OlapConnection>) {
        self.connections.insert(name.into(), conn);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn OlapConnection>> {
        self.connections.get(name)
    }

    /// Builds a connection for every XMLA entry in the configuration.
    /// OPENQUERY entries need a caller-supplied [`SqlExecutor`] and are
    /// skipped; register those with [`insert`](Self::insert).
    #[cfg(feature = "xmla")]
    pub fn from_config(config: &crate::config::CubelinkConfig) -> Result<Self> {
        let mut manager = Self::new();
        for (name, conn) in &config.connections {
            if let crate::config::ConnectionConfig::Xmla(xmla) = conn {
                manager.insert(name.clone(), Arc::new(XmlaConnection::new(xmla.clone())?));
            }
        }
        Ok(manager)
    }
}

mod openquery;
pub use openquery::{OpenQueryConnection, SqlExecutor};

#[cfg(feature = "xmla")]
mod xmla;
#[cfg(feature = "xmla")]
pub use xmla::XmlaConnection;
