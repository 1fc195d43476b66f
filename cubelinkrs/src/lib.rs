pub mod config;
pub mod connectors;
pub mod dialect;
pub mod error;
pub mod escape;
pub mod executor;
pub mod query;
pub mod query_builder;
pub mod statement;

pub use config::{ConnectionConfig, CubelinkConfig, OpenQueryConfig, XmlaConfig};
pub use connectors::{ConnectionManager, OlapConnection, OpenQueryConnection, SqlExecutor};
#[cfg(feature = "xmla")]
pub use connectors::XmlaConnection;
pub use error::{MdxError, Result};
pub use executor::{ColumnMeta, QueryResult};
pub use query::{
    AttributeSpec, Comparator, CubeQuery, FilterSpec, SortDirection, SorterSpec,
};
pub use query_builder::{BuiltSelect, CountResult, MdxQueryBuilder, ReadResult};
pub use statement::MdxSelect;

/// Install a fmt subscriber honoring `RUST_LOG`. Intended for binaries and
/// examples; a host application brings its own subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
