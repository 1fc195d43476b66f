//! The MDX statement builder.
//!
//! [`MdxQueryBuilder`] turns one [`CubeQuery`] into an MDX SELECT and, on
//! the execute path, maps the tabular result back to the query's aliases.
//! A builder borrows its query and builds fresh [`BuildState`] per call, so
//! one instance never leaks state between statements.

use std::time::Instant;

use crate::connectors::OlapConnection;
use crate::dialect::{MdxDialect, SsasDialect};
use crate::error::{MdxError, Result};
use crate::query::{AttributeSpec, CubeQuery};
use crate::statement::MdxSelect;

mod axes;
mod members;
mod results;
mod state;

pub use members::Addressing;
pub use results::{CountResult, ReadResult};
pub use state::ResultAliasMap;

use state::BuildState;

static DEFAULT_DIALECT: SsasDialect = SsasDialect;

/// A rendered statement together with the alias back-mapping the result
/// mapper needs.
#[derive(Debug, Clone)]
pub struct BuiltSelect {
    pub statement: MdxSelect,
    pub alias_map: ResultAliasMap,
}

impl BuiltSelect {
    pub fn mdx(&self) -> String {
        self.statement.render()
    }
}

pub struct MdxQueryBuilder<'a> {
    query: &'a CubeQuery,
    dialect: &'a dyn MdxDialect,
}

impl<'a> MdxQueryBuilder<'a> {
    pub fn new(query: &'a CubeQuery) -> Self {
        Self {
            query,
            dialect: &DEFAULT_DIALECT,
        }
    }

    /// Build against a specific engine dialect.
    pub fn with_dialect(query: &'a CubeQuery, dialect: &'a dyn MdxDialect) -> Self {
        Self { query, dialect }
    }

    pub fn query(&self) -> &CubeQuery {
        self.query
    }

    /// True iff the attribute's owning entity resolves to this builder's
    /// cube (case-insensitive). Used by the surrounding layer to route
    /// attributes between builders, so "no cube at all" is false, not an
    /// error.
    pub fn can_read_attribute(&self, attr: &AttributeSpec) -> bool {
        match &attr.cube {
            Some(cube) => cube.eq_ignore_ascii_case(&self.query.cube),
            None => false,
        }
    }

    /// Build the statement for the query's own limit/offset window.
    pub fn build_select(&self) -> Result<BuiltSelect> {
        self.build_select_with_limit(self.query.limit)
    }

    /// Stage order matters: the row axis can register calculated members
    /// the column axis must project, and marks the filters the WHERE pass
    /// must skip.
    fn build_select_with_limit(&self, limit: u64) -> Result<BuiltSelect> {
        if self.query.cube.trim().is_empty() {
            return Err(MdxError::Validation(
                "query has no cube address".to_string(),
            ));
        }
        let mut state = BuildState::default();

        let rows = axes::build_rows(self.dialect, self.query, &mut state, limit)?;
        let columns = axes::build_columns(self.dialect, self.query, &mut state);
        let slicers = axes::build_slicers(self.dialect, self.query, &state)?;

        let with_members = state
            .calculated_members()
            .iter()
            .map(|m| self.dialect.calculated_member(&m.name, &m.definition))
            .collect();

        let statement = MdxSelect {
            with_members,
            columns,
            rows,
            cube: self.query.cube.clone(),
            slicers,
        };

        Ok(BuiltSelect {
            statement,
            alias_map: state.into_alias_map(),
        })
    }

    /// Execute the query and return the alias-mapped page plus pagination
    /// metadata. When a limit is set, one extra row is requested to detect
    /// whether more data exists.
    pub async fn read(&self, connection: &dyn OlapConnection) -> Result<ReadResult> {
        let (mut rows, alias_map) = self.fetch_page(connection).await?;
        results::apply_alias_map(&mut rows, &alias_map);
        let result = results::paginate(rows, self.query.limit, self.query.offset);
        tracing::debug!(
            rows = result.affected_rows,
            has_more = result.has_more_rows,
            "mdx read"
        );
        Ok(result)
    }

    /// Same over-fetch strategy as [`read`](Self::read), but only the
    /// metadata comes back.
    pub async fn count(&self, connection: &dyn OlapConnection) -> Result<CountResult> {
        let raw = self.fetch_page(connection).await?;
        let result = results::paginate(raw.0, self.query.limit, self.query.offset);
        Ok(CountResult {
            has_more_rows: result.has_more_rows,
            total_row_count: result.total_row_count,
        })
    }

    async fn fetch_page(
        &self,
        connection: &dyn OlapConnection,
    ) -> Result<(Vec<serde_json::Map<String, serde_json::Value>>, ResultAliasMap)> {
        let fetch_limit = if self.query.limit > 0 {
            self.query.limit + 1
        } else {
            0
        };
        let built = self.build_select_with_limit(fetch_limit)?;
        let mdx = built.mdx();
        tracing::trace!(statement = %mdx, "executing MDX");

        let start = Instant::now();
        let result = connection.execute_mdx(&mdx).await?;
        tracing::debug!(
            cube = %self.query.cube,
            rows = result.rows.len(),
            statement_len = mdx.len(),
            ms = start.elapsed().as_millis(),
            "mdx executed"
        );

        Ok((result.rows, built.alias_map))
    }
}
