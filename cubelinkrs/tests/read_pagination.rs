//! Integration tests for the execute path: over-fetch pagination, alias
//! back-mapping and failure propagation, against a stub connection.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use cubelink::{
    AttributeSpec, Comparator, CubeQuery, FilterSpec, MdxError, MdxQueryBuilder, OlapConnection,
    QueryResult,
};

/// Connection stub returning a fixed number of synthetic rows and recording
/// every statement it executes.
struct StubConnection {
    rows: usize,
    fail: bool,
    statements: Mutex<Vec<String>>,
}

impl StubConnection {
    fn returning(rows: usize) -> Self {
        Self {
            rows,
            fail: false,
            statements: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            rows: 0,
            fail: true,
            statements: Mutex::new(Vec::new()),
        }
    }

    fn executed(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl OlapConnection for StubConnection {
    async fn execute_mdx(&self, mdx: &str) -> cubelink::Result<QueryResult> {
        self.statements.lock().unwrap().push(mdx.to_string());
        if self.fail {
            return Err(MdxError::query_failed(mdx, anyhow::anyhow!("cube offline")));
        }
        let rows = (0..self.rows)
            .map(|i| {
                let mut row = Map::new();
                row.insert("[Customer].[Country]".to_string(), json!(format!("c{i}")));
                row.insert("[Measures].[Sales]".to_string(), json!(i as u64));
                row
            })
            .collect();
        Ok(QueryResult {
            columns: Vec::new(),
            rows,
        })
    }
}

fn paged_query(limit: u64, offset: u64) -> CubeQuery {
    let mut q = CubeQuery::new("[Adventure Works]");
    q.attributes
        .push(AttributeSpec::new("country", "[Customer].[Country]"));
    q.attributes
        .push(AttributeSpec::new("total_sales", "[Measures].[Sales]"));
    q.limit = limit;
    q.offset = offset;
    q
}

#[tokio::test]
async fn full_page_overfetch_truncates_and_reports_more_rows() {
    let q = paged_query(10, 20);
    let conn = StubConnection::returning(11);

    let result = MdxQueryBuilder::new(&q).read(&conn).await.unwrap();

    assert_eq!(result.affected_rows, 10);
    assert_eq!(result.rows.len(), 10);
    assert!(result.has_more_rows);
    assert_eq!(result.total_row_count, None);
    // The 11th row was the over-fetch probe and must not leak out.
    assert!(!result
        .rows
        .iter()
        .any(|r| r["[Customer].[Country]"] == json!("c10")));

    // The statement asked for one row more than the page.
    let executed = conn.executed();
    assert_eq!(executed.len(), 1);
    assert!(executed[0].contains("SUBSET(") && executed[0].contains(", 20, 11)"));
}

#[tokio::test]
async fn short_page_reports_exact_total() {
    let q = paged_query(10, 20);
    let conn = StubConnection::returning(7);

    let result = MdxQueryBuilder::new(&q).read(&conn).await.unwrap();

    assert_eq!(result.affected_rows, 7);
    assert!(!result.has_more_rows);
    assert_eq!(result.total_row_count, Some(27));
}

#[tokio::test]
async fn unlimited_read_takes_everything() {
    let q = paged_query(0, 0);
    let conn = StubConnection::returning(5);

    let result = MdxQueryBuilder::new(&q).read(&conn).await.unwrap();

    assert_eq!(result.affected_rows, 5);
    assert!(!result.has_more_rows);
    assert_eq!(result.total_row_count, Some(5));
    assert!(!conn.executed()[0].contains("SUBSET"));
}

#[tokio::test]
async fn rows_carry_both_the_raw_address_and_the_alias() {
    let q = paged_query(0, 0);
    let conn = StubConnection::returning(3);

    let result = MdxQueryBuilder::new(&q).read(&conn).await.unwrap();

    for row in &result.rows {
        assert_eq!(row["total_sales"], row["[Measures].[Sales]"]);
        assert_eq!(row["country"], row["[Customer].[Country]"]);
    }
}

#[tokio::test]
async fn count_uses_the_same_overfetch_strategy() {
    let q = paged_query(10, 20);

    let exhausted = StubConnection::returning(4);
    let count = MdxQueryBuilder::new(&q).count(&exhausted).await.unwrap();
    assert!(!count.has_more_rows);
    assert_eq!(count.total_row_count, Some(24));

    let more = StubConnection::returning(11);
    let count = MdxQueryBuilder::new(&q).count(&more).await.unwrap();
    assert!(count.has_more_rows);
    assert_eq!(count.total_row_count, None);
}

#[tokio::test]
async fn unsupported_comparator_fails_before_any_statement_is_sent() {
    let mut q = paged_query(10, 0);
    q.filters.push(FilterSpec::new(
        "[Customer].[Country]",
        Comparator::NotIn,
        "A,B",
    ));
    let conn = StubConnection::returning(11);

    let err = MdxQueryBuilder::new(&q).read(&conn).await.unwrap_err();

    assert!(matches!(err, MdxError::UnsupportedComparator { .. }));
    assert!(conn.executed().is_empty());
}

#[tokio::test]
async fn execution_failures_carry_the_statement_text() {
    let q = paged_query(0, 0);
    let conn = StubConnection::failing();

    let err = MdxQueryBuilder::new(&q).read(&conn).await.unwrap_err();

    match err {
        MdxError::QueryFailed { statement, source } => {
            assert!(statement.contains("FROM [Adventure Works]"));
            assert!(source.to_string().contains("cube offline"));
        }
        other => panic!("expected QueryFailed, got {other:?}"),
    }
}
