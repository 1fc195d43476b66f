//! Assembled MDX SELECT statements.
//!
//! [`MdxSelect`] holds the pre-rendered pieces produced by the axis builders
//! and renders them into the fixed statement template. It deliberately stays
//! a value type: the builder constructs one per query and throws it away.

use std::fmt;

/// The parts of one MDX SELECT, assembled by the query builder.
#[derive(Debug, Clone, Default)]
pub struct MdxSelect {
    /// Rendered `MEMBER <name> AS <definition>` entries, in insertion order.
    pub with_members: Vec<String>,
    /// Column-axis set expression, including any NON EMPTY wrapper.
    pub columns: String,
    /// Row-axis set expression, already ordered and paginated.
    pub rows: String,
    /// Cube reference used verbatim in the FROM clause.
    pub cube: String,
    /// Slicer member expressions; empty means no WHERE clause at all.
    pub slicers: Vec<String>,
}

impl MdxSelect {
    pub fn render(&self) -> String {
        let mut mdx = String::new();

        if !self.with_members.is_empty() {
            mdx.push_str("WITH\n");
            for member in &self.with_members {
                mdx.push_str("    ");
                mdx.push_str(member);
                mdx.push('\n');
            }
        }

        mdx.push_str("SELECT\n");
        mdx.push_str(&format!("    {} ON COLUMNS,\n", self.columns));
        mdx.push_str(&format!("    {} ON ROWS\n", self.rows));
        mdx.push_str(&format!("FROM {}", self.cube));

        if !self.slicers.is_empty() {
            mdx.push_str("\nWHERE (\n");
            mdx.push_str(&format!("    {}\n", self.slicers.join(",\n    ")));
            mdx.push(')');
        }

        mdx
    }
}

impl fmt::Display for MdxSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
