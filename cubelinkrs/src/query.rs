//! The logical query model handed to the MDX builder.
//!
//! A [`CubeQuery`] is the data-source-agnostic description supplied by the
//! surrounding query layer: which attributes to read, how to filter, sort
//! and page. The builder translates it into a single MDX SELECT.

use serde::{Deserialize, Serialize};

/// Literal prefix that routes an attribute to the column axis.
pub const MEASURES_PREFIX: &str = "[Measures].";

/// One attribute requested by the query.
///
/// `alias` is the key the caller expects in the output rows; `address` is
/// the raw MDX member or measure expression (e.g. `[Measures].[Sales]` or
/// `[Customer].[Country]`). An attribute whose address starts with
/// `[Measures].` lands on the column axis, everything else on the row axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeSpec {
    pub alias: String,
    pub address: String,
    /// Member property override (e.g. `KEY`, `CAPTION`). Anything other than
    /// the implicit NAME/KEY default makes the builder project the property
    /// through a calculated member instead of the member name.
    #[serde(default)]
    pub address_property: Option<String>,
    /// Cube address of the attribute's owning entity, used by
    /// [`can_read_attribute`](crate::query_builder::MdxQueryBuilder::can_read_attribute).
    #[serde(default)]
    pub cube: Option<String>,
}

impl AttributeSpec {
    pub fn new(alias: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            address: address.into(),
            address_property: None,
            cube: None,
        }
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.address_property = Some(property.into());
        self
    }

    pub fn with_cube(mut self, cube: impl Into<String>) -> Self {
        self.cube = Some(cube.into());
        self
    }

    /// Measures go on COLUMNS, dimension members on ROWS.
    pub fn is_measure(&self) -> bool {
        self.address.starts_with(MEASURES_PREFIX)
    }
}

/// One filter condition targeting a member address.
///
/// At build time a filter is matched to an attribute by address string
/// equality; a matched filter is applied on the row axis, an unmatched one
/// becomes a WHERE slicer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSpec {
    pub address: String,
    pub comparator: Comparator,
    pub compare_value: String,
    /// Token separator for [`Comparator::In`] compare values. Tokens are not
    /// trimmed or deduplicated; callers pre-normalize.
    #[serde(default = "default_list_delimiter")]
    pub value_list_delimiter: String,
    /// Addressing-mode override: `KEY` selects members by key (`&[...]`),
    /// any other property name switches the property accessor used by the
    /// contains comparators.
    #[serde(default)]
    pub address_property: Option<String>,
}

fn default_list_delimiter() -> String {
    ",".to_string()
}

impl FilterSpec {
    pub fn new(
        address: impl Into<String>,
        comparator: Comparator,
        compare_value: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            comparator,
            compare_value: compare_value.into(),
            value_list_delimiter: default_list_delimiter(),
            address_property: None,
        }
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.value_list_delimiter = delimiter.into();
        self
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.address_property = Some(property.into());
        self
    }

    /// A blank compare value never contributes a member expression.
    pub fn is_blank(&self) -> bool {
        self.compare_value.trim().is_empty()
    }
}

/// Comparison operators carried by [`FilterSpec`].
///
/// Only the operators in the translation table of
/// [`query_builder::members`](crate::query_builder) are supported; the rest
/// exist so the surrounding layer can round-trip its full operator set and
/// get a structured `UnsupportedComparator` error instead of bad MDX.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = "==")]
    Equals,
    #[serde(rename = "!==")]
    NotEquals,
    /// Substring match ("IS" in the surrounding framework).
    #[serde(rename = "=")]
    Is,
    #[serde(rename = "!=")]
    IsNot,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "not in")]
    NotIn,
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Comparator::Equals => "==",
            Comparator::NotEquals => "!==",
            Comparator::Is => "=",
            Comparator::IsNot => "!=",
            Comparator::GreaterThan => ">",
            Comparator::GreaterOrEqual => ">=",
            Comparator::LessThan => "<",
            Comparator::LessOrEqual => "<=",
            Comparator::In => "in",
            Comparator::NotIn => "not in",
        };
        f.write_str(text)
    }
}

/// One sort instruction. Applied to the row axis regardless of whether the
/// target is a measure or a dimension member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SorterSpec {
    pub address: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// The full logical query for one cube.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CubeQuery {
    /// Data address of the main cube, used verbatim in the FROM clause
    /// (e.g. `[Adventure Works]`).
    pub cube: String,
    #[serde(default)]
    pub attributes: Vec<AttributeSpec>,
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    #[serde(default)]
    pub sorters: Vec<SorterSpec>,
    /// Maximum rows per page; 0 means unlimited.
    #[serde(default)]
    pub limit: u64,
    /// Row offset of the page window.
    #[serde(default)]
    pub offset: u64,
}

impl CubeQuery {
    pub fn new(cube: impl Into<String>) -> Self {
        Self {
            cube: cube.into(),
            ..Default::default()
        }
    }
}
