//! MDX dialect abstractions for different OLAP engines.
//!
//! The builder composes against this capability trait instead of dialect
//! subclasses: each hook maps one logical construct (member selection,
//! ordering, the pagination primitive) to its textual MDX form. The default
//! bodies follow Microsoft Analysis Services; a variant engine overrides
//! only what it renders differently.

use crate::escape;
use crate::query::SortDirection;

pub trait MdxDialect {
    /// Set of every member of a hierarchy, used when no filter narrows an
    /// axis attribute.
    fn all_members(&self, address: &str) -> String {
        format!("{address}.ALLMEMBERS")
    }

    /// Member selected by name: `[Customer].[Country].[Germany]`.
    fn member_by_name(&self, address: &str, value: &str) -> String {
        format!("{address}.{}", escape::bracket_segment(value))
    }

    /// Member selected by key: `[Customer].[Country].&[276]`.
    fn member_by_key(&self, address: &str, value: &str) -> String {
        format!("{address}.&{}", escape::bracket_segment(value))
    }

    /// FILTER over the members of a hierarchy.
    fn filter_set(&self, address: &str, condition: &str) -> String {
        format!("FILTER({address}, {condition})")
    }

    /// Accessor for the current member's name or an arbitrary property,
    /// used inside FILTER conditions.
    fn current_member_accessor(&self, address: &str, property: Option<&str>) -> String {
        match property {
            Some(p) => format!(
                "{address}.CurrentMember.Properties({})",
                escape::quote_property(p)
            ),
            None => format!("{address}.CurrentMember.Name"),
        }
    }

    /// Sort key for a dimension member on the row axis.
    fn member_name_sort_key(&self, address: &str) -> String {
        format!("{address}.CurrentMember.Member_Name")
    }

    /// One ORDER wrapper. BASC/BDESC break the hierarchy before sorting.
    fn order_set(&self, set: &str, sort_key: &str, direction: SortDirection) -> String {
        let keyword = match direction {
            SortDirection::Asc => "BASC",
            SortDirection::Desc => "BDESC",
        };
        format!("ORDER({set}, {sort_key}, {keyword})")
    }

    /// Crossjoin wrapper suppressing empty tuples.
    fn non_empty_set(&self, set: &str) -> String {
        format!("NONEMPTY({set})")
    }

    /// The pagination primitive. MDX has no OFFSET/LIMIT keyword pair, so
    /// the ordered row set is windowed with SUBSET.
    fn subset(&self, set: &str, offset: u64, limit: u64) -> String {
        format!("SUBSET({set}, {offset}, {limit})")
    }

    /// Name under which a property projection is registered in the WITH
    /// clause. Calculated members live in the Measures dimension so they can
    /// ride along on the column axis.
    fn calculated_member_name(&self, alias: &str) -> String {
        format!("[Measures].[{}]", escape::sanitize_member_name(alias))
    }

    /// Definition body for a property projection.
    fn member_property_definition(&self, address: &str, property: &str) -> String {
        format!(
            "{address}.CurrentMember.PROPERTIES({})",
            escape::quote_property(property)
        )
    }

    /// One WITH-clause entry.
    fn calculated_member(&self, name: &str, definition: &str) -> String {
        format!("MEMBER {name} AS {definition}")
    }
}

mod ssas;
pub use ssas::SsasDialect;
