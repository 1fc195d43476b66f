//! Axis set construction.
//!
//! The row axis must be built before the column axis: translating a
//! dimension attribute with a property override registers a calculated
//! member, and the column builder projects every registered member onto
//! COLUMNS. Reordering these stages drops the synthesized columns.

use crate::dialect::MdxDialect;
use crate::error::Result;
use crate::query::{AttributeSpec, CubeQuery, FilterSpec};

use super::members::{self, Addressing};
use super::state::BuildState;

/// Column-axis set: every measure attribute plus every calculated member
/// registered while building the rows. Alias mappings for measures whose
/// alias differs from the physical column label are recorded here.
pub fn build_columns(dialect: &dyn MdxDialect, query: &CubeQuery, state: &mut BuildState) -> String {
    let mut selects: Vec<String> = Vec::new();

    for attr in query.attributes.iter().filter(|a| a.is_measure()) {
        selects.push(measure_clause(attr, None));
        if attr.alias != attr.address {
            state.register_alias(&attr.address, &attr.alias);
        }
    }

    let synthesized: Vec<(String, String)> = state
        .calculated_members()
        .iter()
        .map(|m| (m.name.clone(), m.alias.clone()))
        .collect();
    for (name, alias) in synthesized {
        if name != alias {
            state.register_alias(&name, &alias);
        }
        selects.push(name);
    }

    if selects.is_empty() {
        // An empty set cannot be "non-empty".
        "{ }".to_string()
    } else {
        format!("NON EMPTY {{ {} }}", selects.join(", "))
    }
}

/// Raw measure select, with an optional aggregation-function suffix.
fn measure_clause(attr: &AttributeSpec, function: Option<&str>) -> String {
    match function {
        Some(f) => format!("{}.{f}", attr.address),
        None => attr.address.clone(),
    }
}

/// Row-axis set: per-attribute member sets, crossjoined, ordered and
/// windowed. `limit` is the effective fetch limit (the read path passes the
/// over-fetched page size), 0 means no SUBSET wrapper.
pub fn build_rows(
    dialect: &dyn MdxDialect,
    query: &CubeQuery,
    state: &mut BuildState,
    limit: u64,
) -> Result<String> {
    let mut member_sets: Vec<String> = Vec::new();

    for attr in query.attributes.iter().filter(|a| !a.is_measure()) {
        let matched: Vec<(usize, &FilterSpec)> = query
            .filters
            .iter()
            .enumerate()
            .filter(|(_, f)| f.address == attr.address)
            .collect();

        // Every matched filter is consumed by this axis, blank or not. A
        // blank one contributes no expression and is dropped for good.
        for (idx, _) in &matched {
            state.mark_on_axis(*idx);
        }

        let applicable: Vec<&FilterSpec> = matched
            .iter()
            .map(|(_, f)| *f)
            .filter(|f| !f.is_blank())
            .collect();

        let member_set = if applicable.is_empty() {
            dialect.all_members(&attr.address)
        } else {
            let mut expressions = Vec::new();
            for filter in applicable {
                expressions.extend(members::member_expressions(dialect, filter)?);
            }
            format!("{{ {} }}", expressions.join(", "))
        };

        register_projection(dialect, attr, state);

        // Two attributes from the same dimension can produce the exact same
        // textual set; crossjoining it with itself yields garbage.
        if !member_sets.contains(&member_set) {
            member_sets.push(member_set);
        }
    }

    if member_sets.is_empty() {
        return Ok("{ }".to_string());
    }

    let mut set = if member_sets.len() > 1 {
        dialect.non_empty_set(&member_sets.join(" * "))
    } else {
        member_sets.remove(0)
    };

    for sorter in &query.sorters {
        let sort_key = if sorter.address.starts_with(crate::query::MEASURES_PREFIX) {
            sorter.address.clone()
        } else {
            dialect.member_name_sort_key(&sorter.address)
        };
        // First sorter innermost; later sorters wrap around it.
        set = dialect.order_set(&set, &sort_key, sorter.direction);
    }

    if limit > 0 {
        set = dialect.subset(&set, query.offset, limit);
    }

    Ok(set)
}

/// Decide how a dimension attribute's value reaches the result set: a
/// non-default property override becomes a calculated member (the member
/// set itself stays untouched); otherwise a differing alias is recorded for
/// back-mapping from the raw address.
fn register_projection(dialect: &dyn MdxDialect, attr: &AttributeSpec, state: &mut BuildState) {
    match Addressing::resolve(attr.address_property.as_deref()) {
        Addressing::Property(property) => {
            let name = dialect.calculated_member_name(&attr.alias);
            let definition = dialect.member_property_definition(&attr.address, property);
            state.register_calculated_member(name, definition, &attr.alias);
        }
        Addressing::Name | Addressing::Key => {
            if attr.address != attr.alias {
                state.register_alias(&attr.address, &attr.alias);
            }
        }
    }
}

/// WHERE slicers: every filter not consumed by the row axis, translated
/// individually. An empty result means no WHERE clause is emitted.
pub fn build_slicers(
    dialect: &dyn MdxDialect,
    query: &CubeQuery,
    state: &BuildState,
) -> Result<Vec<String>> {
    let mut slicers = Vec::new();
    for (idx, filter) in query.filters.iter().enumerate() {
        if state.is_on_axis(idx) {
            continue;
        }
        slicers.extend(members::member_expressions(dialect, filter)?);
    }
    Ok(slicers)
}
