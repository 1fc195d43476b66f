//! Mutable accumulation state for one statement build.
//!
//! The state is an explicit value owned by the builder and discarded after
//! one `build_select` call, so concurrent builds can never observe each
//! other.

use std::collections::{BTreeMap, HashSet};

/// Physical result-column name to the output aliases that must receive a
/// copy of that column's value.
pub type ResultAliasMap = BTreeMap<String, Vec<String>>;

/// A WITH-clause member synthesized for a property projection.
#[derive(Debug, Clone)]
pub struct CalculatedMember {
    pub name: String,
    pub definition: String,
    /// Output alias the member's result column maps back to.
    pub alias: String,
}

#[derive(Debug, Default)]
pub struct BuildState {
    /// Indices into the query's filter list already consumed by the row
    /// axis, so the WHERE pass does not re-apply them as slicers.
    filters_on_axes: HashSet<usize>,
    /// Insertion-ordered; a repeated name overwrites its definition in place.
    calculated_members: Vec<CalculatedMember>,
    alias_map: ResultAliasMap,
}

impl BuildState {
    pub fn mark_on_axis(&mut self, filter_index: usize) {
        self.filters_on_axes.insert(filter_index);
    }

    pub fn is_on_axis(&self, filter_index: usize) -> bool {
        self.filters_on_axes.contains(&filter_index)
    }

    /// Last definition for a given name wins; the member keeps its original
    /// position in the WITH clause.
    pub fn register_calculated_member(
        &mut self,
        name: impl Into<String>,
        definition: impl Into<String>,
        alias: impl Into<String>,
    ) {
        let member = CalculatedMember {
            name: name.into(),
            definition: definition.into(),
            alias: alias.into(),
        };
        if let Some(existing) = self
            .calculated_members
            .iter_mut()
            .find(|m| m.name == member.name)
        {
            *existing = member;
        } else {
            self.calculated_members.push(member);
        }
    }

    pub fn calculated_members(&self) -> &[CalculatedMember] {
        &self.calculated_members
    }

    /// Record that the value of `physical` must be copied to `alias` in
    /// every output row.
    pub fn register_alias(&mut self, physical: impl Into<String>, alias: impl Into<String>) {
        let alias = alias.into();
        let aliases = self.alias_map.entry(physical.into()).or_default();
        if !aliases.contains(&alias) {
            aliases.push(alias);
        }
    }

    pub fn into_alias_map(self) -> ResultAliasMap {
        self.alias_map
    }
}
