//! Filter-to-member-expression translation.
//!
//! Each supported comparator is rewritten into an MDX member-selection or
//! FILTER expression. The addressing mode decides how a member literal is
//! formed: by name (default), by key (`&[...]`), or via an arbitrary member
//! property (only legal for the contains comparators).

use crate::dialect::MdxDialect;
use crate::error::{MdxError, Result};
use crate::escape;
use crate::query::{Comparator, FilterSpec};

/// How a filter addresses the members of its target hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing<'a> {
    Name,
    Key,
    Property(&'a str),
}

impl<'a> Addressing<'a> {
    /// `NAME` and `KEY` are recognized case-insensitively; any other value
    /// is treated as a member property and preserved verbatim.
    pub fn resolve(property: Option<&'a str>) -> Self {
        match property {
            None => Addressing::Name,
            Some(p) if p.eq_ignore_ascii_case("NAME") => Addressing::Name,
            Some(p) if p.eq_ignore_ascii_case("KEY") => Addressing::Key,
            Some(p) => Addressing::Property(p),
        }
    }
}

/// Translate one filter into its member expressions. The `in` comparator
/// produces one expression per delimited token; every other supported
/// comparator produces exactly one.
pub fn member_expressions(dialect: &dyn MdxDialect, filter: &FilterSpec) -> Result<Vec<String>> {
    let address = filter.address.as_str();
    let addressing = Addressing::resolve(filter.address_property.as_deref());
    let value = filter.compare_value.as_str();

    let expressions = match filter.comparator {
        Comparator::Is => vec![contains_expression(dialect, address, addressing, value, true)],
        Comparator::IsNot => vec![contains_expression(dialect, address, addressing, value, false)],
        Comparator::GreaterThan
        | Comparator::GreaterOrEqual
        | Comparator::LessThan
        | Comparator::LessOrEqual => {
            // The operator text is passed through literally; the compare
            // value is expected to be a numeric or date expression.
            let op = match filter.comparator {
                Comparator::GreaterThan => ">",
                Comparator::GreaterOrEqual => ">=",
                Comparator::LessThan => "<",
                Comparator::LessOrEqual => "<=",
                _ => unreachable!(),
            };
            vec![dialect.filter_set(address, &format!("{address} {op} {value}"))]
        }
        Comparator::Equals => vec![member_selection(dialect, filter, addressing, value)?],
        Comparator::In => {
            let mut selections = Vec::new();
            for token in value.split(filter.value_list_delimiter.as_str()) {
                selections.push(member_selection(dialect, filter, addressing, token)?);
            }
            selections
        }
        Comparator::NotEquals | Comparator::NotIn => {
            return Err(MdxError::UnsupportedComparator {
                comparator: filter.comparator.to_string(),
                address: filter.address.clone(),
            })
        }
    };

    Ok(expressions)
}

/// `FILTER(<addr>, Instr(<accessor>, '<val>') > 0)` — or `= 0` for the
/// negated form. Key addressing still compares against the member name;
/// only equals/in branch on the key.
fn contains_expression(
    dialect: &dyn MdxDialect,
    address: &str,
    addressing: Addressing<'_>,
    value: &str,
    positive: bool,
) -> String {
    let accessor = match addressing {
        Addressing::Name | Addressing::Key => dialect.current_member_accessor(address, None),
        Addressing::Property(p) => dialect.current_member_accessor(address, Some(p)),
    };
    let check = if positive { "> 0" } else { "= 0" };
    dialect.filter_set(
        address,
        &format!("Instr({accessor}, {}) {check}", escape::quote_string(value)),
    )
}

fn member_selection(
    dialect: &dyn MdxDialect,
    filter: &FilterSpec,
    addressing: Addressing<'_>,
    value: &str,
) -> Result<String> {
    match addressing {
        Addressing::Name => Ok(dialect.member_by_name(&filter.address, value)),
        Addressing::Key => Ok(dialect.member_by_key(&filter.address, value)),
        Addressing::Property(p) => Err(MdxError::UnsupportedPropertyFilter {
            address: filter.address.clone(),
            property: p.to_string(),
        }),
    }
}
