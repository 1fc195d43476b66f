//! Microsoft Analysis Services dialect.

use super::MdxDialect;

/// The default dialect. SSAS semantics are what the trait's default bodies
/// encode, so nothing is overridden here.
#[derive(Debug, Default, Clone, Copy)]
pub struct SsasDialect;

impl MdxDialect for SsasDialect {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortDirection;

    #[test]
    fn member_selection_forms() {
        let d = SsasDialect;
        assert_eq!(
            d.member_by_name("[Customer].[Country]", "Germany"),
            "[Customer].[Country].[Germany]"
        );
        assert_eq!(
            d.member_by_key("[Customer].[Country]", "276"),
            "[Customer].[Country].&[276]"
        );
    }

    #[test]
    fn order_uses_hierarchy_breaking_keywords() {
        let d = SsasDialect;
        let ordered = d.order_set("{ s }", "[Measures].[Sales]", SortDirection::Desc);
        assert_eq!(ordered, "ORDER({ s }, [Measures].[Sales], BDESC)");
    }

    #[test]
    fn subset_windows_the_set() {
        let d = SsasDialect;
        assert_eq!(d.subset("{ s }", 20, 10), "SUBSET({ s }, 20, 10)");
    }
}
