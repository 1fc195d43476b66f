//! Centralized literal escaping for statement assembly.
//!
//! Every quoting decision made while rendering MDX goes through this module
//! so there is exactly one place to audit. Raw member *addresses* supplied
//! by the caller (`[Customer].[Country]` etc.) are used verbatim; only
//! values that end up inside quotes or brackets are escaped here.

/// Escape a value placed inside a single-quoted MDX string literal.
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Escape a value placed inside a bracketed member segment, e.g.
/// `[Customer].[Country].[<value>]`. Closing brackets are doubled.
pub fn bracket_segment(value: &str) -> String {
    format!("[{}]", value.replace(']', "]]"))
}

/// Escape a value placed inside a double-quoted property name, e.g.
/// `PROPERTIES("<value>")`.
pub fn quote_property(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Strip characters that cannot appear in a synthesized member name.
pub fn sanitize_member_name(alias: &str) -> String {
    alias
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '\'' | '"'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_string_doubles_single_quotes() {
        assert_eq!(quote_string("O'Brien"), "'O''Brien'");
        assert_eq!(quote_string("plain"), "'plain'");
    }

    #[test]
    fn bracket_segment_doubles_closing_brackets() {
        assert_eq!(bracket_segment("a]b"), "[a]]b]");
        assert_eq!(bracket_segment("42"), "[42]");
    }

    #[test]
    fn sanitize_drops_bracket_and_quote_characters() {
        assert_eq!(sanitize_member_name("total [net]"), "total net");
        assert_eq!(sanitize_member_name("plain_alias"), "plain_alias");
    }
}
