//! Filter text parsing.

/// Comparison prefix of a filter token. `None` means a plain text token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MatchType {
    #[default]
    None,
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl MatchType {
    /// Two-character operators first so `>=` is not read as `>`.
    const PREFIXES: [(&'static str, MatchType); 6] = [
        ("<>", MatchType::NotEqual),
        (">=", MatchType::GreaterThanOrEqual),
        ("<=", MatchType::LessThanOrEqual),
        ("=", MatchType::Equal),
        (">", MatchType::GreaterThan),
        ("<", MatchType::LessThan),
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            MatchType::None => "",
            MatchType::Equal => "=",
            MatchType::NotEqual => "<>",
            MatchType::GreaterThan => ">",
            MatchType::GreaterThanOrEqual => ">=",
            MatchType::LessThan => "<",
            MatchType::LessThanOrEqual => "<=",
        }
    }

    pub fn is_threshold(self) -> bool {
        self != MatchType::None
    }
}

/// One parsed piece of filter text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterToken {
    pub match_type: MatchType,
    pub value: String,
}

impl FilterToken {
    pub fn text(value: impl Into<String>) -> Self {
        Self { match_type: MatchType::None, value: value.into() }
    }
}

/// Split off a leading comparison operator.
///
/// An operator with nothing after it is kept as text, so `>` alone searches
/// for a literal `>`.
pub fn parse_token(token: &str) -> FilterToken {
    let token = token.trim();
    for (prefix, match_type) in MatchType::PREFIXES {
        if let Some(rest) = token.strip_prefix(prefix) {
            let value = rest.trim();
            if value.is_empty() {
                break;
            }
            return FilterToken { match_type, value: value.to_string() };
        }
    }
    FilterToken::text(token)
}

/// Tokens of one column's filter text. Blank tokens are dropped.
pub fn split_tokens(text: &str, delimiter: Option<&str>) -> Vec<FilterToken> {
    let pieces: Vec<&str> = match delimiter {
        Some(delimiter) if !delimiter.is_empty() => text.split(delimiter).collect(),
        _ => vec![text],
    };
    pieces
        .into_iter()
        .filter(|piece| !piece.trim().is_empty())
        .map(parse_token)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operators() {
        let cases = [
            (">= 10", MatchType::GreaterThanOrEqual, "10"),
            ("<=3", MatchType::LessThanOrEqual, "3"),
            ("<>x", MatchType::NotEqual, "x"),
            ("=5", MatchType::Equal, "5"),
            ("> 1.5", MatchType::GreaterThan, "1.5"),
            ("<2024-01-01", MatchType::LessThan, "2024-01-01"),
            ("  plain ", MatchType::None, "plain"),
        ];
        for (input, match_type, value) in cases {
            assert_eq!(parse_token(input), FilterToken { match_type, value: value.to_string() }, "{input}");
        }
    }

    #[test]
    fn test_bare_operator_is_text() {
        assert_eq!(parse_token(">"), FilterToken::text(">"));
        assert_eq!(parse_token("<> "), FilterToken::text("<>"));
    }

    #[test]
    fn test_split_tokens() {
        let tokens = split_tokens("a, >3 ,, b", Some(","));
        assert_eq!(
            tokens,
            vec![
                FilterToken::text("a"),
                FilterToken { match_type: MatchType::GreaterThan, value: "3".into() },
                FilterToken::text("b"),
            ]
        );
        assert_eq!(split_tokens("a,b", None), vec![FilterToken::text("a,b")]);
        assert!(split_tokens("   ", None).is_empty());
    }
}
