//! Quoting helpers for the target dialect.

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Keywords that cannot appear as bare identifiers in a SELECT statement.
const RESERVED_KEYWORDS: &[&str] = &[
    "all", "and", "any", "as", "asc", "between", "by", "case", "cast", "desc", "distinct",
    "else", "end", "except", "false", "fetch", "for", "from", "group", "having", "in",
    "intersect", "is", "join", "like", "limit", "not", "null", "offset", "on", "or", "order",
    "qualify", "select", "then", "true", "union", "using", "when", "where", "window", "with",
];

/// Quote identifier with double quotes (ANSI style).
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_plain_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn is_reserved_keyword(ident: &str) -> bool {
    let lower = ident.to_ascii_lowercase();
    RESERVED_KEYWORDS.contains(&lower.as_str())
}

// =============================================================================
// String Quoting
// =============================================================================

/// Quote string with single quotes (standard SQL).
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
