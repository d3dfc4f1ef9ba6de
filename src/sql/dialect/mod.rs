//! Rendering rules for the target SQL dialect (DuckDB-flavoured ANSI).
//!
//! - Identifiers are emitted bare when they are plain and not reserved,
//!   otherwise double-quoted with `"` doubled.
//! - References (`schema.table`, `table.column`) quote each `.` segment.
//! - String literals are single-quoted with `'` doubled.
//! - Bind parameters are positional: `$1`, `$2`, ...

pub mod helpers;

/// Render a single identifier (an alias, a table, a column).
pub fn quote_identifier(ident: &str) -> String {
    if helpers::is_plain_identifier(ident) && !helpers::is_reserved_keyword(ident) {
        ident.to_string()
    } else {
        helpers::quote_double(ident)
    }
}

/// Render a dotted reference, quoting each segment as needed.
pub fn quote_reference(path: &str) -> String {
    path.split('.')
        .map(quote_identifier)
        .collect::<Vec<_>>()
        .join(".")
}

pub fn quote_string(s: &str) -> String {
    helpers::quote_string_single(s)
}

/// Positional placeholder for the 1-based parameter `index`.
pub fn placeholder(index: usize) -> String {
    format!("${}", index)
}
