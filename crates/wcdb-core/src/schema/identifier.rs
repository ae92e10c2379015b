//! Case-normalized column identifiers.

use std::fmt;
use std::sync::Arc;

/// Name of a schema column.
///
/// Unquoted CQL names are folded to lower case; quoted names keep their case.
/// The identifier is cheap to clone and is shared by every constraint bound
/// to the column.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnIdentifier {
    text: Arc<str>,
}

impl ColumnIdentifier {
    /// Create an identifier from internal text.
    ///
    /// When `keep_case` is false the text is lower-cased, matching how an
    /// unquoted name is interpreted.
    pub fn new(text: &str, keep_case: bool) -> Self {
        let text: Arc<str> = if keep_case {
            Arc::from(text)
        } else {
            Arc::from(text.to_lowercase())
        };
        Self { text }
    }

    /// Interpret a name as written in CQL.
    ///
    /// `"MyCol"` keeps its case (with `""` unescaped to `"`), `MyCol` becomes
    /// `mycol`.
    pub fn from_cql(cql: &str) -> Self {
        match cql
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
        {
            Some(inner) if cql.len() >= 2 => Self::new(&inner.replace("\"\"", "\""), true),
            _ => Self::new(cql, false),
        }
    }

    /// Internal text of the identifier.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Canonical CQL text of the identifier.
    ///
    /// Names that read back unchanged when unquoted are emitted bare,
    /// everything else is double-quoted.
    pub fn to_cql_string(&self) -> String {
        if Self::is_unquoted_safe(&self.text) {
            self.text.to_string()
        } else {
            format!("\"{}\"", self.text.replace('"', "\"\""))
        }
    }

    fn is_unquoted_safe(text: &str) -> bool {
        let mut chars = text.chars();
        match chars.next() {
            Some(c) if c.is_ascii_lowercase() => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    }
}

impl fmt::Display for ColumnIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for ColumnIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ColumnIdentifier({:?})", &*self.text)
    }
}

impl From<&str> for ColumnIdentifier {
    fn from(cql: &str) -> Self {
        Self::from_cql(cql)
    }
}
