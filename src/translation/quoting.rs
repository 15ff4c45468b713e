/*!
 * Identifier quoting for model-generated SQL.
 *
 * Models routinely emit column names bare, which breaks as soon as a name is a
 * reserved word (`date`, `time`) or contains spaces (`Primary Type`). This pass
 * wraps known column names in double quotes.
 *
 * It is a substring heuristic, not a SQL tokenizer:
 * - only the first occurrence of a name decides whether it is already quoted
 *   (preceded by `'` or `"`);
 * - when quoting applies, every occurrence of the name is replaced, including
 *   ones inside longer identifiers, string literals and comments;
 * - names are processed in order, so when one name is a substring of another
 *   the outcome depends on that order (see [`QuoteOrder`]).
 */

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Order in which column names are applied by [`quote_with_order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteOrder {
    /// Schema order, exactly as supplied
    #[default]
    AsGiven,
    /// Longest names first; names of equal length keep schema order
    LongestFirst,
}

/// Quote column names in schema order.
pub fn quote<S: AsRef<str>>(raw_completion: &str, column_names: &[S]) -> String {
    quote_with_order(raw_completion, column_names, QuoteOrder::AsGiven)
}

/// Quote column names, applying them in the given order.
pub fn quote_with_order<S: AsRef<str>>(
    raw_completion: &str,
    column_names: &[S],
    order: QuoteOrder,
) -> String {
    let mut names: Vec<&str> = column_names.iter().map(AsRef::as_ref).collect();
    if order == QuoteOrder::LongestFirst {
        names.sort_by(|a, b| b.len().cmp(&a.len()));
    }

    let mut sql = Cow::Borrowed(raw_completion);
    for name in names {
        if let Some(quoted) = quote_one(&sql, name) {
            sql = Cow::Owned(quoted);
        }
    }
    sql.into_owned()
}

/// Quote a single name; `None` when the text is left unchanged.
fn quote_one(sql: &str, name: &str) -> Option<String> {
    // An empty name matches everywhere.
    if name.is_empty() {
        return None;
    }

    let start = sql.find(name)?;
    if is_quote_before(sql, start) {
        return None;
    }

    Some(sql.replace(name, &format!("\"{}\"", name)))
}

fn is_quote_before(sql: &str, index: usize) -> bool {
    matches!(sql[..index].chars().next_back(), Some('"') | Some('\''))
}
