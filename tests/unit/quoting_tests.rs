/*!
 * Tests for column-name quoting of generated SQL
 */

use lang2sql::translation::{quote, quote_with_order, QuoteOrder};

/// Every bare occurrence of a name must sit right after a double quote
fn all_occurrences_quoted(sql: &str, name: &str) -> bool {
    sql.match_indices(name)
        .all(|(i, _)| sql[..i].ends_with('"'))
}

#[test]
fn test_quote_withBareColumn_shouldWrapInDoubleQuotes() {
    assert_eq!(
        quote("SELECT date FROM table", &["date"]),
        "SELECT \"date\" FROM table"
    );
}

#[test]
fn test_quote_withAlreadyQuotedColumn_shouldLeaveUnchanged() {
    let sql = "SELECT \"date\" FROM table";
    assert_eq!(quote(sql, &["date"]), sql);
}

#[test]
fn test_quote_withSeveralColumns_shouldQuoteEach() {
    assert_eq!(
        quote("SELECT date, time, location FROM table", &["date", "time", "location"]),
        "SELECT \"date\", \"time\", \"location\" FROM table"
    );
}

#[test]
fn test_quote_withSingleQuoteBeforeFirstMatch_shouldSkipName() {
    // A string literal hides later bare occurrences too
    let sql = "SELECT * FROM t WHERE note = 'date' AND date > 1";
    assert_eq!(quote(sql, &["date"]), sql);
}

#[test]
fn test_quote_withUnquotedFirstMatch_shouldReplaceAllOccurrences() {
    assert_eq!(
        quote("SELECT date FROM t WHERE date > 'date'", &["date"]),
        "SELECT \"date\" FROM t WHERE \"date\" > '\"date\"'"
    );
}

#[test]
fn test_quote_withNameWithSpaces_shouldQuoteWholeName() {
    assert_eq!(
        quote(
            "SELECT Primary Type, COUNT(*) FROM chicago_crime GROUP BY Primary Type",
            &["Primary Type"]
        ),
        "SELECT \"Primary Type\", COUNT(*) FROM chicago_crime GROUP BY \"Primary Type\""
    );
}

#[test]
fn test_quote_withAbsentColumn_shouldLeaveUnchanged() {
    let sql = "SELECT COUNT(*) FROM chicago_crime";
    assert_eq!(quote(sql, &["District", "Arrest"]), sql);
}

#[test]
fn test_quote_withNoColumns_shouldLeaveUnchanged() {
    let none: [&str; 0] = [];
    assert_eq!(quote("SELECT 1", &none), "SELECT 1");
}

#[test]
fn test_quote_appliedTwice_shouldBeIdempotent() {
    let columns = ["date", "time", "location", "Primary Type"];
    let raw = "SELECT date, time FROM t WHERE location = 'X' AND Primary Type = 'THEFT'";

    let once = quote(raw, &columns);
    let twice = quote(&once, &columns);

    assert_eq!(once, twice);
}

#[test]
fn test_quote_withUnrelatedColumns_shouldQuoteEveryOccurrence() {
    let columns = ["District", "Arrest", "Beat"];
    let raw = "SELECT District, Beat FROM t WHERE Arrest = 1 AND District > Beat ORDER BY Arrest";

    let quoted = quote(raw, &columns);

    for name in columns {
        assert!(all_occurrences_quoted(&quoted, name), "{} left bare in {}", name, quoted);
    }
}

#[test]
fn test_quoteWithOrder_asGivenWithPrefixNameFirst_shouldSplitLongerName() {
    let columns = ["date", "date_of_birth"];
    let raw = "SELECT date, date_of_birth FROM people";

    assert_eq!(
        quote_with_order(raw, &columns, QuoteOrder::AsGiven),
        "SELECT \"date\", \"date\"_of_birth FROM people"
    );
}

#[test]
fn test_quoteWithOrder_longestFirstWithOnlyLongerName_shouldQuoteItWhole() {
    let columns = ["date", "date_of_birth"];
    let raw = "SELECT date_of_birth FROM people";

    assert_eq!(
        quote_with_order(raw, &columns, QuoteOrder::LongestFirst),
        "SELECT \"date_of_birth\" FROM people"
    );
    assert_eq!(
        quote_with_order(raw, &columns, QuoteOrder::AsGiven),
        "SELECT \"date\"_of_birth FROM people"
    );
}

#[test]
fn test_quoteWithOrder_longestFirstWithBothNames_shouldStillNestQuotes() {
    let columns = ["date", "date_of_birth"];
    let raw = "SELECT date, date_of_birth FROM people";

    assert_eq!(
        quote_with_order(raw, &columns, QuoteOrder::LongestFirst),
        "SELECT \"date\", \"\"date\"_of_birth\" FROM people"
    );
}

#[test]
fn test_quote_defaultOrder_shouldMatchAsGiven() {
    let columns = ["time", "timestamp"];
    let raw = "SELECT timestamp FROM t";
    assert_eq!(quote(raw, &columns), quote_with_order(raw, &columns, QuoteOrder::AsGiven));
    assert_eq!(QuoteOrder::default(), QuoteOrder::AsGiven);
}
