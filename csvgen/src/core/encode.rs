//! CSV encoding of validated rows.

use std::io;

use csv::{QuoteStyle, WriterBuilder};
use serde_json::Value;

use crate::core::request::Rows;

/// String form of a single cell.
///
/// Strings are written verbatim, `null` becomes an empty field, and every
/// other value uses its compact JSON text (`30`, `true`, `[1,2]`).
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Encode rows as CSV bytes.
///
/// Fields containing a delimiter, quote, or line break are enclosed in double
/// quotes with internal quotes doubled. Rows may differ in length. Every
/// record, including the last, ends with `\n`.
///
/// An empty row is written as a single empty quoted field (`""`), so it reads
/// back as one empty string rather than as zero fields.
pub fn encode_csv(rows: &Rows) -> io::Result<Vec<u8>> {
    let mut wtr = WriterBuilder::new()
        .flexible(true)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    for row in rows {
        wtr.write_record(row.iter().map(stringify))?;
    }

    wtr.into_inner().map_err(|err| err.into_error())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Rows {
        value
            .as_array()
            .expect("array")
            .iter()
            .map(|row| row.as_array().expect("row").clone())
            .collect()
    }

    fn parse_back(bytes: &[u8]) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes)
            .records()
            .map(|record| {
                record
                    .expect("record")
                    .iter()
                    .map(str::to_string)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn writes_header_then_rows_with_quoting() {
        let input = rows(json!([["name", "age"], ["Alice", "30"], ["Bob, Jr.", "25"]]));
        let bytes = encode_csv(&input).expect("encode");
        assert_eq!(
            String::from_utf8(bytes).expect("utf8"),
            "name,age\nAlice,30\n\"Bob, Jr.\",25\n"
        );
    }

    #[test]
    fn escapes_quotes_and_newlines() {
        let input = rows(json!([["say \"hi\"", "line1\nline2", "cr\r"]]));
        let bytes = encode_csv(&input).expect("encode");
        assert_eq!(
            String::from_utf8(bytes.clone()).expect("utf8"),
            "\"say \"\"hi\"\"\",\"line1\nline2\",\"cr\r\"\n"
        );
        assert_eq!(
            parse_back(&bytes),
            vec![vec!["say \"hi\"", "line1\nline2", "cr\r"]]
        );
    }

    #[test]
    fn parsed_output_matches_stringified_input() {
        let input = rows(json!([
            ["id", "label", "score", "ok", "note"],
            [1, "a,b", 2.5, true, null],
            [2, "\"quoted\"", -3, false, "multi\nline"],
            ["ragged"],
        ]));
        let bytes = encode_csv(&input).expect("encode");
        let expected: Vec<Vec<String>> = input
            .iter()
            .map(|row| row.iter().map(stringify).collect())
            .collect();
        assert_eq!(parse_back(&bytes), expected);
    }

    #[test]
    fn empty_row_reads_back_as_one_empty_field() {
        let input = rows(json!([["a"], [], ["b"]]));
        let bytes = encode_csv(&input).expect("encode");
        assert_eq!(String::from_utf8(bytes.clone()).expect("utf8"), "a\n\"\"\nb\n");
        assert_eq!(parse_back(&bytes), vec![vec!["a"], vec![""], vec!["b"]]);
    }

    #[test]
    fn stringifies_non_string_values() {
        assert_eq!(stringify(&json!("x")), "x");
        assert_eq!(stringify(&json!(30)), "30");
        assert_eq!(stringify(&json!(1.5)), "1.5");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&Value::Null), "");
        assert_eq!(stringify(&json!([1, "a"])), "[1,\"a\"]");
        assert_eq!(stringify(&json!({"k": 1})), "{\"k\":1}");
    }
}
