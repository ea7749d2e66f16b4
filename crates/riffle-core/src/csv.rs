//! CSV parsing for Riffle.
//!
//! Converts raw delimited text into a [`RecordSet`]. The parser is a pure
//! function: no I/O, no shared state, deterministic output for equal input.
//!
//! ## Format limitation
//!
//! Lines are split naively on the field delimiter. Quoting and escaping are
//! **not** supported: a quoted value containing the delimiter will be split
//! apart. This is an intentional, documented limitation of the format, not
//! a bug to fix silently.
//!
//! ## Row shape policy
//!
//! The header line determines the shape of every record:
//!
//! - Rows with fewer values than the header are padded with empty strings.
//! - Rows with more values than the header have the extra values dropped.
//! - Empty lines are skipped.

use crate::error::{Result, RiffleError};
use crate::types::{Record, RecordId, RecordSet};
use tracing::debug;

/// The default field delimiter
pub const DEFAULT_DELIMITER: char = ',';

/// Parse raw CSV text into a record set.
///
/// The first line is the header; its fields are kept as literal strings
/// (no trimming or unescaping beyond delimiter splitting). Each subsequent
/// non-empty line becomes one record, padded or truncated to the header
/// width. Records are assigned sequential [`RecordId`]s in row order.
///
/// Fails with [`RiffleError::MissingHeader`] when the input is empty or the
/// header line is blank. Over any other well-formed text this is a total
/// function.
///
/// # Example
/// ```
/// use riffle_core::csv::{parse, DEFAULT_DELIMITER};
///
/// let set = parse("name,age\nAlice,30\nBob,25", DEFAULT_DELIMITER).unwrap();
/// assert_eq!(set.fields, vec!["name", "age"]);
/// assert_eq!(set.len(), 2);
/// ```
pub fn parse(raw: &str, delimiter: char) -> Result<RecordSet> {
    // `str::lines` splits on both `\n` and `\r\n`, so CRLF input needs no
    // special handling.
    let mut lines = raw.lines();

    let header_line = lines
        .next()
        .ok_or_else(|| RiffleError::missing_header("input is empty"))?;

    if header_line.trim().is_empty() {
        return Err(RiffleError::missing_header("header line is blank"));
    }

    let fields = split_line(header_line, delimiter);
    let width = fields.len();

    let mut records = Vec::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }

        let mut values = split_line(line, delimiter);
        values.resize(width, String::new());

        let id = RecordId::new(records.len() as u64);
        records.push(Record::new(id, values));
    }

    debug!(
        fields = width,
        records = records.len(),
        "Parsed CSV input"
    );

    Ok(RecordSet::new(fields, records))
}

/// Split one line into owned values on the delimiter.
fn split_line(line: &str, delimiter: char) -> Vec<String> {
    line.split(delimiter).map(str::to_string).collect()
}
