//! Delimited-text (CSV/TSV) exports of the trade statistics sheet.
//!
//! WITS exports come in whatever encoding and separator the download tool
//! picked, so both are detected before the bytes reach the CSV reader.

use std::path::Path;

use crate::error::{LoadError, LoadResult};

use super::{Cell, RawTable};

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes using the specified encoding.
///
/// Unknown encodings and invalid UTF-8 fall back to lossy UTF-8. A leading
/// byte order mark is dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let codec = match encoding.to_lowercase().as_str() {
        // WHATWG maps latin-1 labels to windows-1252, a superset of it
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252
        }
        _ => encoding_rs::UTF_8,
    };
    codec.decode(bytes).0.into_owned()
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse decoded CSV content with an explicit delimiter.
///
/// Headers are trimmed, values are kept as written. Blank values become
/// [`Cell::Empty`]. Short rows are padded with empty cells, extra values are
/// ignored.
pub fn parse_table(content: &str, delimiter: char) -> LoadResult<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<Cell> = (0..headers.len())
            .map(|i| match record.get(i) {
                Some(value) if !value.trim().is_empty() => Cell::Text(value.to_string()),
                _ => Cell::Empty,
            })
            .collect();

        if row.iter().all(|c| matches!(c, Cell::Empty)) {
            continue;
        }
        rows.push(row);
    }

    Ok(RawTable {
        headers,
        rows,
        encoding: None,
        delimiter: Some(delimiter),
    })
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> LoadResult<RawTable> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);

    let mut table = parse_table(&content, delimiter)?;
    table.encoding = Some(encoding);
    Ok(table)
}

/// Read a CSV file with auto-detection of encoding and delimiter.
pub fn read_csv_file(path: &Path) -> LoadResult<RawTable> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(LoadError::EmptySource(path.to_path_buf()));
    }

    parse_bytes_auto(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_table() {
        let table = parse_table("Reporter;Partner\nAustria;Germany\nAustria;Italy", ';').unwrap();

        assert_eq!(table.headers, vec!["Reporter", "Partner"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][1], Cell::Text("Italy".into()));
    }

    #[test]
    fn test_quoted_values_keep_commas() {
        let csv = "Reporter,Partner,Quantity\nAustria,\"Korea, Rep.\",12";
        let table = parse_table(csv, ',').unwrap();

        assert_eq!(table.rows[0][1], Cell::Text("Korea, Rep.".into()));
        assert_eq!(table.rows[0][2], Cell::Text("12".into()));
    }

    #[test]
    fn test_missing_values_are_empty_cells() {
        let table = parse_table("a;b;c\n1;;3\n4", ';').unwrap();

        assert_eq!(table.rows[0][1], Cell::Empty);
        assert_eq!(table.rows[1][0], Cell::Text("4".into()));
        assert_eq!(table.rows[1][2], Cell::Empty);
    }

    #[test]
    fn test_blank_rows_skipped() {
        let table = parse_table("a;b\n1;2\n;\n3;4\n", ';').unwrap();
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_headers_trimmed_values_kept() {
        let table = parse_table("a , b\n Export ,  \n", ',').unwrap();
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.rows[0][0], Cell::Text(" Export ".into()));
        assert_eq!(table.rows[0][1], Cell::Empty);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
    }

    #[test]
    fn test_auto_parse_reports_encoding() {
        let csv = "Reporter;Partner\nAustria;Germany";
        let table = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(table.delimiter, Some(';'));
        assert_eq!(table.encoding.as_deref(), Some("utf-8"));
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Côte" in ISO-8859-1
        let bytes: &[u8] = &[0x43, 0xF4, 0x74, 0x65];
        assert_eq!(decode_content(bytes, "iso-8859-1"), "Côte");
    }

    #[test]
    fn test_latin1_keeps_currency_sign() {
        // 0xA4 is the generic currency sign in ISO-8859-1 (the euro sign in -15)
        assert_eq!(decode_content(&[0xA4], "iso-8859-1"), "\u{a4}");
        assert_eq!(decode_content(&[0x80], "windows-1252"), "\u{20ac}");
    }

    #[test]
    fn test_utf8_bom_dropped() {
        let bytes = b"\xEF\xBB\xBFReporter,Partner\nAustria,Germany";
        let table = parse_bytes_auto(bytes).unwrap();
        assert_eq!(table.headers[0], "Reporter");
    }
}
