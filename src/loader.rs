use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::{PricesError, Result};
use crate::types::EventRecord;

/// Read a stream file, one record per line, in file order.
///
/// The file is closed before returning. Any unparseable line fails the whole
/// load.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<EventRecord>> {
    let path = path.as_ref();
    let io_err = |source| PricesError::Io { path: path.to_path_buf(), source };

    let file = File::open(path).map_err(io_err)?;
    let records = parse_records(BufReader::new(file)).map_err(|e| match e {
        PricesError::Io { source, .. } => io_err(source),
        other => other,
    })?;

    debug!(path = %path.display(), records = records.len(), "loaded stream file");
    Ok(records)
}

/// Parse line-delimited records from any buffered reader.
pub fn parse_records<R: BufRead>(reader: R) -> Result<Vec<EventRecord>> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| PricesError::Io { path: Default::default(), source })?;
        let record = serde_json::from_str(&line)
            .map_err(|source| PricesError::Parse { line: idx + 1, source })?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_order() {
        let input = "{\"pt\":3,\"mc\":[{}]}\n{\"pt\":1,\"mc\":[{}]}\n{\"pt\":2,\"mc\":[{}]}\n";
        let records = parse_records(input.as_bytes()).unwrap();
        let pts: Vec<i64> = records.iter().map(|r| r.pt).collect();
        assert_eq!(pts, vec![3, 1, 2]);
    }

    #[test]
    fn test_blank_line_is_fatal() {
        let input = "{\"pt\":1,\"mc\":[{}]}\n\n{\"pt\":2,\"mc\":[{}]}\n";
        match parse_records(input.as_bytes()) {
            Err(PricesError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_trailing_newline_is_not_a_record() {
        let input = "{\"pt\":1,\"mc\":[{}]}\n{\"pt\":2,\"mc\":[{}]}\n";
        assert_eq!(parse_records(input.as_bytes()).unwrap().len(), 2);
    }

    #[test]
    fn test_bad_line_is_fatal_with_line_number() {
        let input = "{\"pt\":1,\"mc\":[{}]}\nnot json\n{\"pt\":2,\"mc\":[{}]}\n";
        match parse_records(input.as_bytes()) {
            Err(PricesError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_mc_is_fatal() {
        let input = "{\"pt\":1}\n";
        assert!(matches!(parse_records(input.as_bytes()), Err(PricesError::Parse { line: 1, .. })));
    }

    #[test]
    fn test_missing_file() {
        let err = load_records("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, PricesError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
