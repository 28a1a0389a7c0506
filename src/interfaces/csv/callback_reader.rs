use crate::error::{GatewayError, Result};
use serde::Deserialize;
use std::io::Read;

/// One gateway notification as captured from the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CapturedCallback {
    pub data: String,
    pub signature: String,
}

/// Reads captured callbacks from a CSV source with `data,signature` columns.
///
/// Wraps `csv::Reader` and yields one `Result` per row, so a damaged row does
/// not stop the rest of the file from being replayed.
pub struct CallbackReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CallbackReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes rows.
    pub fn callbacks(self) -> impl Iterator<Item = Result<CapturedCallback>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(GatewayError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_valid_stream() {
        let data = "data, signature\neyJhIjoxfQ==, c2lnMQ==\neyJiIjoyfQ==, c2lnMg==";
        let reader = CallbackReader::new(data.as_bytes());
        let results: Vec<Result<CapturedCallback>> = reader.callbacks().collect();

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.data, "eyJhIjoxfQ==");
        assert_eq!(first.signature, "c2lnMQ==");
    }

    #[test]
    fn test_reader_short_row() {
        let data = "data, signature\neyJhIjoxfQ==\neyJiIjoyfQ==, c2lnMg==";
        let reader = CallbackReader::new(data.as_bytes());
        let results: Vec<Result<CapturedCallback>> = reader.callbacks().collect();

        assert!(results[0].is_err());
        assert!(results[1].is_ok());
    }
}
