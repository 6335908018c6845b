//! Spreadsheet source access.

use deck_core::{parse_sheet_payload, Fetcher, RawTable, Result};
use std::path::Path;

/// Reads the product table from the sheet endpoint (`GET {endpoint}?range=...`).
pub struct SheetClient<'a> {
    fetcher: &'a dyn Fetcher,
    endpoint: String,
}

impl<'a> SheetClient<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, endpoint: impl Into<String>) -> Self {
        Self {
            fetcher,
            endpoint: endpoint.into(),
        }
    }

    pub fn range_url(&self, range: &str) -> String {
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{}range={}",
            self.endpoint,
            separator,
            urlencoding::encode(range)
        )
    }

    /// Fetch one range. Any failure here blocks the catalog, so it is returned as is.
    pub fn fetch_table(&self, range: &str) -> Result<RawTable> {
        let url = self.range_url(range);
        log::debug!("Fetching sheet range {}", url);
        let resource = self.fetcher.fetch(&url)?;
        let table = parse_sheet_payload(&resource.bytes)?;
        log::debug!("Sheet returned {} rows", table.len());
        Ok(table)
    }
}

/// Load a table saved from the sheet endpoint (same JSON shapes).
pub fn load_table_file(path: &Path) -> Result<RawTable> {
    let bytes = std::fs::read(path)?;
    parse_sheet_payload(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::{Error, FetchedResource};
    use std::cell::RefCell;
    use std::io::Write;

    struct RecordingFetcher {
        body: &'static [u8],
        last_url: RefCell<Option<String>>,
    }

    impl Fetcher for RecordingFetcher {
        fn fetch(&self, url: &str) -> Result<FetchedResource> {
            *self.last_url.borrow_mut() = Some(url.to_string());
            if self.body.is_empty() {
                return Err(Error::Upstream {
                    url: url.to_string(),
                    status: 403,
                });
            }
            Ok(FetchedResource::new(
                Some("application/json".to_string()),
                self.body.to_vec(),
            ))
        }
    }

    #[test]
    fn test_fetch_table_encodes_range() {
        let fetcher = RecordingFetcher {
            body: br#"{"values":[["SKU","Name"],["A1","Lamp"]]}"#,
            last_url: RefCell::new(None),
        };
        let client = SheetClient::new(&fetcher, "https://deck.example.com/sheet-data");
        let table = client.fetch_table("Products!A1:Z1000").unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(
            fetcher.last_url.borrow().as_deref(),
            Some("https://deck.example.com/sheet-data?range=Products%21A1%3AZ1000")
        );
    }

    #[test]
    fn test_upstream_failure_propagates() {
        let fetcher = RecordingFetcher {
            body: b"",
            last_url: RefCell::new(None),
        };
        let result = SheetClient::new(&fetcher, "/sheet-data").fetch_table("A1:B2");
        assert!(matches!(result, Err(Error::Upstream { status: 403, .. })));
    }

    #[test]
    fn test_range_url_appends_to_existing_query() {
        let fetcher = RecordingFetcher {
            body: b"[]",
            last_url: RefCell::new(None),
        };
        let client = SheetClient::new(&fetcher, "/sheet-data?sheet=main");
        assert_eq!(client.range_url("A1:B2"), "/sheet-data?sheet=main&range=A1%3AB2");
    }

    #[test]
    fn test_load_table_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"[["SKU"],["A1"]]"#).unwrap();
        let table = load_table_file(file.path()).unwrap();
        assert_eq!(table, vec![vec!["SKU".to_string()], vec!["A1".to_string()]]);
    }
}
