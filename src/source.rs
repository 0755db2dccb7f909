//! Where the raw sheet bytes come from.
//!
//! A locator is either a direct CSV export URL or a spreadsheet "edit" URL,
//! which is rewritten to the export endpoint of the same host.

use crate::config::DEFAULT_FETCH_TIMEOUT;
use crate::error::LoadError;
use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

/// Anything that can turn a resolved locator into CSV text.
pub trait SheetSource {
    /// Resolve a user-facing locator into the address `fetch` expects.
    fn resolve(&self, locator: &str) -> Result<String, LoadError>;

    /// Read the whole CSV body. A single attempt, no retries.
    fn fetch(&self, resolved: &str) -> Result<String, LoadError>;
}

/// Turn an edit URL into its CSV export URL; direct URLs pass through.
///
/// `https://host/spreadsheets/d/<id>/edit?usp=sharing` becomes
/// `https://host/spreadsheets/d/<id>/export?format=csv`.
pub fn resolve_locator(locator: &str) -> Result<String, LoadError> {
    let locator = locator.trim();
    let url = Url::parse(locator)
        .map_err(|e| LoadError::InvalidLocator(format!("{}: {}", locator, e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(LoadError::InvalidLocator(format!(
            "{}: expected an http(s) URL",
            locator
        )));
    }

    if !locator.contains("/edit") {
        return Ok(locator.to_string());
    }

    let (prefix, rest) = locator
        .split_once("/d/")
        .ok_or_else(|| LoadError::InvalidLocator(format!("{}: missing /d/<id> segment", locator)))?;
    let sheet_id = match rest.split_once('/') {
        Some((id, _)) if !id.is_empty() => id,
        _ => {
            return Err(LoadError::InvalidLocator(format!(
                "{}: missing sheet id after /d/",
                locator
            )))
        }
    };
    let export = format!("{}/d/{}/export?format=csv", prefix, sheet_id);
    debug!("Rewrote edit URL to {}", export);
    Ok(export)
}

/// Fetches the sheet over HTTP(S).
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// `None` uses `DEFAULT_FETCH_TIMEOUT`.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, LoadError> {
        let timeout = timeout.unwrap_or(DEFAULT_FETCH_TIMEOUT);
        debug!("HTTP fetch timeout {:?}", timeout);
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl SheetSource for HttpSource {
    fn resolve(&self, locator: &str) -> Result<String, LoadError> {
        resolve_locator(locator)
    }

    fn fetch(&self, resolved: &str) -> Result<String, LoadError> {
        info!("Fetching sheet from {}", resolved);
        let response = self.client.get(resolved).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::fetch(format!("HTTP {} from {}", status, resolved)));
        }
        Ok(response.text()?)
    }
}

/// Reads a CSV snapshot from disk; the locator is a file path.
pub struct FileSource;

impl SheetSource for FileSource {
    fn resolve(&self, locator: &str) -> Result<String, LoadError> {
        let path = locator.trim();
        if path.is_empty() {
            return Err(LoadError::InvalidLocator("empty file path".to_string()));
        }
        Ok(path.to_string())
    }

    fn fetch(&self, resolved: &str) -> Result<String, LoadError> {
        info!("Reading sheet from {}", resolved);
        let path = PathBuf::from(resolved);
        std::fs::read_to_string(&path)
            .map_err(|e| LoadError::fetch(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_url_is_rewritten() {
        let url = "https://docs.google.com/spreadsheets/d/abc123/edit?usp=sharing";
        assert_eq!(
            resolve_locator(url).unwrap(),
            "https://docs.google.com/spreadsheets/d/abc123/export?format=csv"
        );
    }

    #[test]
    fn test_direct_url_passes_through() {
        let url = "https://docs.google.com/spreadsheets/d/e/XYZ/pub?output=csv";
        assert_eq!(resolve_locator(url).unwrap(), url);
    }

    #[test]
    fn test_malformed_locators() {
        for bad in [
            "not a url",
            "ftp://example.com/sheet.csv",
            "https://docs.google.com/spreadsheets/edit",
            "https://docs.google.com/spreadsheets/d//edit",
        ] {
            assert!(
                matches!(resolve_locator(bad), Err(LoadError::InvalidLocator(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_file_source_rejects_empty_path() {
        assert!(matches!(
            FileSource.resolve("  "),
            Err(LoadError::InvalidLocator(_))
        ));
    }
}
