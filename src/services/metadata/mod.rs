//! Bibliographic metadata from candidate ISBNs.
//!
//! A candidate is queried as-is first. Scanned 13-digit captures often carry a
//! misread prefix or wrap a legacy 10-digit number, so a miss on a longer
//! candidate is retried with its first ten characters.
//!
//! A response that reports a match but lacks the title, authors, or
//! thumbnail, or that lacks `totalItems` altogether, is a
//! [`MetadataError::MalformedResponse`]. It is never reported as "no match".

mod google_books;
mod types;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::MetaRecord;

pub use google_books::{parse_volumes_response, GoogleBooksClient};
pub use types::{ImageLinks, VolumeInfo, VolumeItem, VolumesResponse};

/// Length a longer candidate is cut to for the fallback query.
pub const SHORT_ISBN_LEN: usize = 10;

/// Errors from the lookup service.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Lookup service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed lookup response: {0}")]
    MalformedResponse(String),
}

/// Queries the bibliographic service for one ISBN string.
#[async_trait]
pub trait VolumeLookup: Send + Sync {
    async fn lookup(&self, isbn: &str) -> Result<VolumesResponse, MetadataError>;
}

/// Turns candidate ISBNs into metadata records.
pub struct MetadataResolver<'a> {
    lookup: &'a dyn VolumeLookup,
}

impl<'a> MetadataResolver<'a> {
    pub fn new(lookup: &'a dyn VolumeLookup) -> Self {
        Self { lookup }
    }

    /// Resolve one candidate, with the short-form fallback.
    pub async fn resolve(&self, candidate: &str) -> Result<Option<MetaRecord>, MetadataError> {
        let response = self.lookup.lookup(candidate).await?;
        if has_match(&response)? {
            return record_from(candidate, &response).map(Some);
        }

        if candidate.chars().count() > SHORT_ISBN_LEN {
            let short: String = candidate.chars().take(SHORT_ISBN_LEN).collect();
            tracing::debug!("No match for {}, retrying as {}", candidate, short);

            let response = self.lookup.lookup(&short).await?;
            if has_match(&response)? {
                return record_from(&short, &response).map(Some);
            }
        }

        Ok(None)
    }

    /// Try candidates in order and stop at the first match.
    pub async fn resolve_first(
        &self,
        candidates: &[String],
    ) -> Result<Option<MetaRecord>, MetadataError> {
        for candidate in candidates {
            if let Some(record) = self.resolve(candidate).await? {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }
}

fn has_match(response: &VolumesResponse) -> Result<bool, MetadataError> {
    response
        .total_items
        .map(|total| total > 0)
        .ok_or_else(|| MetadataError::MalformedResponse("missing totalItems".to_string()))
}

fn record_from(isbn: &str, response: &VolumesResponse) -> Result<MetaRecord, MetadataError> {
    let missing = |field: &str| MetadataError::MalformedResponse(format!("missing {}", field));

    let info = response
        .items
        .first()
        .ok_or_else(|| missing("items"))?
        .volume_info
        .as_ref()
        .ok_or_else(|| missing("volumeInfo"))?;

    Ok(MetaRecord {
        isbn: isbn.to_string(),
        title: info.title.clone().ok_or_else(|| missing("title"))?,
        authors: info.authors.clone().ok_or_else(|| missing("authors"))?,
        thumbnail_url: info
            .image_links
            .as_ref()
            .and_then(|links| links.thumbnail.clone())
            .ok_or_else(|| missing("imageLinks.thumbnail"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers from a fixed table and records every query.
    #[derive(Default)]
    struct ScriptedLookup {
        responses: HashMap<String, VolumesResponse>,
        queries: Mutex<Vec<String>>,
    }

    impl ScriptedLookup {
        fn with(mut self, isbn: &str, response: VolumesResponse) -> Self {
            self.responses.insert(isbn.to_string(), response);
            self
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VolumeLookup for ScriptedLookup {
        async fn lookup(&self, isbn: &str) -> Result<VolumesResponse, MetadataError> {
            self.queries.lock().unwrap().push(isbn.to_string());
            Ok(self
                .responses
                .get(isbn)
                .cloned()
                .unwrap_or_else(VolumesResponse::empty))
        }
    }

    #[tokio::test]
    async fn test_direct_match() {
        let lookup = ScriptedLookup::default().with(
            "0134685991",
            VolumesResponse::single("Effective Java", &["Joshua Bloch"], "http://t"),
        );
        let record = MetadataResolver::new(&lookup)
            .resolve("0134685991")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.isbn, "0134685991");
        assert_eq!(record.title, "Effective Java");
        assert_eq!(record.authors, vec!["Joshua Bloch"]);
        assert_eq!(record.thumbnail_url, "http://t");
        assert_eq!(lookup.queries(), vec!["0134685991"]);
    }

    #[tokio::test]
    async fn test_fallback_to_first_ten_characters() {
        let lookup = ScriptedLookup::default().with(
            "9780134685",
            VolumesResponse::single("Fallback", &["A", "B"], "http://f"),
        );
        let record = MetadataResolver::new(&lookup)
            .resolve("9780134685991")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.isbn, "9780134685");
        assert_eq!(record.title, "Fallback");
        assert_eq!(record.authors, vec!["A", "B"]);
        assert_eq!(lookup.queries(), vec!["9780134685991", "9780134685"]);
    }

    #[tokio::test]
    async fn test_ten_digit_miss_does_not_retry() {
        let lookup = ScriptedLookup::default();
        let result = MetadataResolver::new(&lookup)
            .resolve("0134685991")
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(lookup.queries(), vec!["0134685991"]);
    }

    #[tokio::test]
    async fn test_match_missing_fields_is_malformed() {
        let mut response = VolumesResponse::single("T", &["A"], "http://t");
        response.items[0].volume_info.as_mut().unwrap().image_links = None;
        let lookup = ScriptedLookup::default().with("0134685991", response);

        let err = MetadataResolver::new(&lookup)
            .resolve("0134685991")
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_missing_total_items_is_malformed() {
        let lookup = ScriptedLookup::default().with("0134685991", VolumesResponse::default());
        let err = MetadataResolver::new(&lookup)
            .resolve("0134685991")
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_resolve_first_stops_at_first_match() {
        let lookup = ScriptedLookup::default()
            .with(
                "1111111111",
                VolumesResponse::single("First", &["A"], "http://1"),
            )
            .with(
                "2222222222",
                VolumesResponse::single("Second", &["B"], "http://2"),
            );
        let candidates = vec![
            "0000000000".to_string(),
            "1111111111".to_string(),
            "2222222222".to_string(),
        ];
        let record = MetadataResolver::new(&lookup)
            .resolve_first(&candidates)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.title, "First");
        assert_eq!(lookup.queries(), vec!["0000000000", "1111111111"]);
    }
}
