//! Wire types for the volumes search response.
//!
//! Every field is optional here; the resolver decides which absences are
//! malformed.

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumesResponse {
    pub total_items: Option<u64>,
    #[serde(default)]
    pub items: Vec<VolumeItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeItem {
    pub volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub image_links: Option<ImageLinks>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ImageLinks {
    pub thumbnail: Option<String>,
}

impl VolumesResponse {
    /// A response reporting no matches.
    pub fn empty() -> Self {
        Self {
            total_items: Some(0),
            items: Vec::new(),
        }
    }

    /// A response with a single complete volume.
    pub fn single(title: &str, authors: &[&str], thumbnail: &str) -> Self {
        Self {
            total_items: Some(1),
            items: vec![VolumeItem {
                volume_info: Some(VolumeInfo {
                    title: Some(title.to_string()),
                    authors: Some(authors.iter().map(|a| a.to_string()).collect()),
                    image_links: Some(ImageLinks {
                        thumbnail: Some(thumbnail.to_string()),
                    }),
                }),
            }],
        }
    }
}
