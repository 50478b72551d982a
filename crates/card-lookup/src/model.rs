//! Wire records returned by the two lookup services.

use crate::error::LookupError;
use crate::Result;
use serde::{Deserialize, Serialize};

/// One hit from the search-by-name service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCandidate {
    /// Edition (set) label as printed by the search service
    pub edition: String,
    /// Identifier understood by the detail service
    pub scryfall_id: String,
}

/// Image renditions of a card or card face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUris {
    pub normal: String,
}

/// One face of a multi-faced card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFace {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
}

/// Full card record from the detail service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
    #[serde(default)]
    pub card_faces: Option<Vec<CardFace>>,
}

impl CardRecord {
    /// Whether every face carries its own image (transform / modal cards).
    pub fn is_double_faced(&self) -> bool {
        match &self.card_faces {
            Some(faces) => !faces.is_empty() && faces.iter().all(|f| f.image_uris.is_some()),
            None => false,
        }
    }

    /// Image URIs to display for this card: one per face for double-faced
    /// cards, otherwise the single top-level image.
    ///
    /// Split and flip cards list faces but share one top-level image, so the
    /// per-face branch is only taken when every face has its own rendition.
    pub fn normal_image_uris(&self) -> Result<Vec<String>> {
        if self.is_double_faced() {
            let faces = self.card_faces.as_deref().unwrap_or_default();
            return Ok(faces
                .iter()
                .filter_map(|f| f.image_uris.as_ref())
                .map(|u| u.normal.clone())
                .collect());
        }

        match &self.image_uris {
            Some(uris) => Ok(vec![uris.normal.clone()]),
            None => Err(LookupError::MissingImage(self.id.clone())),
        }
    }
}
