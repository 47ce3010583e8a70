// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gallery manifest: the ordered list of images and captions.

use core::fmt;

use serde::{Deserialize, Serialize};

/// One gallery entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestItem {
    /// Image reference handed to the host's image loader.
    #[serde(rename = "img", alias = "src")]
    pub image: String,
    /// Caption shown under the tile and in the lightbox.
    #[serde(default)]
    pub caption: String,
}

impl ManifestItem {
    /// Creates an item.
    pub fn new(image: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            caption: caption.into(),
        }
    }
}

/// Error returned when a manifest cannot be parsed.
#[derive(Debug)]
pub struct ManifestError {
    source: serde_json::Error,
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed gallery manifest: {}", self.source)
    }
}

impl core::error::Error for ManifestError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Ordered gallery items. Order defines the row-major grid position.
///
/// ```
/// use understory_gallery::Manifest;
///
/// let manifest = Manifest::from_json(r#"[
///     {"img": "assets/images/owl.webp", "caption": "Owl"},
///     {"img": "assets/images/fox.webp", "caption": "Fox"}
/// ]"#).unwrap();
/// assert_eq!(manifest.len(), 2);
/// assert_eq!(manifest.get(1).unwrap().caption, "Fox");
///
/// // Garbage degrades to an empty gallery.
/// assert!(Manifest::from_json_or_empty("{not json").is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    items: Vec<ManifestItem>,
}

impl Manifest {
    /// Creates a manifest from items.
    #[must_use]
    pub fn new(items: Vec<ManifestItem>) -> Self {
        Self { items }
    }

    /// Parses a JSON array of `{"img": ..., "caption": ...}` objects.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        let items = serde_json::from_str(json).map_err(|source| ManifestError { source })?;
        Ok(Self { items })
    }

    /// Parses like [`Manifest::from_json`], logging failures and falling back
    /// to an empty manifest.
    #[must_use]
    pub fn from_json_or_empty(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(manifest) => manifest,
            Err(err) => {
                tracing::error!(error = %err, "failed to load gallery manifest; showing an empty grid");
                Self::default()
            }
        }
    }

    /// All items in grid order.
    #[must_use]
    pub fn items(&self) -> &[ManifestItem] {
        &self.items
    }

    /// Item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ManifestItem> {
        self.items.get(index)
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<ManifestItem> for Manifest {
    fn from_iter<I: IntoIterator<Item = ManifestItem>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
