use serde::Serialize;

use crate::errors::AppError;

pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// Image carousel of a restaurant detail page.
#[derive(Debug, Clone, PartialEq)]
pub struct Gallery {
    images: Vec<String>,
    selected: usize,
}

impl Gallery {
    pub fn new(images: &[String]) -> Self {
        Self {
            images: images.to_vec(),
            selected: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn current(&self) -> &str {
        self.images
            .get(self.selected)
            .map(String::as_str)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(PLACEHOLDER_IMAGE)
    }

    pub fn next(&mut self) {
        if !self.images.is_empty() {
            self.selected = (self.selected + 1) % self.images.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.images.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.images.len() - 1);
        }
    }

    pub fn select(&mut self, index: usize) -> Result<(), AppError> {
        if index >= self.images.len() {
            return Err(AppError::BadRequest(format!(
                "Image {index} out of range ({} images)",
                self.images.len()
            )));
        }

        self.selected = index;
        Ok(())
    }

    /// 1-based position of the selected image and the total, as shown in the
    /// "2 / 5" counter. `(0, 0)` for an empty gallery.
    pub fn position(&self) -> (usize, usize) {
        if self.images.is_empty() {
            (0, 0)
        } else {
            (self.selected + 1, self.images.len())
        }
    }
}

/// Serializable gallery state for the detail endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryView {
    pub cover: String,
    pub images: Vec<String>,
    pub position: usize,
    pub total: usize,
}

impl From<&Gallery> for GalleryView {
    fn from(gallery: &Gallery) -> Self {
        let (position, total) = gallery.position();
        Self {
            cover: gallery.current().to_string(),
            images: gallery
                .images
                .iter()
                .map(|url| {
                    if url.trim().is_empty() {
                        PLACEHOLDER_IMAGE.to_string()
                    } else {
                        url.clone()
                    }
                })
                .collect(),
            position,
            total,
        }
    }
}
