//! Image references and image metadata.

use serde::{Deserialize, Serialize};

/// Minimal reference to a stored image, as embedded in graph nodes and
/// invocation results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
    pub image_name: String,
}

impl ImageRef {
    pub fn new(image_name: impl Into<String>) -> Self {
        Self {
            image_name: image_name.into(),
        }
    }
}

/// Full image record returned by the metadata endpoint.
///
/// Only `image_name`, `width` and `height` are guaranteed; everything else is
/// passed through when the execution service provides it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDto {
    pub image_name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_intermediate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    /// Generation metadata, kept opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl ImageDto {
    /// Build a record carrying only the name and dimensions.
    pub fn new(image_name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            image_name: image_name.into(),
            width,
            height,
            image_url: None,
            thumbnail_url: None,
            is_intermediate: false,
            session_id: None,
            node_id: None,
            metadata: None,
        }
    }

    /// Reduce the record to the reference form used inside graphs.
    pub fn to_ref(&self) -> ImageRef {
        ImageRef::new(self.image_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_dto_serializes_without_optional_fields() {
        let dto = ImageDto::new("out.png", 512, 512);
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"image_name": "out.png", "width": 512, "height": 512})
        );
    }

    #[test]
    fn test_dto_accepts_unknown_and_optional_fields() {
        let json = r#"{
            "image_name": "out.png",
            "image_url": "/api/v1/images/out.png",
            "width": 640,
            "height": 480,
            "is_intermediate": true,
            "image_category": "control",
            "created_at": "2023-06-01T00:00:00"
        }"#;
        let dto: ImageDto = serde_json::from_str(json).unwrap();
        assert!(dto.is_intermediate);
        assert_eq!(dto.image_url.as_deref(), Some("/api/v1/images/out.png"));
        assert_eq!(dto.to_ref(), ImageRef::new("out.png"));
    }
}
