//! Control net request and response bodies.

use serde::{Deserialize, Serialize};

use super::graph::Node;
use super::image::ImageDto;

/// Body of `PUT /api/v1/control-nets/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutControlNetRequest {
    pub processor_node: Node,
    #[serde(default)]
    pub control_image: Option<ImageDto>,
}

/// Body of `PUT /api/v1/control-nets/{id}/image`. `null` detaches the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetControlImageRequest {
    pub control_image: Option<ImageDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlNetResponse {
    pub control_net_id: String,
    pub processor_node: Node,
    pub control_image: Option<ImageDto>,
    pub processed_control_image: Option<ImageDto>,
    /// Unix timestamp of the last commit.
    pub processed_at: Option<i64>,
}

/// One frame of the processed-image stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedImageCommit {
    pub control_net_id: String,
    pub processed_control_image: ImageDto,
}
