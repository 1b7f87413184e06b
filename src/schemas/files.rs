use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize)]
pub(crate) struct UploadFileResponse {
    pub(crate) public_id: String,
    pub(crate) file_name: String,
    pub(crate) url: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct DeleteFilesRequest {
    #[serde(alias = "publicIds")]
    #[validate(length(min = 1, message = "public_ids must not be empty"))]
    pub(crate) public_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteFilesResponse {
    pub(crate) deleted: usize,
}
