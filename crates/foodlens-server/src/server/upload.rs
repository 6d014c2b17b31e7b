use crate::server::AppError;
use axum::extract::Multipart;

/// Name of the multipart field holding the image
pub const FILE_FIELD: &str = "file";

/// Pull the bytes of the `file` field, skipping any other fields
pub async fn read_file_field(mut multipart: Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let data = field.bytes().await?;
        if data.is_empty() {
            return Err(AppError::InvalidRequest(format!(
                "multipart field '{}' is empty",
                FILE_FIELD
            )));
        }
        return Ok(data.to_vec());
    }

    Err(AppError::InvalidRequest(format!(
        "missing multipart field '{}'",
        FILE_FIELD
    )))
}
