//! Multipart form parsing for the listing endpoints.
//!
//! The endpoints accept one optional-or-required `image` file plus a set of
//! plain text fields (description, style, price, ...). Images are validated
//! against a content-type allowlist and a size cap, then held in memory --
//! the downstream services take byte slices, so nothing touches disk.

use std::collections::HashMap;

use axum::extract::Multipart;

use crate::http::error::AppError;

/// Image content types the endpoints accept.
const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Upload size cap.
const MAX_FILE_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// An uploaded product image.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

/// All parts of a listing form: the image (if any) and the text fields.
#[derive(Debug, Default)]
pub struct ListingForm {
    pub image: Option<UploadedImage>,
    fields: HashMap<String, String>,
}

impl ListingForm {
    /// Read every part of the multipart body.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = ListingForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read multipart data: {e}")))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "image" {
                // Empty filename means the UI submitted the field without a file
                if field.file_name().is_none_or(str::is_empty) {
                    continue;
                }

                let media_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                if !ALLOWED_CONTENT_TYPES.contains(&media_type.as_str()) {
                    return Err(AppError::Validation(format!(
                        "invalid content type '{}'; allowed: {}",
                        media_type,
                        ALLOWED_CONTENT_TYPES.join(", ")
                    )));
                }

                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read file data: {e}")))?;
                if bytes.len() > MAX_FILE_SIZE {
                    return Err(AppError::Validation(format!(
                        "file too large; maximum size is {MAX_FILE_SIZE} bytes"
                    )));
                }

                form.image = Some(UploadedImage {
                    bytes: bytes.to_vec(),
                    media_type,
                });
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read field '{name}': {e}")))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// The image, or a validation error telling the user to upload one.
    pub fn require_image(&self) -> Result<&UploadedImage, AppError> {
        self.image
            .as_ref()
            .ok_or_else(|| AppError::Validation("請上傳商品圖片".to_string()))
    }

    /// A text field, empty string when absent.
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// A text field with a fallback when absent or empty.
    pub fn text_or(&self, name: &str, default: &str) -> String {
        match self.fields.get(name) {
            Some(value) if !value.trim().is_empty() => value.clone(),
            _ => default.to_string(),
        }
    }

    /// A required text field.
    pub fn require_text(&self, name: &str) -> Result<String, AppError> {
        match self.fields.get(name) {
            Some(value) if !value.trim().is_empty() => Ok(value.clone()),
            _ => Err(AppError::Validation(format!("missing form field '{name}'"))),
        }
    }

    /// Whether a boolean-ish flag field is set ("true" / "1").
    pub fn flag(&self, name: &str) -> bool {
        matches!(
            self.fields.get(name).map(|v| v.trim().to_lowercase()),
            Some(v) if v == "true" || v == "1"
        )
    }

    #[cfg(test)]
    pub fn with_fields(fields: &[(&str, &str)]) -> Self {
        Self {
            image: None,
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_fields_and_defaults() {
        let form = ListingForm::with_fields(&[("description", "macbook"), ("contact_info", " ")]);
        assert_eq!(form.text("description"), "macbook");
        assert_eq!(form.text("missing"), "");
        assert_eq!(form.text_or("contact_info", "請私訊詳詢"), "請私訊詳詢");
        assert_eq!(form.text_or("description", "x"), "macbook");
    }

    #[test]
    fn test_require_text() {
        let form = ListingForm::with_fields(&[("price", "$18,000")]);
        assert_eq!(form.require_text("price").unwrap(), "$18,000");
        assert!(form.require_text("purpose").is_err());
    }

    #[test]
    fn test_flag_parsing() {
        let form = ListingForm::with_fields(&[("stream", "True"), ("other", "yes")]);
        assert!(form.flag("stream"));
        assert!(!form.flag("other"));
        assert!(!form.flag("absent"));
    }

    #[test]
    fn test_require_image_missing() {
        let form = ListingForm::default();
        let err = form.require_image().unwrap_err();
        assert!(err.message().contains("請上傳商品圖片"));
    }
}
