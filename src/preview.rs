//! Preview-category inference for the `Preview` operation: maps a file's
//! extension (or bare content type) to a coarse category the gateway uses
//! to decide how to render a presigned URL.

use crate::error::{DriveError, DriveResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewCategory {
    Image,
    Pdf,
    Document,
    Text,
}

/// Classifies by file extension, case-insensitively, per the spec's
/// image/pdf/document/text table. Anything else is `InvalidArgument`
/// rather than a silent `unknown` category — the gateway has nothing
/// sensible to render for it.
pub fn preview_category(name_or_content_type: &str) -> DriveResult<PreviewCategory> {
    let ext = name_or_content_type
        .rsplit('.')
        .next()
        .unwrap_or(name_or_content_type)
        .to_ascii_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" | "png" | "gif" => Ok(PreviewCategory::Image),
        "pdf" => Ok(PreviewCategory::Pdf),
        "doc" | "docx" | "xls" | "xlsx" => Ok(PreviewCategory::Document),
        "txt" | "md" | "json" => Ok(PreviewCategory::Text),
        other => Err(DriveError::InvalidArgument(format!(
            "no preview category for extension \"{other}\""
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_extensions() {
        assert_eq!(preview_category("photo.JPG").unwrap(), PreviewCategory::Image);
        assert_eq!(preview_category("report.pdf").unwrap(), PreviewCategory::Pdf);
        assert_eq!(preview_category("sheet.xlsx").unwrap(), PreviewCategory::Document);
        assert_eq!(preview_category("notes.md").unwrap(), PreviewCategory::Text);
    }

    #[test]
    fn unknown_extension_is_invalid_argument() {
        let err = preview_category("archive.zip").unwrap_err();
        assert!(matches!(err, DriveError::InvalidArgument(_)));
    }

    #[test]
    fn extensionless_name_is_invalid_argument() {
        let err = preview_category("README").unwrap_err();
        assert!(matches!(err, DriveError::InvalidArgument(_)));
    }
}
