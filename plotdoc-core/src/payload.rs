//! Upload, create and update payloads.

use crate::{Category, CategoryId, DocumentStatus, PlotType, PropertyId, UnitId, ValidationError};
use serde::{Deserialize, Serialize};

/// File chosen for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Upload form as filled in by the user. Required fields are optional here
/// so that missing input can be reported instead of being unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadRequest {
    pub file: Option<FileUpload>,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub tags: Vec<String>,
    pub status: DocumentStatus,
}

/// An upload whose required fields are known to be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    pub file: FileUpload,
    pub title: String,
    pub description: Option<String>,
    pub category_id: CategoryId,
    pub tags: Vec<String>,
    pub status: DocumentStatus,
}

impl UploadRequest {
    /// Check required fields, and the category against `known` when the
    /// category list is available (an empty list skips that check).
    pub fn validate(&self, known: &[Category]) -> Result<ValidatedUpload, ValidationError> {
        let file = match &self.file {
            Some(file) if !file.file_name.trim().is_empty() => file.clone(),
            _ => return Err(ValidationError::missing("file")),
        };
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::missing("title"));
        }
        let category_id = self
            .category_id
            .ok_or_else(|| ValidationError::missing("category"))?;
        if !known.is_empty() && !known.iter().any(|c| c.id == category_id) {
            return Err(ValidationError::UnknownCategory { category_id });
        }

        Ok(ValidatedUpload {
            file,
            title: title.to_string(),
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            category_id,
            tags: normalize_tags(&self.tags),
            status: self.status,
        })
    }
}

fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Multipart payload of the document create endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentCreate {
    pub file: FileUpload,
    pub title: String,
    pub description: Option<String>,
    pub category_id: CategoryId,
    pub property_id: PropertyId,
    pub plot_number: Option<String>,
    pub plot_id: Option<UnitId>,
    pub plot_type: Option<PlotType>,
    pub tags: Vec<String>,
    pub status: DocumentStatus,
}

impl DocumentCreate {
    /// Property-level document, not yet associated with any unit.
    pub fn untargeted(upload: ValidatedUpload, property_id: PropertyId) -> Self {
        Self {
            file: upload.file,
            title: upload.title,
            description: upload.description,
            category_id: upload.category_id,
            property_id,
            plot_number: None,
            plot_id: None,
            plot_type: None,
            tags: upload.tags,
            status: upload.status,
        }
    }
}

/// Partial update of a document. Unset fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentStatus>,
}

impl DocumentPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
            && self.tags.is_none()
            && self.status.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> UploadRequest {
        UploadRequest {
            file: Some(FileUpload {
                file_name: "deed.pdf".to_string(),
                content_type: Some("application/pdf".to_string()),
                bytes: vec![1, 2, 3],
            }),
            title: "  Title deed ".to_string(),
            description: Some("   ".to_string()),
            category_id: Some(CategoryId::new(2)),
            tags: vec!["legal".into(), " legal ".into(), "".into(), "2024".into()],
            status: DocumentStatus::Active,
        }
    }

    fn category(id: i64) -> Category {
        Category {
            id: CategoryId::new(id),
            name: format!("cat-{id}"),
            color: None,
        }
    }

    #[test]
    fn test_validate_normalizes_fields() {
        let upload = request().validate(&[]).unwrap();
        assert_eq!(upload.title, "Title deed");
        assert_eq!(upload.description, None);
        assert_eq!(upload.tags, vec!["legal".to_string(), "2024".to_string()]);
    }

    #[test]
    fn test_validate_requires_file_title_category() {
        let mut missing_file = request();
        missing_file.file = None;
        assert_eq!(
            missing_file.validate(&[]),
            Err(ValidationError::missing("file"))
        );

        let mut missing_title = request();
        missing_title.title = "  ".to_string();
        assert_eq!(
            missing_title.validate(&[]),
            Err(ValidationError::missing("title"))
        );

        let mut missing_category = request();
        missing_category.category_id = None;
        assert_eq!(
            missing_category.validate(&[]),
            Err(ValidationError::missing("category"))
        );
    }

    #[test]
    fn test_validate_checks_known_categories() {
        assert!(request().validate(&[category(2), category(3)]).is_ok());
        assert_eq!(
            request().validate(&[category(3)]),
            Err(ValidationError::UnknownCategory {
                category_id: CategoryId::new(2)
            })
        );
    }

    #[test]
    fn test_patch_emptiness() {
        assert!(DocumentPatch::default().is_empty());
        let patch = DocumentPatch {
            status: Some(DocumentStatus::Archived),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "archived" }));
    }
}
