use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;

/// Reference lists served by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Region,
    Department,
    Diploma,
    Program,
    BacSeries,
    Mention,
    ExamCenter,
    DepotCenter,
}

impl OptionKind {
    /// Lists that do not depend on another selection
    pub const REFERENCE: [OptionKind; 6] = [
        OptionKind::Region,
        OptionKind::Diploma,
        OptionKind::BacSeries,
        OptionKind::Mention,
        OptionKind::ExamCenter,
        OptionKind::DepotCenter,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            OptionKind::Region => "regions",
            OptionKind::Department => "departments",
            OptionKind::Diploma => "diplomas",
            OptionKind::Program => "programs",
            OptionKind::BacSeries => "bac-series",
            OptionKind::Mention => "mentions",
            OptionKind::ExamCenter => "exam-centers",
            OptionKind::DepotCenter => "depot-centers",
        }
    }

    pub fn plural_name(&self) -> &'static str {
        match self {
            OptionKind::Region => "regions",
            OptionKind::Department => "departments",
            OptionKind::Diploma => "diplomas",
            OptionKind::Program => "programs",
            OptionKind::BacSeries => "bac series",
            OptionKind::Mention => "mentions",
            OptionKind::ExamCenter => "exam centers",
            OptionKind::DepotCenter => "depot centers",
        }
    }
}

/// Filter applied when fetching an option list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionQuery {
    All,
    ByRegion { region_id: i64 },
    ByDiplomaAndSeries { diploma_id: i64, bac_series_id: i64 },
}

impl OptionQuery {
    /// Query-string pairs sent with the request.
    pub fn params(&self, kind: OptionKind) -> Vec<(&'static str, String)> {
        let mut params = match *self {
            OptionQuery::All => Vec::new(),
            OptionQuery::ByRegion { region_id } => vec![("region_id", region_id.to_string())],
            OptionQuery::ByDiplomaAndSeries { diploma_id, bac_series_id } => vec![
                ("diploma_id", diploma_id.to_string()),
                ("bac_series_id", bac_series_id.to_string()),
            ],
        };
        if matches!(kind, OptionKind::Department | OptionKind::Diploma | OptionKind::Program) {
            params.push(("is_active", "true".to_string()));
        }
        params
    }
}

/// One entry of a reference list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OptionItem {
    #[serde(deserialize_with = "flexible_id")]
    pub id: i64,
    #[serde(alias = "name", alias = "nom", alias = "libelle", alias = "title")]
    pub label: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl OptionItem {
    pub fn new(id: i64, label: &str) -> Self {
        Self {
            id,
            label: label.to_string(),
            code: None,
        }
    }
}

/// Any record where only the server-assigned id matters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct IdRecord {
    #[serde(deserialize_with = "flexible_id")]
    pub id: i64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    Text(String),
}

/// Ids arrive as JSON numbers from some endpoints and numeric strings from others.
fn flexible_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid id: {s:?}"))),
    }
}

/// Student profile payload for create and update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentProfile {
    pub surname: String,
    pub given_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub father_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mother_name: Option<String>,
    pub guardian_name: String,
    pub guardian_phone: String,
}

pub const PENDING_STATUS: &str = "pending";

/// Enrollment creation payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEnrollment {
    pub student_id: i64,
    pub program_id: i64,
    pub exam_center_id: i64,
    pub depot_center_id: i64,
    pub diploma_id: i64,
    pub bac_series_id: Option<i64>,
    pub mention_id: Option<i64>,
    pub diploma_year: Option<String>,
    pub status: String,
    pub national_id: Option<String>,
    /// Opaque to the backend schema; carries the non-core wizard fields
    pub metadata: Value,
}

/// Document type tag sent with each upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Photo,
    IdentityDocument,
    Diploma,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::Photo,
        DocumentKind::IdentityDocument,
        DocumentKind::Diploma,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            DocumentKind::Photo => "photo",
            DocumentKind::IdentityDocument => "identity_document",
            DocumentKind::Diploma => "diploma",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DocumentKind::Photo => "photo",
            DocumentKind::IdentityDocument => "identity document",
            DocumentKind::Diploma => "diploma",
        }
    }
}

/// A file read from disk, ready for a multipart upload
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub enrollment_id: i64,
    pub kind: DocumentKind,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    /// Read `path` into memory; the file name part is kept for the form field.
    pub async fn read(enrollment_id: i64, kind: DocumentKind, path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| kind.tag().to_string());
        Ok(Self {
            enrollment_id,
            kind,
            file_name,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_item_accepts_string_ids_and_label_aliases() {
        let item: OptionItem = serde_json::from_str(r#"{"id":" 12 ","libelle":"Lekie","code":"LK"}"#).unwrap();
        assert_eq!(item.id, 12);
        assert_eq!(item.label, "Lekie");
        assert_eq!(item.code.as_deref(), Some("LK"));

        let bad: Result<OptionItem, _> = serde_json::from_str(r#"{"id":"abc","name":"x"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn query_params_add_active_filter_where_needed() {
        let programs = OptionQuery::ByDiplomaAndSeries { diploma_id: 1, bac_series_id: 3 }
            .params(OptionKind::Program);
        assert_eq!(
            programs,
            vec![
                ("diploma_id", "1".to_string()),
                ("bac_series_id", "3".to_string()),
                ("is_active", "true".to_string()),
            ]
        );
        assert!(OptionQuery::All.params(OptionKind::Mention).is_empty());
        assert_eq!(
            OptionQuery::ByRegion { region_id: 5 }.params(OptionKind::Department).len(),
            2
        );
    }

    #[test]
    fn profile_skips_absent_optionals() {
        let profile = StudentProfile {
            surname: "Ngono".into(),
            given_name: "Alice".into(),
            email: "alice@example.cm".into(),
            phone: "690000000".into(),
            birth_date: "2005-04-02".into(),
            birth_place: None,
            gender: None,
            region_id: Some(1),
            department_id: None,
            father_name: None,
            mother_name: None,
            guardian_name: "Paul".into(),
            guardian_phone: "677000000".into(),
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["region_id"], 1);
        assert!(json.get("department_id").is_none());
        assert!(json.get("birth_place").is_none());
    }

    #[tokio::test]
    async fn document_upload_reads_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bac.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        let upload = DocumentUpload::read(9, DocumentKind::Diploma, &path).await.unwrap();
        assert_eq!(upload.file_name, "bac.pdf");
        assert_eq!(upload.bytes, b"%PDF");
        assert_eq!(upload.enrollment_id, 9);

        let missing = DocumentUpload::read(9, DocumentKind::Photo, &dir.path().join("none.jpg")).await;
        assert!(missing.is_err());
    }
}
