use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tracing::info;

use super::error::Result;
use super::types::{
    DocumentUpload, IdRecord, NewEnrollment, OptionItem, OptionKind, OptionQuery, StudentProfile,
};
use super::EnrollmentApi;

/// Simulated latency so progress is visible in dryrun
const DEMO_LATENCY: Duration = Duration::from_millis(150);

/// Backend with canned reference data; nothing leaves the machine
pub struct DemoApi {
    next_enrollment: AtomicI64,
}

impl DemoApi {
    pub fn new() -> Self {
        Self {
            next_enrollment: AtomicI64::new(1001),
        }
    }
}

impl Default for DemoApi {
    fn default() -> Self {
        Self::new()
    }
}

fn items(entries: &[(i64, &str)]) -> Vec<OptionItem> {
    entries.iter().map(|(id, label)| OptionItem::new(*id, label)).collect()
}

/// Canned lists, keyed the same way the real backend filters them
pub fn demo_options(kind: OptionKind, query: OptionQuery) -> Vec<OptionItem> {
    match (kind, query) {
        (OptionKind::Region, _) => items(&[(1, "Centre"), (2, "Littoral"), (3, "Ouest")]),
        (OptionKind::Department, OptionQuery::ByRegion { region_id }) => match region_id {
            1 => items(&[(11, "Mfoundi"), (12, "Lekie"), (13, "Nyong-et-Kelle")]),
            2 => items(&[(21, "Wouri"), (22, "Moungo"), (23, "Sanaga-Maritime")]),
            3 => items(&[(31, "Mifi"), (32, "Menoua")]),
            _ => Vec::new(),
        },
        (OptionKind::Diploma, _) => items(&[(1, "Baccalaureat"), (2, "GCE Advanced Level")]),
        (OptionKind::BacSeries, _) => items(&[(1, "A"), (2, "C"), (3, "D"), (4, "TI")]),
        (
            OptionKind::Program,
            OptionQuery::ByDiplomaAndSeries { diploma_id, bac_series_id },
        ) => match (diploma_id, bac_series_id) {
            (1, 2) | (1, 4) => items(&[(101, "Computer Engineering"), (102, "Civil Engineering")]),
            (1, 3) => items(&[(103, "Medicine"), (104, "Agronomy")]),
            (1, 1) => items(&[(105, "Law"), (106, "Letters")]),
            (2, _) => items(&[(101, "Computer Engineering"), (105, "Law")]),
            _ => Vec::new(),
        },
        (OptionKind::Mention, _) => {
            items(&[(1, "Passable"), (2, "Assez bien"), (3, "Bien"), (4, "Tres bien")])
        }
        (OptionKind::ExamCenter, _) => items(&[(1, "Yaounde"), (2, "Douala"), (3, "Bafoussam")]),
        (OptionKind::DepotCenter, _) => items(&[(1, "Yaounde - Ngoa Ekelle"), (2, "Douala - Ndokoti")]),
        _ => Vec::new(),
    }
}

#[async_trait]
impl EnrollmentApi for DemoApi {
    async fn list_options(&self, kind: OptionKind, query: OptionQuery) -> Result<Vec<OptionItem>> {
        tokio::time::sleep(DEMO_LATENCY).await;
        Ok(demo_options(kind, query))
    }

    async fn create_student(&self, profile: &StudentProfile) -> Result<IdRecord> {
        tokio::time::sleep(DEMO_LATENCY).await;
        info!("[dryrun] create student {} {}", profile.given_name, profile.surname);
        Ok(IdRecord { id: 1 })
    }

    async fn update_student(&self, id: i64, _profile: &StudentProfile) -> Result<IdRecord> {
        tokio::time::sleep(DEMO_LATENCY).await;
        Ok(IdRecord { id })
    }

    async fn current_student(&self) -> Result<IdRecord> {
        Ok(IdRecord { id: 1 })
    }

    async fn create_enrollment(&self, enrollment: &NewEnrollment) -> Result<IdRecord> {
        tokio::time::sleep(DEMO_LATENCY).await;
        let id = self.next_enrollment.fetch_add(1, Ordering::Relaxed);
        info!("[dryrun] enrollment {} for program {}", id, enrollment.program_id);
        Ok(IdRecord { id })
    }

    async fn upload_document(&self, upload: DocumentUpload) -> Result<()> {
        tokio::time::sleep(DEMO_LATENCY).await;
        info!("[dryrun] upload {} ({} bytes)", upload.kind.tag(), upload.bytes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn departments_follow_region() {
        let centre = demo_options(OptionKind::Department, OptionQuery::ByRegion { region_id: 1 });
        assert!(centre.iter().any(|d| d.label == "Mfoundi"));

        let littoral = demo_options(OptionKind::Department, OptionQuery::ByRegion { region_id: 2 });
        assert!(littoral.iter().all(|d| d.label != "Mfoundi"));
    }

    #[test]
    fn dependent_lists_need_their_filter() {
        assert!(demo_options(OptionKind::Department, OptionQuery::All).is_empty());
        assert!(demo_options(OptionKind::Program, OptionQuery::All).is_empty());
    }

    #[tokio::test]
    async fn enrollment_ids_increase() {
        let api = DemoApi::new();
        let enrollment = NewEnrollment {
            student_id: 1,
            program_id: 101,
            exam_center_id: 1,
            depot_center_id: 1,
            diploma_id: 1,
            bac_series_id: Some(2),
            mention_id: None,
            diploma_year: None,
            status: super::super::types::PENDING_STATUS.to_string(),
            national_id: None,
            metadata: serde_json::json!({}),
        };
        let first = api.create_enrollment(&enrollment).await.unwrap();
        let second = api.create_enrollment(&enrollment).await.unwrap();
        assert_eq!(second.id, first.id + 1);
    }
}
