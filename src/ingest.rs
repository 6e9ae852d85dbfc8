use crate::error::IngestError;
use crate::isapi;
use crate::lookup::LookupTables;
use crate::storage::{ImageStore, SavedPicture};
use crate::types::{DetectionEvent, Picture};
use log::{debug, error, info};

#[derive(Debug)]
pub struct IngestReport {
    pub event: DetectionEvent,
    pub saved: Vec<SavedPicture>,
}

impl IngestReport {
    pub fn failed_saves(&self) -> usize {
        self.saved.iter().filter(|s| s.result.is_err()).count()
    }
}

/// Handles one detection event: decode, parse, store pictures, log.
pub struct Ingestor {
    tables: LookupTables,
    store: ImageStore,
}

impl Ingestor {
    pub fn new(tables: LookupTables, store: ImageStore) -> Self {
        Ingestor { tables, store }
    }

    pub async fn ingest(
        &self,
        body: &[u8],
        pictures: Vec<Picture>,
    ) -> Result<IngestReport, IngestError> {
        let xml = std::str::from_utf8(body)?;
        debug!("Received XML data: {}", xml);

        let event = isapi::parse_event(xml, &self.tables)?;
        let saved = self
            .store
            .save_all(&event.license_plate, &event.date_time, &pictures)
            .await;

        for picture in &saved {
            if let Err(e) = &picture.result {
                error!("Error saving {}: {}", picture.kind, e);
            }
        }
        info!("Detected plate info: {}", event);

        let report = IngestReport { event, saved };
        if !report.saved.is_empty() {
            info!(
                "Stored {} of {} pictures",
                report.saved.len() - report.failed_saves(),
                report.saved.len()
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isapi::tests::alert;
    use crate::types::PictureKind;

    fn ingestor(root: &std::path::Path) -> Ingestor {
        Ingestor::new(LookupTables::default(), ImageStore::new(root))
    }

    #[tokio::test]
    async fn ingests_event_with_pictures() {
        let root = tempfile::tempdir().unwrap();
        let pictures = vec![Picture {
            kind: PictureKind::LicensePlate,
            filename: "licensePlatePicture.jpg".to_string(),
            data: b"jpeg".to_vec(),
        }];
        let report = ingestor(root.path())
            .ingest(alert("").as_bytes(), pictures)
            .await
            .unwrap();

        assert_eq!(report.event.license_plate, "ABC1234");
        assert_eq!(report.saved.len(), 1);
        assert_eq!(report.failed_saves(), 0);
        assert!(root
            .path()
            .join("ABC1234/2023-05-10_14-23-11/licensePlatePicture.jpg")
            .exists());
    }

    #[tokio::test]
    async fn save_failures_are_reported_not_raised() {
        let root = tempfile::tempdir().unwrap();
        let pictures = vec![Picture {
            kind: PictureKind::Detection,
            filename: "..".to_string(),
            data: b"jpeg".to_vec(),
        }];
        let report = ingestor(root.path())
            .ingest(alert("").as_bytes(), pictures)
            .await
            .unwrap();
        assert_eq!(report.failed_saves(), 1);
    }

    #[tokio::test]
    async fn rejects_non_utf8() {
        let root = tempfile::tempdir().unwrap();
        let result = ingestor(root.path()).ingest(&[0xff, 0xfe, 0x00], vec![]).await;
        assert!(matches!(result, Err(IngestError::Encoding(_))));
    }

    #[tokio::test]
    async fn parse_errors_write_nothing() {
        let root = tempfile::tempdir().unwrap();
        let pictures = vec![Picture {
            kind: PictureKind::Detection,
            filename: "detectionPicture.jpg".to_string(),
            data: b"jpeg".to_vec(),
        }];
        let xml = alert("").replace("<licensePlate>ABC1234</licensePlate>", "");
        let result = ingestor(root.path()).ingest(xml.as_bytes(), pictures).await;
        assert!(matches!(result, Err(IngestError::MissingField("licensePlate"))));
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }
}
