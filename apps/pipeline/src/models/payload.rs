use serde::{Deserialize, Serialize};

/// The only cross-unit contract: what the extractor hands to every fan-out target.
/// Missing fields deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionPayload {
    #[serde(default)]
    pub filename: String,
    /// Page texts in page order, each terminated by `\n`.
    #[serde(default)]
    pub pdf_text: String,
    /// Sidecar `.txt` content; empty when the sidecar is absent.
    #[serde(default)]
    pub txt_content: String,
}

/// S3 / MinIO bucket notification. Only the fields the extractor reads are modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<StorageRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Object {
    /// URL-encoded object key as delivered in the notification.
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_missing_fields_default_to_empty() {
        let payload: ExtractionPayload =
            serde_json::from_str(r#"{"filename": "cv"}"#).unwrap();
        assert_eq!(payload.filename, "cv");
        assert_eq!(payload.pdf_text, "");
        assert_eq!(payload.txt_content, "");
    }

    #[test]
    fn test_storage_event_parses_minio_notification() {
        let json = r#"{
            "EventName": "s3:ObjectCreated:Put",
            "Key": "resumes/resume123.pdf",
            "Records": [{
                "eventVersion": "2.0",
                "eventSource": "minio:s3",
                "s3": {
                    "s3SchemaVersion": "1.0",
                    "bucket": {"name": "resumes", "arn": "arn:aws:s3:::resumes"},
                    "object": {"key": "resume123.pdf", "size": 1024}
                }
            }]
        }"#;
        let event: StorageEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.records.len(), 1);
        assert_eq!(event.records[0].s3.bucket.name, "resumes");
        assert_eq!(event.records[0].s3.object.key, "resume123.pdf");
    }

    #[test]
    fn test_storage_event_without_records_is_empty() {
        let event: StorageEvent = serde_json::from_str("{}").unwrap();
        assert!(event.records.is_empty());
    }
}
