use time::OffsetDateTime;
use uuid::Uuid;

/// A processed document as exposed by the external document store.
///
/// `text` holds the extracted content (already truncated by the store for
/// display). `embedding` is present only when the indexing side computed one
/// for the current embedding configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Document {
	pub id: Uuid,
	pub name: String,
	pub folder: Option<String>,
	pub mime_type: String,
	pub size: u64,
	pub tags: Vec<String>,
	pub uploaded_by: String,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	pub text: String,
	pub embedding: Option<Vec<f32>>,
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;
	use uuid::Uuid;

	use super::*;

	#[test]
	fn serializes_created_at_as_rfc3339() {
		let doc = Document {
			id: Uuid::nil(),
			name: "report.pdf".to_string(),
			folder: None,
			mime_type: "application/pdf".to_string(),
			size: 1_024,
			tags: Vec::new(),
			uploaded_by: "ana".to_string(),
			created_at: datetime!(2025-06-15 12:30 UTC),
			text: String::new(),
			embedding: None,
		};
		let json = serde_json::to_value(&doc).expect("Failed to serialize document.");

		assert_eq!(json["created_at"], "2025-06-15T12:30:00Z");

		let back: Document =
			serde_json::from_value(json).expect("Failed to deserialize document.");

		assert_eq!(back.created_at, doc.created_at);
	}
}
