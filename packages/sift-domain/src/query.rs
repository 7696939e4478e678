use time::OffsetDateTime;

use crate::document::Document;

#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub struct DateRange {
	#[serde(default, with = "crate::time_serde::option")]
	pub from: Option<OffsetDateTime>,
	#[serde(default, with = "crate::time_serde::option")]
	pub to: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub struct SizeRange {
	pub min: Option<u64>,
	pub max: Option<u64>,
}

/// Filter predicate handed to the document store alongside a free-text query.
///
/// Only processed documents are ever candidates; the store is expected to
/// enforce that on its side as well.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
	pub folder: Option<String>,
	pub date_range: Option<DateRange>,
	pub mime_types: Vec<String>,
	pub tags: Vec<String>,
	pub authors: Vec<String>,
	pub size_range: Option<SizeRange>,
	/// Workspace bookmark membership. Not checked by [`Self::matches`]: the
	/// store owns the bookmark sets and applies this scope itself.
	pub workspace: Option<String>,
}

impl DocumentFilter {
	pub fn matches(&self, doc: &Document) -> bool {
		if let Some(folder) = self.folder.as_deref()
			&& doc.folder.as_deref() != Some(folder)
		{
			return false;
		}
		if let Some(range) = self.date_range {
			if let Some(from) = range.from
				&& doc.created_at < from
			{
				return false;
			}
			if let Some(to) = range.to
				&& doc.created_at > to
			{
				return false;
			}
		}
		if !self.mime_types.is_empty()
			&& !self.mime_types.iter().any(|mime| doc.mime_type.eq_ignore_ascii_case(mime))
		{
			return false;
		}
		if !self.tags.is_empty()
			&& !self.tags.iter().any(|tag| doc.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
		{
			return false;
		}
		if !self.authors.is_empty() && !self.authors.iter().any(|author| doc.uploaded_by == *author)
		{
			return false;
		}
		if let Some(range) = self.size_range {
			if let Some(min) = range.min
				&& doc.size < min
			{
				return false;
			}
			if let Some(max) = range.max
				&& doc.size > max
			{
				return false;
			}
		}

		true
	}
}
