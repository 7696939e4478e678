use sift_domain::DocumentFilter;

use crate::{ServiceError, ServiceResult, search::SearchFilters};

/// Builds the store-side filter from the request, rejecting inverted ranges.
pub(crate) fn build(
	folder: Option<String>,
	filters: Option<SearchFilters>,
) -> ServiceResult<DocumentFilter> {
	let folder = folder.map(|f| f.trim().to_string()).filter(|f| !f.is_empty());
	let Some(filters) = filters else {
		return Ok(DocumentFilter { folder, ..DocumentFilter::default() });
	};

	if let Some(range) = filters.date_range
		&& let (Some(from), Some(to)) = (range.from, range.to)
		&& from > to
	{
		return Err(ServiceError::InvalidRequest {
			message: "dateRange.from must not be after dateRange.to".to_string(),
		});
	}
	if let Some(range) = filters.size_range
		&& let (Some(min), Some(max)) = (range.min, range.max)
		&& min > max
	{
		return Err(ServiceError::InvalidRequest {
			message: "sizeRange.min must not exceed sizeRange.max".to_string(),
		});
	}

	Ok(DocumentFilter {
		folder,
		date_range: filters.date_range,
		mime_types: filters.file_types,
		tags: filters.tags,
		authors: filters.authors,
		size_range: filters.size_range,
		workspace: filters.workspace,
	})
}
