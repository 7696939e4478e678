use serde_json::{Map, Value};

/// Extracts the first parseable JSON object embedded in raw model output.
///
/// Language models wrap JSON in prose, code fences, or trailing commentary;
/// this scans for balanced `{...}` spans (string- and escape-aware) and
/// returns the first one that parses. `None` feeds the caller's fallback
/// path and must never surface as an error.
pub fn extract_json_object(raw: &str) -> Option<Map<String, Value>> {
	let bytes = raw.as_bytes();
	let mut search_from = 0;

	while let Some(offset) = raw[search_from..].find('{') {
		let start = search_from + offset;

		if let Some(end) = balanced_end(bytes, start)
			&& let Ok(Value::Object(map)) = serde_json::from_str(&raw[start..=end])
		{
			return Some(map);
		}

		search_from = start + 1;
	}

	None
}

fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
	let mut depth = 0_i32;
	let mut in_string = false;
	let mut escaped = false;
	let mut idx = start;

	while idx < bytes.len() {
		let byte = bytes[idx];

		if in_string {
			if escaped {
				escaped = false;
			} else if byte == b'\\' {
				escaped = true;
			} else if byte == b'"' {
				in_string = false;
			}
		} else {
			match byte {
				b'"' => in_string = true,
				b'{' => depth += 1,
				b'}' => {
					depth -= 1;

					if depth == 0 {
						return Some(idx);
					}
				},
				_ => {},
			}
		}

		idx += 1;
	}

	None
}
