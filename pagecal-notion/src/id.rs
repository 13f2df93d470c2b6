use crate::error::{NotionError, Result};
use url::Url;

pub const PAGE_BASE_URL: &str = "https://www.notion.so/";

/// Public url of a page: separators stripped, prefixed with the Notion base url.
pub fn page_url(page_id: &str) -> String {
    format!("{}{}", PAGE_BASE_URL, page_id.replace('-', ""))
}

/// Accept a page id in any of the forms users paste and return the dashed form.
///
/// Supported inputs:
/// - `ae6222d5609649e998b2786a83dc15a2`
/// - `ae6222d5-6096-49e9-98b2-786a83dc15a2`
/// - `https://www.notion.so/workspace/Some-Title-ae6222d5609649e998b2786a83dc15a2?pvs=4`
pub fn normalize_page_id(input: &str) -> Result<String> {
    let trimmed = input.trim();

    let compact: String = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        let url = Url::parse(trimmed).map_err(|e| NotionError::InvalidUrl(format!("{}: {}", trimmed, e)))?;
        let segment = url
            .path_segments()
            .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
            .ok_or_else(|| NotionError::InvalidPageId(trimmed.to_string()))?;
        let chars: Vec<char> = segment.chars().filter(|c| *c != '-').collect();
        if chars.len() < 32 {
            return Err(NotionError::InvalidPageId(trimmed.to_string()));
        }
        chars[chars.len() - 32..].iter().collect()
    } else {
        trimmed.chars().filter(|c| *c != '-').collect()
    };

    if compact.len() != 32 || !compact.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(NotionError::InvalidPageId(trimmed.to_string()));
    }

    let compact = compact.to_ascii_lowercase();
    Ok(format!(
        "{}-{}-{}-{}-{}",
        &compact[0..8],
        &compact[8..12],
        &compact[12..16],
        &compact[16..20],
        &compact[20..32]
    ))
}
