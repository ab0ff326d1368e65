use crate::url::normalize::normalize_target;
use crate::UrlError;
use url::Url;

/// Name used for a URL whose path is empty or `/`
pub const INDEX_NAME: &str = "index";

/// Maps a URL to a flat, deterministic artifact file name
///
/// The path component has its surrounding slashes stripped, an empty path
/// becomes `index`, the remaining slashes become underscores, and
/// `.{extension}` is appended unless the name already ends with it. Scheme,
/// host, query and fragment are ignored, so pages that differ only in those
/// map to the same name.
///
/// # Examples
///
/// ```
/// use sumi_scribe::url::artifact_file_name;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/equipe/louise-pini/").unwrap();
/// assert_eq!(artifact_file_name(&url, "md"), "equipe_louise-pini.md");
///
/// let url = Url::parse("https://example.com/").unwrap();
/// assert_eq!(artifact_file_name(&url, "md"), "index.md");
/// ```
pub fn artifact_file_name(url: &Url, extension: &str) -> String {
    let trimmed = url.path().trim_matches('/');

    let mut name = if trimmed.is_empty() {
        INDEX_NAME.to_string()
    } else {
        trimmed.replace('/', "_")
    };

    let suffix = format!(".{}", extension);
    if !name.ends_with(&suffix) {
        name.push_str(&suffix);
    }

    name
}

/// Same as [`artifact_file_name`] for a URL that has not been parsed yet
pub fn artifact_file_name_str(url: &str, extension: &str) -> Result<String, UrlError> {
    let url = normalize_target(url)?;
    Ok(artifact_file_name(&url, extension))
}
