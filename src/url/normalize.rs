use crate::UrlError;
use url::Url;

/// Normalizes a URL into a crawl target
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace and parse; reject if malformed
/// 2. Reject schemes other than `http` and `https`
/// 3. Reject URLs without a host
/// 4. Remove the fragment (everything after `#`)
///
/// Parsing applies the standard WHATWG rules (lowercase host, `/` for an
/// empty path, dot segments resolved). Nothing else is canonicalized: a
/// trailing slash or a query string makes a distinct target.
///
/// # Examples
///
/// ```
/// use sumi_scribe::url::normalize_target;
///
/// let url = normalize_target("https://Example.com/docs/#install").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs/");
/// ```
pub fn normalize_target(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url)
}
