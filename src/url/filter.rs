use crate::url::normalize::normalize_target;
use crate::url::TargetSet;

/// Selects the discovered links that belong to the crawl scope
///
/// A link is kept iff its normalized form starts with `scope_prefix` and is
/// not `exclude_url` (the seed). Links that cannot be normalized are dropped.
/// The comparison is a literal string prefix match: `https://example.com/about`
/// and `https://example.com/about/` are two different targets.
///
/// The returned set keeps first-seen order and holds no duplicates.
///
/// # Examples
///
/// ```
/// use sumi_scribe::url::filter_links;
///
/// let links = [
///     "https://example.com/about",
///     "https://external.com/x",
///     "https://example.com/",
/// ];
/// let queue = filter_links(links, "https://example.com/", "https://example.com/");
/// assert_eq!(queue.iter().collect::<Vec<_>>(), vec!["https://example.com/about".to_string()]);
/// ```
pub fn filter_links<I, S>(discovered: I, scope_prefix: &str, exclude_url: &str) -> TargetSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let excluded = normalize_target(exclude_url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| exclude_url.to_string());

    let mut targets = TargetSet::new();

    for link in discovered {
        let link = link.as_ref();
        let normalized = match normalize_target(link) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Dropping unparseable link {}: {}", link, e);
                continue;
            }
        };

        let as_str = normalized.as_str();
        if as_str == excluded {
            continue;
        }

        if !as_str.starts_with(scope_prefix) {
            tracing::trace!("Link {} is outside scope {}", as_str, scope_prefix);
            continue;
        }

        targets.insert(normalized);
    }

    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = "https://example.com/";

    #[test]
    fn test_example_scenario() {
        let links = [
            "https://example.com/about",
            "https://example.com/contact",
            "https://external.com/x",
            "https://example.com/",
        ];

        let queue = filter_links(links, SEED, SEED);

        assert_eq!(
            queue.iter().collect::<Vec<_>>(),
            vec![
                "https://example.com/about",
                "https://example.com/contact",
            ]
        );
    }

    #[test]
    fn test_seed_never_in_queue() {
        let links = ["https://example.com/", "https://example.com/#top", "https://example.com"];
        let queue = filter_links(links, SEED, SEED);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_scope_containment() {
        let links = [
            "https://example.com/a",
            "http://example.com/b",
            "https://sub.example.com/c",
            "https://example.community/d",
            "https://example.com/e?x=1",
        ];

        let queue = filter_links(links, SEED, SEED);

        for link in links {
            let normalized = normalize_target(link).unwrap().to_string();
            let expected = normalized.starts_with(SEED) && normalized != SEED;
            assert_eq!(queue.iter().any(|t| t == normalized), expected, "link {}", link);
        }
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_duplicates_collapse_in_first_seen_order() {
        let links = [
            "https://example.com/b",
            "https://example.com/a",
            "https://example.com/b",
            "https://example.com/a#frag",
        ];

        let queue = filter_links(links, SEED, SEED);

        assert_eq!(
            queue.iter().collect::<Vec<_>>(),
            vec![
                "https://example.com/b",
                "https://example.com/a",
            ]
        );
    }

    #[test]
    fn test_trailing_slash_variants_stay_distinct() {
        let links = ["https://example.com/about", "https://example.com/about/"];
        let queue = filter_links(links, SEED, SEED);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_base_path_scope() {
        let prefix = "https://example.com/docs/";
        let links = [
            "https://example.com/docs/intro",
            "https://example.com/blog/post",
            "https://example.com/docs/",
        ];

        let queue = filter_links(links, prefix, "https://example.com/docs/");

        assert_eq!(queue.iter().collect::<Vec<_>>(), vec!["https://example.com/docs/intro".to_string()]);
    }

    #[test]
    fn test_unparseable_links_dropped() {
        let links = ["javascript:void(0)", "/relative", "https://example.com/ok"];
        let queue = filter_links(links, SEED, SEED);
        assert_eq!(queue.iter().collect::<Vec<_>>(), vec!["https://example.com/ok".to_string()]);
    }
}
