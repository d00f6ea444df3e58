use regex::Regex;

/// Collect article-path fragments from a search-results page, in document order.
///
/// The first capture group is taken when the pattern has one, otherwise the
/// whole match. Duplicates are kept; a page with no matches yields an empty Vec.
pub fn extract(page: &str, pattern: &Regex) -> Vec<String> {
    pattern
        .captures_iter(page)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{builtin, Source};

    fn sifted() -> Source {
        Source::compile(&builtin()[0]).unwrap()
    }

    #[test]
    fn sifted_search_page() {
        let page = std::fs::read_to_string("tests/fixtures/sifted_search.html").unwrap();
        let links = extract(&page, &sifted().links);
        assert_eq!(
            links,
            vec![
                "healthtech-ai-diagnostics-funding/",
                "acme-robotics-series-a/",
                "healthtech-ai-diagnostics-funding/",
            ]
        );
    }

    #[test]
    fn no_match_is_empty() {
        assert!(extract("<html><body>nothing here</body></html>", &sifted().links).is_empty());
        assert!(extract("", &sifted().links).is_empty());
    }

    #[test]
    fn whole_match_without_group() {
        let re = Regex::new(r"/a/[a-z]+").unwrap();
        assert_eq!(extract("x /a/one y /a/two", &re), vec!["/a/one", "/a/two"]);
    }

    #[test]
    fn repeated_calls_agree() {
        let page = std::fs::read_to_string("tests/fixtures/sifted_search.html").unwrap();
        let re = sifted().links;
        assert_eq!(extract(&page, &re), extract(&page, &re));
    }
}
