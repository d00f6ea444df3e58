use regex::Regex;

/// Join every readable-text fragment of an article page with single spaces.
///
/// Empty output means the page had no content the pattern recognises.
pub fn scrub(page: &str, pattern: &Regex) -> String {
    pattern
        .captures_iter(page)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{builtin, Source};

    fn text_re() -> Regex {
        Source::compile(&builtin()[0]).unwrap().text
    }

    #[test]
    fn single_span() {
        let page = r#"<span style="font-weight: 400;">Acme Robotics is hiring.</span>"#;
        assert_eq!(scrub(page, &text_re()), "Acme Robotics is hiring.");
    }

    #[test]
    fn spans_joined_in_order() {
        let page = std::fs::read_to_string("tests/fixtures/sifted_article.html").unwrap();
        let text = scrub(&page, &text_re());
        assert!(text.starts_with("Acme Robotics raised"));
        assert!(text.contains(". Benevolent Labs"));
        assert!(!text.contains("<span"));
    }

    #[test]
    fn no_fragments_is_empty() {
        assert_eq!(scrub("<div>plain</div>", &text_re()), "");
    }
}
