use regex::Regex;

/// One way to respell a company slug after a not-found response.
#[derive(Debug, Clone)]
pub struct MutationRule {
    pub pattern: Regex,
    pub replacement: String,
}

impl MutationRule {
    pub fn new(pattern: &str, replacement: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: replacement.to_string(),
        })
    }

    /// The rewritten name, or `None` when the rule leaves it unchanged.
    pub fn apply(&self, name: &str) -> Option<String> {
        let out = self.pattern.replace(name, self.replacement.as_str());
        (out != name).then(|| out.into_owned())
    }
}

/// Ordered default rules: `benevolentai` → `benevolent-ai`, `antidote.me` → `antidote-me`.
pub fn default_rules() -> Vec<MutationRule> {
    vec![
        MutationRule::new(r"^([a-z0-9\-]+)ai$", "${1}-ai").unwrap(),
        MutationRule::new(r"^([a-z0-9\-]+)\.([a-z0-9\-]+)$", "${1}-${2}").unwrap(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ai_suffix() {
        let rules = default_rules();
        assert_eq!(rules[0].apply("benevolentai").as_deref(), Some("benevolent-ai"));
        assert_eq!(rules[0].apply("acme"), None);
    }

    #[test]
    fn dotted_name() {
        let rules = default_rules();
        assert_eq!(rules[1].apply("antidote.me").as_deref(), Some("antidote-me"));
        assert_eq!(rules[1].apply("a.b.c"), None);
    }

    #[test]
    fn custom_rule() {
        let r = MutationRule::new(r"^(.+)$", "${1}-inc").unwrap();
        assert_eq!(r.apply("acme").as_deref(), Some("acme-inc"));
        assert!(MutationRule::new("(", "x").is_err());
    }
}
