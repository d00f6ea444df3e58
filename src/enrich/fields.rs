//! Firmographic fields on an organization profile page.

use std::sync::LazyLock;

use regex::Regex;

use super::CompanyRecord;

static TOTAL_FUNDING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"<span class="component--field-formatter field-type-money ng-star-inserted""#,
        r#" title="\$([0-9.MB]+)">\$(?:[0-9.MB]+)</span>"#,
    ))
    .unwrap()
});

static N_EMPLOYEES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"<a class="component--field-formatter field-type-enum link-accent ng-star-inserted""#,
        r#" href="/search/people/field/organizations/num_employees_enum/(?:[a-z0-9_\-]+)">([0-9\-]+)</a>"#,
    ))
    .unwrap()
});

static SERIES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"<a class="component--field-formatter field-type-enum link-accent ng-star-inserted""#,
        r#" href="/search/funding_rounds/field/organizations/last_funding_type/(?:[a-z0-9_\-]+)">([A-Za-z\s]+)</a>"#,
    ))
    .unwrap()
});

static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"<a _ngcontent-sc240="" title="(?:[A-Za-z\s]+)" class="link-accent ng-star-inserted""#,
        r#" href="/search/organizations/field/organizations/location_identifiers/(?:[a-z0-9_\-]+)"> "#,
        r#"([A-Za-z\s]+)</a>"#,
    ))
    .unwrap()
});

static WEBSITE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"href="(?:[htps:/]*www\.[a-z\-]+\.[a-z]+/?)" target="_blank" "#,
        r#"title="(?:[htps:/]*www\.[a-z\-]+\.[a-z]+/?)" "#,
        r#"aria-label="([htps:/]*www\.[a-z\-]+\.[a-z]+/?)"> "#,
    ))
    .unwrap()
});

fn captures(re: &Regex, page: &str) -> Vec<String> {
    re.captures_iter(page)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Fill every field of a record from one profile page.
pub fn extract(page: &str) -> CompanyRecord {
    CompanyRecord {
        total_funding: captures(&TOTAL_FUNDING_RE, page),
        n_employees: captures(&N_EMPLOYEES_RE, page),
        // Only the most recent round is listed first.
        series: captures(&SERIES_RE, page).into_iter().take(1).collect(),
        location: captures(&LOCATION_RE, page),
        website: captures(&WEBSITE_RE, page),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_fixture() {
        let page = std::fs::read_to_string("tests/fixtures/organization.html").unwrap();
        let r = extract(&page);
        assert_eq!(r.total_funding, vec!["292.1M"]);
        assert_eq!(r.n_employees, vec!["251-500"]);
        assert_eq!(r.series, vec!["Series C"]);
        assert_eq!(r.location, vec!["London", "England", "United Kingdom"]);
        assert_eq!(r.website, vec!["https://www.benevolent.com/"]);
    }

    #[test]
    fn unrelated_page_is_empty() {
        let r = extract("<html><body>nothing here</body></html>");
        assert!(r.is_empty());
    }
}
