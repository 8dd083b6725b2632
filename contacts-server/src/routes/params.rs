//! Query parameter helpers for the contact list endpoint.
//!
//! The struct follows Rocket's `FromForm` conventions and derives
//! `JsonSchema` so the generated OpenAPI document lists the parameters and
//! their defaults.

use rocket_okapi::okapi::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

use crate::store::ContactFilter;

const fn default_page() -> i64 {
    1
}

const fn default_page_size() -> i64 {
    10
}

const MAX_PAGE_SIZE: i64 = 100;

fn default_optional_string() -> Option<String> {
    None
}

fn normalize(value: Option<&String>) -> Option<String> {
    value
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Query parameters accepted by the contact list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, rocket::form::FromForm)]
#[serde(rename_all = "camelCase")]
pub struct ContactListParams {
    /// Optional search term matched case-insensitively against name and email.
    #[serde(default = "default_optional_string")]
    pub q: Option<String>,
    /// Optional tag slug; only contacts carrying that tag are returned.
    #[serde(default = "default_optional_string")]
    pub tag: Option<String>,
    /// One-based page index (defaults to the first page).
    #[field(default = 1)]
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of contacts per page (clamped between 1 and 100, default 10).
    #[field(default = 10)]
    #[serde(default = "default_page_size")]
    pub size: i64,
}

impl ContactListParams {
    /// Normalized 1-based page index.
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// Normalized page size capped at [`MAX_PAGE_SIZE`].
    pub fn size(&self) -> i64 {
        self.size.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.size()
    }

    /// Search criteria with blank values dropped.
    pub fn filter(&self) -> ContactFilter {
        ContactFilter {
            query: normalize(self.q.as_ref()),
            tag_slug: normalize(self.tag.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::form::Form;
    use rocket::http::RawStr;

    #[test]
    fn parses_contact_list_query() {
        let parsed: ContactListParams = Form::parse("q=ana&tag=vip&page=2&size=20").unwrap();
        assert_eq!(parsed.page(), 2);
        assert_eq!(parsed.size(), 20);
        assert_eq!(parsed.offset(), 20);

        let filter = parsed.filter();
        assert_eq!(filter.query.as_deref(), Some("ana"));
        assert_eq!(filter.tag_slug.as_deref(), Some("vip"));
    }

    #[test]
    fn defaults_apply_to_empty_query() {
        let parsed: ContactListParams = Form::parse("").unwrap();
        assert_eq!(parsed.page(), 1);
        assert_eq!(parsed.size(), 10);
        assert_eq!(parsed.offset(), 0);
        assert!(parsed.filter().query.is_none());
        assert!(parsed.filter().tag_slug.is_none());
    }

    #[test]
    fn single_filters_keep_paging_defaults() {
        let parsed: ContactListParams = Form::parse("q=example").unwrap();
        assert_eq!(parsed.filter().query.as_deref(), Some("example"));
        assert_eq!((parsed.page(), parsed.size()), (1, 10));

        let parsed: ContactListParams = Form::parse("tag=vip").unwrap();
        assert_eq!(parsed.filter().tag_slug.as_deref(), Some("vip"));
        assert!(parsed.filter().query.is_none());

        let parsed: ContactListParams = Form::parse("size=1").unwrap();
        assert_eq!((parsed.page(), parsed.size()), (1, 1));
    }

    #[test]
    fn blank_terms_are_ignored_and_sizes_clamped() {
        let parsed: ContactListParams =
            Form::parse_encoded(RawStr::new("q=%20%20&page=0&size=500")).unwrap();
        assert!(parsed.filter().query.is_none());
        assert_eq!(parsed.page(), 1);
        assert_eq!(parsed.size(), 100);
    }
}
