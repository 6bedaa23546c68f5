//! Query parameter handling.
//!
//! # Responsibilities
//! - Parse the inbound query string into a mapping with unique keys
//! - Rewrite a compact `date=YYYYMMDD` into `date=YYYY-MM-DD`
//! - Re-encode the (possibly rewritten) mapping for the upstream URL
//!
//! # Design Decisions
//! - Keys keep the position of their first occurrence; the last value wins
//! - Normalization is silent: values it does not recognise are left alone

use indexmap::IndexMap;
use url::form_urlencoded;

/// Query parameter carrying the schedule date.
pub const DATE_PARAM: &str = "date";

/// Query parameter selecting the service (station grouping).
pub const SERVICE_PARAM: &str = "service";

/// Ordered query parameters with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: IndexMap<String, String>,
}

impl QueryParams {
    /// Parse a raw (still percent-encoded) query string.
    pub fn parse(query: Option<&str>) -> Self {
        let mut params = IndexMap::new();
        for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            params.insert(key.into_owned(), value.into_owned());
        }
        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn service(&self) -> Option<&str> {
        self.get(SERVICE_PARAM)
    }

    pub fn date(&self) -> Option<&str> {
        self.get(DATE_PARAM)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Rewrite `date` in place when it is in compact form.
    ///
    /// Returns the rewritten value when a change was made.
    pub fn normalize_date(&mut self) -> Option<&str> {
        let iso = self.date().and_then(compact_date_to_iso)?;
        let slot = self.params.get_mut(DATE_PARAM)?;
        *slot = iso;
        Some(slot.as_str())
    }

    /// Encode as `application/x-www-form-urlencoded`.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish()
    }
}

/// `YYYYMMDD` → `YYYY-MM-DD`; `None` for anything that is not exactly 8 ASCII digits.
pub fn compact_date_to_iso(value: &str) -> Option<String> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{}-{}-{}", &value[..4], &value[4..6], &value[6..]))
}
