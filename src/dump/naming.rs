//! Dump file naming.
//!
//! `response-{version}-{service}-{date}-{kind}.json`, where version, service
//! and date come from the inbound request as the legacy or current client sent it.

use std::path::Path;

use crate::http::query::QueryParams;

/// Services recognised in v2 paths, in lookup order.
const V2_SERVICES: [&str; 3] = ["r1", "r2", "r3"];

/// Which schedule API an inbound path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    /// `pg/...`, e.g. `pg/list/130/r1/2026-02-04.json`.
    V2,
    /// `papiPgDateRadio?service=r1&date=...`.
    V3,
}

impl ApiVersion {
    /// Classify a path; `None` for anything else.
    pub fn classify(path: &str) -> Option<Self> {
        let path = path.trim_start_matches('/');
        if path.starts_with("pg") {
            Some(ApiVersion::V2)
        } else if path.starts_with("papiPgDateRadio") {
            Some(ApiVersion::V3)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V2 => "v2",
            ApiVersion::V3 => "v3",
        }
    }
}

/// Identifies the set of dump files for one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpTarget {
    pub version: ApiVersion,
    pub service: String,
    pub date: String,
}

impl DumpTarget {
    /// Derive the target from the inbound path and the query as received.
    pub fn from_request(path: &str, query: &QueryParams) -> Option<Self> {
        let version = ApiVersion::classify(path)?;
        let (service, date) = match version {
            ApiVersion::V2 => (v2_service(path), v2_date(path)),
            ApiVersion::V3 => (
                query.service().unwrap_or_default().to_string(),
                query.date().unwrap_or_default().to_string(),
            ),
        };
        Some(Self {
            version,
            service,
            date,
        })
    }

    fn file(&self, version: &str, kind: &str) -> String {
        format!(
            "response-{}-{}-{}-{}.json",
            version, self.service, self.date, kind
        )
    }

    /// Raw upstream bytes.
    pub fn dump_file(&self) -> String {
        self.file(self.version.as_str(), "dump")
    }

    /// Pretty-printed upstream JSON.
    pub fn readable_file(&self) -> String {
        self.file(self.version.as_str(), "readable")
    }

    /// Pretty-printed v2 translation; only written for v3 requests.
    pub fn converted_file(&self) -> Option<String> {
        match self.version {
            ApiVersion::V3 => Some(self.file(ApiVersion::V2.as_str(), "converted")),
            ApiVersion::V2 => None,
        }
    }
}

fn v2_service(path: &str) -> String {
    V2_SERVICES
        .iter()
        .find(|s| path.contains(*s))
        .map(|s| s.to_string())
        .unwrap_or_default()
}

fn v2_date(path: &str) -> String {
    Path::new(path.trim_start_matches('/'))
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
