//! v3 and v2 broadcast-schedule records.
//!
//! v3 (upstream):
//! ```text
//! { "<service>": { "publication": [ { "name", "description", "startDate", "endDate", ... } ] } }
//! ```
//! v2 (legacy clients):
//! ```text
//! { "list": { "<service>": [ { "start_time", "end_time", "title", "content" } ] } }
//! ```

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::translate::translator::TranslateError;

/// One program record as published by the v3 API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V3Publication {
    /// Program title.
    pub name: String,
    /// Program synopsis.
    pub description: String,
    /// ISO timestamp.
    pub start_date: String,
    /// ISO timestamp.
    pub end_date: String,
}

impl V3Publication {
    pub const NAME: &'static str = "name";
    pub const DESCRIPTION: &'static str = "description";
    pub const START_DATE: &'static str = "startDate";
    pub const END_DATE: &'static str = "endDate";

    /// Extract the four required string fields from a `publication` entry.
    ///
    /// Unknown fields are ignored. A field that is absent or not a string is
    /// reported as missing, together with the entry's position in the list.
    pub fn from_value(index: usize, value: &Value) -> Result<Self, TranslateError> {
        let field = |field: &'static str| {
            value
                .get(field)
                .and_then(Value::as_str)
                .map(str::to_owned)
                .ok_or(TranslateError::FieldMissing { index, field })
        };

        Ok(Self {
            name: field(Self::NAME)?,
            description: field(Self::DESCRIPTION)?,
            start_date: field(Self::START_DATE)?,
            end_date: field(Self::END_DATE)?,
        })
    }
}

/// One program record in the layout legacy clients expect.
///
/// Field order here is the key order of the serialized object.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct V2Program {
    pub start_time: String,
    pub end_time: String,
    pub title: String,
    pub content: String,
}

impl From<V3Publication> for V2Program {
    fn from(p: V3Publication) -> Self {
        Self {
            start_time: p.start_date,
            end_time: p.end_date,
            title: p.name,
            content: p.description,
        }
    }
}

/// `{"list": {<service>: [...]}}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V2Envelope {
    pub service: String,
    pub programs: Vec<V2Program>,
}

impl V2Envelope {
    /// Compact JSON body sent to the client.
    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

impl Serialize for V2Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let list = BTreeMap::from([(self.service.as_str(), &self.programs)]);
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("list", &list)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_publication_maps_fields_by_name() {
        let raw = json!({
            "name": "Morning News",
            "description": "Headlines",
            "startDate": "2026-02-05T05:00:03",
            "endDate": "2026-02-05T05:50:00",
            "id": "ignored"
        });
        let program = V2Program::from(V3Publication::from_value(0, &raw).unwrap());

        assert_eq!(program.start_time, "2026-02-05T05:00:03");
        assert_eq!(program.end_time, "2026-02-05T05:50:00");
        assert_eq!(program.title, "Morning News");
        assert_eq!(program.content, "Headlines");
    }

    #[test]
    fn test_non_string_field_counts_as_missing() {
        let raw = json!({
            "name": "A",
            "description": null,
            "startDate": "s",
            "endDate": "e"
        });
        let err = V3Publication::from_value(3, &raw).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::FieldMissing { index: 3, field: "description" }
        ));
    }

    #[test]
    fn test_v2_program_key_order() {
        let env = V2Envelope {
            service: "r1".into(),
            programs: vec![V2Program {
                start_time: "s".into(),
                end_time: "e".into(),
                title: "t".into(),
                content: "c".into(),
            }],
        };
        let body = String::from_utf8(env.to_vec().unwrap()).unwrap();
        assert_eq!(
            body,
            r#"{"list":{"r1":[{"start_time":"s","end_time":"e","title":"t","content":"c"}]}}"#
        );
    }
}
