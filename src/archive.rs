//! Payload and receipt types for the external archive service.
//!
//! The service itself is a page-provided client (`window.supabaseClient`);
//! this module only shapes what is sent and parses what comes back.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{NarrativeError, Result};

/// Reflection answers sent alongside the photo. Blank answers become `null`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveFields {
    pub origin: Option<String>,
    pub emotion: Option<String>,
    pub connection: Option<String>,
    pub connection_1: Option<String>,
    pub connection_2: Option<String>,
    pub connection_3: Option<String>,
    pub connection_4: Option<String>,
    pub connection_5: Option<String>,
}

impl ArchiveFields {
    /// Build from `(archive field, raw answer)` pairs.
    pub fn from_answers<'a, I>(answers: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut fields = Self::default();
        for (name, raw) in answers {
            let value = Some(raw.trim()).filter(|v| !v.is_empty()).map(str::to_owned);
            let slot = match name {
                "origin" => &mut fields.origin,
                "emotion" => &mut fields.emotion,
                "connection" => &mut fields.connection,
                "connection_1" => &mut fields.connection_1,
                "connection_2" => &mut fields.connection_2,
                "connection_3" => &mut fields.connection_3,
                "connection_4" => &mut fields.connection_4,
                "connection_5" => &mut fields.connection_5,
                other => {
                    warn!("ignoring answer for unknown archive field `{other}`");
                    continue;
                }
            };
            *slot = value;
        }
        fields
    }

    pub fn answered(&self) -> usize {
        [
            &self.origin,
            &self.emotion,
            &self.connection,
            &self.connection_1,
            &self.connection_2,
            &self.connection_3,
            &self.connection_4,
            &self.connection_5,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct UploadedFile {
    pub path: String,
    #[serde(rename = "publicURL", default)]
    pub public_url: Option<String>,
}

/// What the archive service returns on success.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ArchiveReceipt {
    #[serde(default)]
    pub uploaded: Option<UploadedFile>,
    #[serde(default)]
    pub record: serde_json::Value,
}

impl ArchiveReceipt {
    /// Parse the service reply as serialized by `JSON.stringify`; `None` means
    /// the promise resolved to nothing serializable.
    pub fn from_response(json: Option<&str>) -> Result<Self> {
        let json = json.ok_or_else(|| NarrativeError::Archive("archive service returned no response".into()))?;
        serde_json::from_str(json)
            .map_err(|e| NarrativeError::Archive(format!("unexpected archive response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_answers_are_null() {
        let fields = ArchiveFields::from_answers([
            ("origin", "  my brush  "),
            ("emotion", "   "),
            ("connection_3", "my mother"),
            ("shoe_size", "42"),
        ]);
        assert_eq!(fields.origin.as_deref(), Some("my brush"));
        assert_eq!(fields.emotion, None);
        assert_eq!(fields.connection_3.as_deref(), Some("my mother"));
        assert_eq!(fields.answered(), 2);

        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["origin"], "my brush");
        assert!(json["emotion"].is_null());
        assert!(json["connection_5"].is_null());
    }

    #[test]
    fn receipt_parses_service_shape() {
        let receipt: ArchiveReceipt = serde_json::from_str(
            r#"{"uploaded":{"path":"2026-10-19/strand.png","publicURL":"https://cdn/x.png"},"record":{"id":7}}"#,
        )
        .unwrap();
        let up = receipt.uploaded.unwrap();
        assert_eq!(up.path, "2026-10-19/strand.png");
        assert_eq!(up.public_url.as_deref(), Some("https://cdn/x.png"));
        assert_eq!(receipt.record["id"], 7);

        let bare: ArchiveReceipt = serde_json::from_str(r#"{"uploaded":null,"record":null}"#).unwrap();
        assert!(bare.uploaded.is_none());
        assert!(bare.record.is_null());
    }

    #[test]
    fn bad_replies_are_archive_errors() {
        for reply in [None, Some("[1, 2]"), Some("not json")] {
            let err = ArchiveReceipt::from_response(reply).unwrap_err();
            assert!(matches!(err, NarrativeError::Archive(_)), "{reply:?} gave {err:?}");
            assert!(!err.to_string().contains("config"));
        }
        let ok = ArchiveReceipt::from_response(Some(r#"{"uploaded":null,"record":{"id":1}}"#)).unwrap();
        assert_eq!(ok.record["id"], 1);
    }
}
