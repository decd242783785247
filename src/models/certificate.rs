use serde::Serialize;
use serde_json::Value;

use crate::error::EntryError;

/// Root of the certificates config document.
/// Entries are kept as raw JSON so one bad entry never fails the whole document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CertificateConfig {
    pub certificates: Vec<Value>,
}

impl CertificateConfig {
    /// Extract the `certificates` list from a decoded document.
    /// Returns `None` when the root is not an object or the list is absent,
    /// `null` or not an array.
    pub fn from_value(doc: Value) -> Option<Self> {
        match doc {
            Value::Object(mut map) => match map.remove("certificates") {
                Some(Value::Array(certificates)) => Some(CertificateConfig { certificates }),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    /// Validate every entry, keeping document order.
    pub fn entries(&self) -> Vec<Result<CertificateEntry, EntryError>> {
        self.certificates
            .iter()
            .map(CertificateEntry::from_value)
            .collect()
    }
}

/// One validated certificate record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificateEntry {
    pub name: String,
    pub issuer: String,
    pub image: Option<String>,
    pub pdf: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub skills: Vec<String>,
}

impl CertificateEntry {
    /// Validate a raw entry. `name` and `issuer` must be non-empty strings;
    /// optional fields that are empty or not strings are treated as absent.
    pub fn from_value(value: &Value) -> Result<Self, EntryError> {
        let obj = value.as_object().ok_or(EntryError::NotAnObject)?;

        let text = |key: &str| -> Option<String> {
            obj.get(key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        };

        let name = text("name").ok_or(EntryError::MissingField("name"))?;
        let issuer = text("issuer").ok_or(EntryError::MissingField("issuer"))?;

        let skills = match obj.get("skills") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|s| s.as_str())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect(),
            _ => Vec::new(),
        };

        Ok(CertificateEntry {
            name,
            issuer,
            image: text("image"),
            pdf: text("pdf"),
            date: text("date"),
            kind: text("type"),
            skills,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_requires_certificates_array() {
        assert!(CertificateConfig::from_value(json!({})).is_none());
        assert!(CertificateConfig::from_value(json!({"certificates": null})).is_none());
        assert!(CertificateConfig::from_value(json!({"certificates": {"a": 1}})).is_none());
        assert!(CertificateConfig::from_value(json!([1, 2])).is_none());
        let cfg = CertificateConfig::from_value(json!({"certificates": []})).unwrap();
        assert!(cfg.is_empty());
    }

    #[test]
    fn test_entry_full() {
        let e = CertificateEntry::from_value(&json!({
            "name": "Rust Fundamentals",
            "issuer": "Ferris Academy",
            "image": "certificates/images/rust.png",
            "pdf": "certificates/pdfs/rust.pdf",
            "date": "March 2024",
            "type": "Course",
            "skills": ["Ownership", "Lifetimes"]
        }))
        .unwrap();
        assert_eq!(e.name, "Rust Fundamentals");
        assert_eq!(e.issuer, "Ferris Academy");
        assert_eq!(e.image.as_deref(), Some("certificates/images/rust.png"));
        assert_eq!(e.pdf.as_deref(), Some("certificates/pdfs/rust.pdf"));
        assert_eq!(e.date.as_deref(), Some("March 2024"));
        assert_eq!(e.kind.as_deref(), Some("Course"));
        assert_eq!(e.skills, vec!["Ownership", "Lifetimes"]);
    }

    #[test]
    fn test_entry_missing_required() {
        assert_eq!(
            CertificateEntry::from_value(&json!({"issuer": "X"})),
            Err(EntryError::MissingField("name"))
        );
        assert_eq!(
            CertificateEntry::from_value(&json!({"name": "X"})),
            Err(EntryError::MissingField("issuer"))
        );
        assert_eq!(
            CertificateEntry::from_value(&json!({"name": "", "issuer": "X"})),
            Err(EntryError::MissingField("name"))
        );
        assert_eq!(
            CertificateEntry::from_value(&json!({"name": 7, "issuer": "X"})),
            Err(EntryError::MissingField("name"))
        );
        assert_eq!(
            CertificateEntry::from_value(&json!("just a string")),
            Err(EntryError::NotAnObject)
        );
    }

    #[test]
    fn test_entry_optional_fields_lenient() {
        let e = CertificateEntry::from_value(&json!({
            "name": "N",
            "issuer": "I",
            "image": "",
            "pdf": 42,
            "type": null,
            "skills": ["a", 1, "", "b"]
        }))
        .unwrap();
        assert!(e.image.is_none());
        assert!(e.pdf.is_none());
        assert!(e.kind.is_none());
        assert!(e.date.is_none());
        assert_eq!(e.skills, vec!["a", "b"]);
    }

    #[test]
    fn test_entries_keep_order() {
        let cfg = CertificateConfig::from_value(json!({"certificates": [
            {"name": "A", "issuer": "X"},
            {"issuer": "no name"},
            {"name": "C", "issuer": "Z"}
        ]}))
        .unwrap();
        let entries = cfg.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].as_ref().unwrap().name, "A");
        assert!(entries[1].is_err());
        assert_eq!(entries[2].as_ref().unwrap().name, "C");
    }
}
