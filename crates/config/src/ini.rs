//! INI cloud-config reader exposed as a figment provider
//!
//! Tokenizing is done by `rust-ini`; this module adds the cloud-config rules
//! on top of it:
//!
//! ```ini
//! [Global]
//! api-url = https://cloudstack.example/client/api
//! ssl-no-verify = true
//!
//! [custom-command]
//! associate-ip = "acquireIP"
//! ```
//!
//! Section and key names are case-insensitive and are stored lowercased.
//! Every key must live in a section. Values are kept as strings; typing
//! happens when figment extracts them.

use figment::{
    value::{Dict, Map, Tag, Value},
    Metadata, Profile, Provider,
};
use ::ini::Ini;
use std::collections::BTreeMap;
use thiserror::Error;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Error reading an INI document
#[derive(Error, Debug)]
pub enum IniError {
    /// Tokenizer error, carrying line and column
    #[error("{0}")]
    Syntax(#[from] ::ini::ParseError),

    #[error("key {0:?} appears before any section header")]
    KeyOutsideSection(String),

    #[error("invalid section name {0:?}")]
    InvalidSectionName(String),

    #[error("invalid key name {key:?} in section [{section}]")]
    InvalidKey { section: String, key: String },
}

/// A parsed INI document: section name to key/value pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl IniDocument {
    /// Parse INI text. A leading byte-order mark is ignored.
    pub fn parse(text: &str) -> Result<Self, IniError> {
        let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
        let parsed = Ini::load_from_str(text)?;

        let mut document = IniDocument::default();
        for (section, properties) in parsed.iter() {
            let Some(section) = section else {
                if let Some((key, _)) = properties.iter().next() {
                    return Err(IniError::KeyOutsideSection(key.trim().to_string()));
                }
                continue;
            };

            let section = section.trim();
            if !is_valid_name(section, true) {
                return Err(IniError::InvalidSectionName(section.to_string()));
            }
            let entries = document.sections.entry(section.to_ascii_lowercase()).or_default();

            // Repeated sections merge; a repeated key keeps its last value.
            for (key, value) in properties.iter() {
                let key = key.trim();
                if !is_valid_name(key, false) {
                    return Err(IniError::InvalidKey {
                        section: section.to_string(),
                        key: key.to_string(),
                    });
                }
                entries.insert(key.to_ascii_lowercase(), value.trim().to_string());
            }
        }

        Ok(document)
    }

    /// Lowercased names of all sections seen, including empty ones
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Look up a raw value by (case-insensitive) section and key
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(&section.to_ascii_lowercase())
            .and_then(|entries| entries.get(&key.to_ascii_lowercase()))
            .map(String::as_str)
    }
}

impl Provider for IniDocument {
    fn metadata(&self) -> Metadata {
        Metadata::named("INI cloud config")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        let mut root = Dict::new();
        for (section, entries) in &self.sections {
            let dict: Dict = entries
                .iter()
                .map(|(key, value)| (key.clone(), Value::String(Tag::Default, value.clone())))
                .collect();
            root.insert(section.clone(), Value::Dict(Tag::Default, dict));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, root);
        Ok(map)
    }
}

/// Names start with a letter; sections may also contain dots
fn is_valid_name(name: &str, allow_dot: bool) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || (allow_dot && c == '.'))
}
