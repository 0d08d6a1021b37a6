use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::records::AbbreviationRecord;

/// Width of every vertex code
pub const CODE_WIDTH: usize = 4;

/// Joins two codes into a composite identifier such as `VLAD_NAHO`
pub const SEPARATOR: char = '_';

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AbbrevError {
    #[error("Invalid abbreviation {code:?} for {name}: expected 4 ASCII letters or digits")]
    InvalidCode { name: String, code: String },
    #[error("Vertex {0} is abbreviated twice")]
    DuplicateName(String),
    #[error("Abbreviation {code} is used for both {first} and {second}")]
    DuplicateCode {
        code: String,
        first: String,
        second: String,
    },
    #[error("No abbreviation for vertex {0}")]
    UnknownName(String),
    #[error("Unknown abbreviation {0}")]
    UnknownCode(String),
}

/// A validated vertex code: exactly [`CODE_WIDTH`] ASCII alphanumeric characters.
///
/// Since a code never contains [`SEPARATOR`] and is always `CODE_WIDTH` bytes long, composite
/// identifiers built from two codes can be split at a fixed offset.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Code([u8; CODE_WIDTH]);

impl Code {
    pub fn parse(text: &str) -> Option<Code> {
        let bytes: [u8; CODE_WIDTH] = text.as_bytes().try_into().ok()?;
        if bytes.iter().all(|b| b.is_ascii_alphanumeric()) {
            Some(Code(bytes))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII bytes are ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// `<self>_<other>`
    pub fn join(&self, other: &Code) -> String {
        format!("{}{}{}", self, SEPARATOR, other)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Code {
    type Error = AbbrevError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Code::parse(&value).ok_or(AbbrevError::InvalidCode {
            name: String::new(),
            code: value,
        })
    }
}

impl From<Code> for String {
    fn from(code: Code) -> Self {
        code.to_string()
    }
}

/// Bidirectional, exactly invertible mapping between vertex names and codes
#[derive(Debug, Clone, Default)]
pub struct AbbreviationRegistry {
    to_code: BTreeMap<String, Code>,
    to_name: BTreeMap<Code, String>,
}

impl AbbreviationRegistry {
    /// Build the registry, rejecting malformed codes and anything that is not a bijection.
    pub fn from_records(records: &[AbbreviationRecord]) -> Result<Self, AbbrevError> {
        let mut registry = Self::default();
        for record in records {
            registry.insert(&record.name, &record.code)?;
        }
        Ok(registry)
    }

    pub fn insert(&mut self, name: &str, code: &str) -> Result<(), AbbrevError> {
        let parsed = Code::parse(code).ok_or_else(|| AbbrevError::InvalidCode {
            name: name.to_string(),
            code: code.to_string(),
        })?;
        if self.to_code.contains_key(name) {
            return Err(AbbrevError::DuplicateName(name.to_string()));
        }
        if let Some(first) = self.to_name.get(&parsed) {
            return Err(AbbrevError::DuplicateCode {
                code: code.to_string(),
                first: first.clone(),
                second: name.to_string(),
            });
        }
        self.to_code.insert(name.to_string(), parsed);
        self.to_name.insert(parsed, name.to_string());
        Ok(())
    }

    pub fn code(&self, name: &str) -> Result<Code, AbbrevError> {
        self.to_code
            .get(name)
            .copied()
            .ok_or_else(|| AbbrevError::UnknownName(name.to_string()))
    }

    pub fn name(&self, code: &str) -> Result<&str, AbbrevError> {
        Code::parse(code)
            .and_then(|c| self.to_name.get(&c))
            .map(String::as_str)
            .ok_or_else(|| AbbrevError::UnknownCode(code.to_string()))
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.to_code.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.to_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_code.is_empty()
    }

    /// All `(name, code)` pairs ordered by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, Code)> {
        self.to_code.iter().map(|(n, c)| (n.as_str(), *c))
    }
}
