//! Field validation for songs and request parameters.
//!
//! Errors are collected per field rather than failing on the first one, so
//! a caller can report every invalid field in a single response.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;

pub const SONG_TITLE_MAX_BYTES: usize = 500;
pub const SONG_GROUP_MAX_BYTES: usize = 5000;

/// Why a single field was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField,
    TooLong { max_bytes: usize },
    NotPositiveInteger,
    OutOfRange { min: u64, max: u64 },
    NotInSafelist,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField => write!(f, "must be provided"),
            ValidationError::TooLong { max_bytes } => {
                write!(f, "must not be more than {} bytes long", max_bytes)
            }
            ValidationError::NotPositiveInteger => write!(f, "must be a positive integer"),
            ValidationError::OutOfRange { min, max } => {
                write!(f, "must be between {} and {}", min, max)
            }
            ValidationError::NotInSafelist => write!(f, "invalid sort value"),
        }
    }
}

/// Accumulates at most one error per field; later errors for a field that
/// already failed are dropped.
#[derive(Debug, Default)]
pub struct Validator {
    errors: BTreeMap<&'static str, ValidationError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, field: &'static str, error: ValidationError) {
        self.errors.entry(field).or_insert(error);
    }

    pub fn check(&mut self, ok: bool, field: &'static str, error: ValidationError) {
        if !ok {
            self.add_error(field, error);
        }
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok` when nothing failed, otherwise every collected field error.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

/// The complete set of field errors of one validation pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<&'static str, ValidationError>);

impl ValidationErrors {
    pub fn single(field: &'static str, error: ValidationError) -> Self {
        Self(BTreeMap::from([(field, error)]))
    }

    pub fn get(&self, field: &str) -> Option<&ValidationError> {
        self.0.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, error) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, error)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, error) in &self.0 {
            map.serialize_entry(field, &error.to_string())?;
        }
        map.end()
    }
}

/// Checks the caller-writable fields of a song.
pub fn validate_song(v: &mut Validator, title: &str, group: &str) {
    v.check(!title.is_empty(), "song", ValidationError::EmptyField);
    v.check(
        title.len() <= SONG_TITLE_MAX_BYTES,
        "song",
        ValidationError::TooLong {
            max_bytes: SONG_TITLE_MAX_BYTES,
        },
    );

    v.check(!group.is_empty(), "group", ValidationError::EmptyField);
    v.check(
        group.len() <= SONG_GROUP_MAX_BYTES,
        "group",
        ValidationError::TooLong {
            max_bytes: SONG_GROUP_MAX_BYTES,
        },
    );
}
