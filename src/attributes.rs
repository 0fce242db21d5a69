//! Attribute assignments given as option strings, e.g. `"LutInterp=1, Ident=lut"`.

use std::str::FromStr;

use crate::error::{MappingError, Result};

/// One `key=value` pair of an option string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Assignment<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

impl Assignment<'_> {
    /// Case-insensitive key comparison.
    pub fn is(&self, name: &str) -> bool {
        self.key.eq_ignore_ascii_case(name)
    }

    pub fn parse<T: FromStr>(&self) -> Result<T> {
        self.value.parse().map_err(|_| {
            MappingError::invalid(format!(
                "cannot parse value {:?} of attribute {}",
                self.value, self.key
            ))
        })
    }

    pub fn unknown(&self, class: &str) -> MappingError {
        MappingError::invalid(format!("unknown attribute {:?} for {class}", self.key))
    }
}

/// Split a comma-separated list of attribute assignments.
///
/// An empty (or all-whitespace) string yields no assignments.
pub(crate) fn assignments(options: &str) -> Result<Vec<Assignment<'_>>> {
    options
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (key, value) = item.split_once('=').ok_or_else(|| {
                MappingError::invalid(format!("attribute assignment {item:?} has no '='"))
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(MappingError::invalid(format!(
                    "attribute assignment {item:?} has no name"
                )));
            }
            Ok(Assignment {
                key,
                value: value.trim(),
            })
        })
        .collect()
}

/// Attributes common to every mapping.
///
/// `Ident` is carried over to copies, `ID` belongs to one object and is reset by `clone`.
/// Only `Ident` takes part in comparisons.
#[derive(Debug, Default)]
pub struct Attributes {
    ident: String,
    id: String,
}

impl Clone for Attributes {
    fn clone(&self) -> Self {
        Self {
            ident: self.ident.clone(),
            id: String::new(),
        }
    }
}

impl PartialEq for Attributes {
    fn eq(&self, other: &Self) -> bool {
        self.ident == other.ident
    }
}

impl Eq for Attributes {}

impl Attributes {
    /// Parse an option string that may only contain common attributes.
    pub(crate) fn from_options(class: &str, options: &str) -> Result<Self> {
        let mut attributes = Self::default();
        for assignment in assignments(options)? {
            if !attributes.set(&assignment) {
                return Err(assignment.unknown(class));
            }
        }
        Ok(attributes)
    }

    /// Apply `assignment` if it names a common attribute.
    /// Returns `false` for keys this type does not know.
    pub(crate) fn set(&mut self, assignment: &Assignment<'_>) -> bool {
        if assignment.is("Ident") {
            self.ident = assignment.value.to_owned();
        } else if assignment.is("ID") {
            self.id = assignment.value.to_owned();
        } else {
            return false;
        }
        true
    }

    /// Free-form identification string.
    pub fn ident(&self) -> &str {
        &self.ident
    }

    pub(crate) fn set_ident(&mut self, ident: impl Into<String>) {
        self.ident = ident.into();
    }

    /// Identification string of this object only; empty on copies.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }
}
