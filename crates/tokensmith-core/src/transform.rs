use std::fmt;
use std::str::FromStr;

use crate::{EngineError, Result};

const UPPER_CASE: &str = "toUpperCase";
const LOWER_CASE: &str = "toLowerCase";
const DOWN_CASE: &str = "toDownCase";
const GSUB: &str = "gsub(";

/// A value transformation attached to a placeholder, e.g. `[[NAME:gsub(-,_):toUpperCase]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformation {
    UpperCase,
    LowerCase,
    /// `gsub(old,new)`. An empty `old` replaces every space with `new`.
    Substitute { old: String, new: String },
}

impl Transformation {
    /// Parses a specifier. Names are case-sensitive and matched by prefix.
    pub fn parse(specifier: &str) -> Result<Self> {
        if specifier.starts_with(UPPER_CASE) {
            Ok(Transformation::UpperCase)
        } else if specifier.starts_with(LOWER_CASE) || specifier.starts_with(DOWN_CASE) {
            Ok(Transformation::LowerCase)
        } else if let Some(arguments) = specifier.strip_prefix(GSUB) {
            parse_gsub(specifier, arguments)
        } else {
            Err(EngineError::UnsupportedTransformation(specifier.to_string()))
        }
    }

    pub fn apply(&self, value: &str) -> String {
        match self {
            Transformation::UpperCase => value.to_uppercase(),
            Transformation::LowerCase => value.to_lowercase(),
            Transformation::Substitute { old, new } if old.is_empty() => value.replace(' ', new),
            Transformation::Substitute { old, new } => value.replace(old.as_str(), new),
        }
    }
}

// Arguments run up to the last ')' and split on the first ','; the rest is `new` verbatim.
fn parse_gsub(specifier: &str, arguments: &str) -> Result<Transformation> {
    let invalid = || EngineError::InvalidGsubArguments(specifier.to_string());
    let close = arguments.rfind(')').ok_or_else(invalid)?;
    let (old, new) = arguments[..close].split_once(',').ok_or_else(invalid)?;

    Ok(Transformation::Substitute {
        old: old.to_string(),
        new: new.to_string(),
    })
}

impl FromStr for Transformation {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Transformation::parse(s)
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transformation::UpperCase => f.write_str(UPPER_CASE),
            Transformation::LowerCase => f.write_str(LOWER_CASE),
            Transformation::Substitute { old, new } => write!(f, "gsub({},{})", old, new),
        }
    }
}

/// Applies already parsed transformations left to right.
pub fn apply_all(value: &str, transformations: &[Transformation]) -> String {
    transformations
        .iter()
        .fold(value.to_string(), |current, transformation| transformation.apply(&current))
}

/// Parses and applies raw specifiers in order, stopping at the first one that fails.
pub fn apply<S: AsRef<str>>(value: &str, specifiers: &[S]) -> Result<String> {
    let mut current = value.to_string();
    for specifier in specifiers {
        current = Transformation::parse(specifier.as_ref())?.apply(&current);
    }
    Ok(current)
}
