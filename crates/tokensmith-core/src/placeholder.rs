use crate::transform::{apply_all, Transformation};
use crate::{EngineError, Result};

/// Separates the base key from its transformation specifiers.
pub const TRANSFORM_SEPARATOR: char = ':';

/// A parsed placeholder body such as `APP_NAME:gsub(-,_):toUpperCase`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderToken {
    pub base_key: String,
    pub transformations: Vec<Transformation>,
}

impl PlaceholderToken {
    pub fn parse(body: &str) -> Result<Self> {
        let (base_key, specifiers) = split_placeholder(body)?;
        let transformations = specifiers
            .into_iter()
            .map(Transformation::parse)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            base_key: base_key.to_string(),
            transformations,
        })
    }

    /// Runs `value` through this placeholder's transformations.
    pub fn resolve(&self, value: &str) -> String {
        apply_all(value, &self.transformations)
    }
}

/// Splits a body into its base key and raw specifiers without interpreting them.
pub fn split_placeholder(body: &str) -> Result<(&str, Vec<&str>)> {
    let base_key = base_key_of(body)?;
    let specifiers = match body.split_once(TRANSFORM_SEPARATOR) {
        Some((_, rest)) => rest.split(TRANSFORM_SEPARATOR).collect(),
        None => Vec::new(),
    };
    Ok((base_key, specifiers))
}

/// The lookup name of a placeholder body; everything after the first separator is ignored.
pub fn base_key_of(body: &str) -> Result<&str> {
    if body.trim().is_empty() {
        return Err(EngineError::EmptyPlaceholder);
    }
    let base_key = body
        .split_once(TRANSFORM_SEPARATOR)
        .map_or(body, |(base_key, _)| base_key);
    if base_key.is_empty() {
        return Err(EngineError::EmptyPlaceholder);
    }
    Ok(base_key)
}
