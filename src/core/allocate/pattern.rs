//! Naming patterns for resolved timestamps.

use crate::error::ConfigError;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset};
use std::str::FromStr;

/// A strftime template producing the directory and file stem of a
/// destination, such as `%Y/%m/%d/%Y-%m-%d %H-%M`.
///
/// `/` separates directory levels. The counter and extension are appended by
/// the allocator, so the pattern names neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingPattern {
    template: String,
}

impl NamingPattern {
    /// Year/month/day directories holding `YYYY-MM-DD HH-MM NNN.ext`
    pub const DEFAULT: &'static str = "%Y/%m/%d/%Y-%m-%d %H-%M";

    /// Validate and wrap a template
    pub fn new(template: impl Into<String>) -> Result<Self, ConfigError> {
        let template = template.into();
        let invalid = |reason: &str| ConfigError::InvalidPattern {
            pattern: template.clone(),
            reason: reason.to_string(),
        };

        if template.trim().is_empty() {
            return Err(invalid("pattern is empty"));
        }
        if StrftimeItems::new(&template).any(|item| matches!(item, Item::Error)) {
            return Err(invalid("unsupported format specifier"));
        }
        if template.starts_with('/') || template.starts_with('\\') {
            return Err(invalid("must be relative to the output directory"));
        }
        if template.split(['/', '\\']).any(|part| part == "..") {
            return Err(invalid("must not leave the output directory"));
        }
        if template.ends_with('/') || template.ends_with('\\') {
            return Err(invalid("must end in a file name"));
        }

        Ok(Self { template })
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Substitute the timestamp's fields
    pub fn render(&self, time: &DateTime<FixedOffset>) -> String {
        time.format(&self.template).to_string()
    }
}

impl Default for NamingPattern {
    fn default() -> Self {
        Self {
            template: Self::DEFAULT.to_string(),
        }
    }
}

impl FromStr for NamingPattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for NamingPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.template)
    }
}
