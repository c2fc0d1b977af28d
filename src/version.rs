//! API version identifiers.
//!
//! A service declares its versions either as small integers ("1", "2") or as
//! calendar dates ("2024-01-01"). One format is active per service; tokens
//! are parsed against that format only.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::VersionError;

/// Identifier distinguishing API generations.
///
/// Versions are totally ordered so registries can report the newest declared
/// version. A service never mixes the two forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ApiVersion {
    /// Numeric generation, e.g. `1` for `/api/v1`.
    Number(u32),
    /// Date-based generation, e.g. `2024-01-01`.
    Date(NaiveDate),
}

impl ApiVersion {
    /// Parse a raw token against the given format.
    ///
    /// Tokens are strict: integers must be plain base-10 digits, dates must
    /// be ISO `YYYY-MM-DD`. Anything else is an `InvalidVersionFormat`.
    pub fn parse(token: &str, format: VersionFormat) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidVersionFormat {
            token: token.to_string(),
        };

        match format {
            VersionFormat::Integer => token
                .parse::<u32>()
                .map(ApiVersion::Number)
                .map_err(|_| invalid()),
            VersionFormat::Date => NaiveDate::parse_from_str(token, "%Y-%m-%d")
                .map(ApiVersion::Date)
                .map_err(|_| invalid()),
        }
    }

    /// Canonical string form, identical to the accepted token form.
    pub fn as_token(&self) -> String {
        self.to_string()
    }

    /// Group name used to key generated documentation documents ("v1",
    /// "v2024-01-01").
    pub fn group_name(&self) -> String {
        format!("v{}", self)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiVersion::Number(n) => write!(f, "{}", n),
            ApiVersion::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Token format a service accepts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VersionFormat {
    /// Plain integers: "1", "2".
    #[default]
    Integer,
    /// ISO dates: "2024-01-01".
    Date,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer() {
        let v = ApiVersion::parse("2", VersionFormat::Integer).unwrap();
        assert_eq!(v, ApiVersion::Number(2));
        assert_eq!(v.to_string(), "2");
        assert_eq!(v.group_name(), "v2");
    }

    #[test]
    fn test_parse_date() {
        let v = ApiVersion::parse("2024-01-01", VersionFormat::Date).unwrap();
        assert_eq!(
            v,
            ApiVersion::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
        assert_eq!(v.to_string(), "2024-01-01");
        assert_eq!(v.group_name(), "v2024-01-01");
    }

    #[test]
    fn test_parse_rejects_wrong_format() {
        // A date token under integer format is malformed, not unsupported.
        let err = ApiVersion::parse("2024-01-01", VersionFormat::Integer).unwrap_err();
        assert!(matches!(err, VersionError::InvalidVersionFormat { .. }));

        let err = ApiVersion::parse("1", VersionFormat::Date).unwrap_err();
        assert!(matches!(err, VersionError::InvalidVersionFormat { .. }));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for token in ["", "v1", "1.0", "-1", "2024-13-40", "latest"] {
            assert!(
                ApiVersion::parse(token, VersionFormat::Integer).is_err(),
                "integer format accepted {:?}",
                token
            );
            assert!(
                ApiVersion::parse(token, VersionFormat::Date).is_err(),
                "date format accepted {:?}",
                token
            );
        }
    }

    #[test]
    fn test_ordering() {
        assert!(ApiVersion::Number(1) < ApiVersion::Number(2));

        let older = ApiVersion::parse("2024-01-01", VersionFormat::Date).unwrap();
        let newer = ApiVersion::parse("2024-09-20", VersionFormat::Date).unwrap();
        assert!(older < newer);
    }
}
