use crate::{IdError, IdResult};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Kind prefix of a generated identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdPrefix {
    /// Bot configuration record (`bot_`).
    Bot,
    /// In-call function trace (`fc_`).
    FunctionCall,
    /// Post-call webhook receipt (`call_`).
    CallReceipt,
}

impl IdPrefix {
    /// Returns the textual prefix including the trailing underscore.
    pub fn as_str(self) -> &'static str {
        match self {
            IdPrefix::Bot => "bot_",
            IdPrefix::FunctionCall => "fc_",
            IdPrefix::CallReceipt => "call_",
        }
    }

    fn strip(input: &str) -> Option<(Self, &str)> {
        [IdPrefix::Bot, IdPrefix::FunctionCall, IdPrefix::CallReceipt]
            .into_iter()
            .find_map(|prefix| input.strip_prefix(prefix.as_str()).map(|rest| (prefix, rest)))
    }
}

/// An identifier of the form `<prefix><epoch millis>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrefixedId {
    prefix: IdPrefix,
    millis: i64,
}

impl PrefixedId {
    /// Builds the identifier for `prefix` at exactly `timestamp`.
    pub fn at(prefix: IdPrefix, timestamp: DateTime<Utc>) -> Self {
        Self {
            prefix,
            millis: timestamp.timestamp_millis(),
        }
    }

    /// Generate an identifier that is not yet taken.
    ///
    /// Starts from `now` and advances the millisecond component by one until `is_taken`
    /// returns `false` for the rendered identifier.
    ///
    /// This is designed to be called **inside the store's write lock**, with `is_taken`
    /// looking at the collection the new record is about to join.
    pub fn generate(
        prefix: IdPrefix,
        now: DateTime<Utc>,
        is_taken: impl Fn(&str) -> bool,
    ) -> Self {
        let mut candidate = Self::at(prefix, now);
        while is_taken(&candidate.to_string()) {
            candidate.millis += 1;
        }
        candidate
    }

    pub fn prefix(&self) -> IdPrefix {
        self.prefix
    }

    pub fn millis(&self) -> i64 {
        self.millis
    }
}

impl fmt::Display for PrefixedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix.as_str(), self.millis)
    }
}

impl FromStr for PrefixedId {
    type Err = IdError;

    fn from_str(s: &str) -> IdResult<Self> {
        let (prefix, digits) = IdPrefix::strip(s).ok_or_else(|| {
            IdError::InvalidInput(format!("Unknown identifier prefix: '{}'", s))
        })?;

        // Leading zeros would not survive a parse/render cycle.
        let canonical = digits == "0" || !digits.starts_with('0');
        if digits.is_empty() || !canonical || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdError::InvalidInput(format!(
                "Identifier must end with epoch milliseconds: '{}'",
                s
            )));
        }

        let millis = digits.parse::<i64>().map_err(|e| {
            IdError::InvalidInput(format!("Invalid epoch milliseconds '{}': {}", digits, e))
        })?;

        Ok(Self { prefix, millis })
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for PrefixedId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for PrefixedId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PrefixedId::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_754_388_000_123).unwrap()
    }

    #[test]
    fn test_at_renders_prefix_and_millis() {
        let id = PrefixedId::at(IdPrefix::Bot, fixed_now());
        assert_eq!(id.to_string(), "bot_1754388000123");

        let id = PrefixedId::at(IdPrefix::FunctionCall, fixed_now());
        assert_eq!(id.to_string(), "fc_1754388000123");

        let id = PrefixedId::at(IdPrefix::CallReceipt, fixed_now());
        assert_eq!(id.to_string(), "call_1754388000123");
    }

    #[test]
    fn test_generate_uses_now_when_free() {
        let id = PrefixedId::generate(IdPrefix::Bot, fixed_now(), |_| false);
        assert_eq!(id.millis(), 1_754_388_000_123);
    }

    #[test]
    fn test_generate_bumps_past_taken_ids() {
        let taken: HashSet<String> = ["bot_1754388000123", "bot_1754388000124"]
            .into_iter()
            .map(String::from)
            .collect();

        let id = PrefixedId::generate(IdPrefix::Bot, fixed_now(), |s| taken.contains(s));
        assert_eq!(id.to_string(), "bot_1754388000125");
    }

    #[test]
    fn test_generate_ignores_other_prefixes() {
        let id = PrefixedId::generate(IdPrefix::CallReceipt, fixed_now(), |s| {
            s == "fc_1754388000123"
        });
        assert_eq!(id.to_string(), "call_1754388000123");
    }

    #[test]
    fn test_parse_valid_identifier() {
        let id: PrefixedId = "call_1754388000123".parse().expect("should parse");
        assert_eq!(id.prefix(), IdPrefix::CallReceipt);
        assert_eq!(id.millis(), 1_754_388_000_123);
    }

    #[test]
    fn test_parse_rejects_unknown_prefix() {
        let result = "user_1754388000123".parse::<PrefixedId>();
        match result {
            Err(IdError::InvalidInput(msg)) => assert!(msg.contains("Unknown identifier prefix")),
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_parse_rejects_non_numeric_suffix() {
        assert!("bot_".parse::<PrefixedId>().is_err());
        assert!("bot_12ab".parse::<PrefixedId>().is_err());
        assert!("bot_-12".parse::<PrefixedId>().is_err());
        assert!("bot_0123".parse::<PrefixedId>().is_err());
    }

    #[test]
    fn test_serde_as_plain_string() {
        let id = PrefixedId::at(IdPrefix::FunctionCall, fixed_now());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"fc_1754388000123\"");

        let back: PrefixedId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
