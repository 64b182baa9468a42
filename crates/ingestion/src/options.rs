//! The ingestion-option string parser.
//!
//! Grammar: `options ::= option (';' option)*` with
//! `option ::= name '=' value`; whitespace is allowed around tokens.
//! Names are ASCII (`[A-Za-z][A-Za-z0-9_]*`), values are runs of
//! non-whitespace non-`;` bytes. A duplicate name replaces the earlier
//! value.

use std::fmt;

use crate::error::{IngestionError, Result};

/// An ordered set of `name=value` ingestion options, unique by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionOptions {
    options: Vec<(String, String)>,
}

/// Cursor over the raw option string.
struct Scanner<'s> {
    bytes: &'s [u8],
    pos: usize,
}

impl<'s> Scanner<'s> {
    fn new(text: &'s str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// `[A-Za-z][A-Za-z0-9_]*`, or an empty slice when the next byte
    /// cannot start a name.
    fn scan_name(&mut self) -> &'s str {
        let start = self.pos;
        if matches!(self.peek(), Some(b) if b.is_ascii_alphabetic()) {
            self.pos += 1;
            while matches!(self.peek(), Some(b) if b == b'_' || b.is_ascii_alphanumeric()) {
                self.pos += 1;
            }
        }
        // Names are ASCII by construction, so the slice is valid UTF-8.
        std::str::from_utf8(&self.bytes[start..self.pos]).unwrap_or("")
    }

    /// A run of non-whitespace, non-`;` bytes.
    fn scan_value(&mut self) -> &'s str {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b != b';' && !b.is_ascii_whitespace()) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.bytes[start..self.pos]).unwrap_or("")
    }
}

impl IngestionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an option string like `"a=1; b = two ;c=3"`.
    pub fn parse(text: &str) -> Result<Self> {
        let mut options = IngestionOptions::new();
        let mut scanner = Scanner::new(text);

        loop {
            scanner.skip_whitespace();
            if scanner.peek().is_none() {
                break;
            }

            let name = scanner.scan_name();
            if name.is_empty() {
                return Err(IngestionError::OptionSyntax(
                    "expected option name".to_string(),
                ));
            }

            scanner.skip_whitespace();
            if scanner.peek() != Some(b'=') {
                return Err(IngestionError::OptionSyntax("expected '='".to_string()));
            }
            scanner.pos += 1;

            scanner.skip_whitespace();
            let value = scanner.scan_value();
            if value.is_empty() {
                return Err(IngestionError::OptionSyntax(
                    "expected option value".to_string(),
                ));
            }

            options.set(name, value);

            scanner.skip_whitespace();
            match scanner.peek() {
                None => break,
                Some(b';') => scanner.pos += 1,
                Some(_) => {
                    return Err(IngestionError::OptionSyntax(
                        "expected ';' between options".to_string(),
                    ))
                }
            }
        }

        Ok(options)
    }

    /// Set an option, replacing an earlier value for the same name.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.options.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.options.push((name.to_string(), value.to_string())),
        }
    }

    /// The value of an option, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Remove an option, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.options.iter().position(|(n, _)| n == name)?;
        Some(self.options.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Options in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl fmt::Display for IngestionOptions {
    /// Serialize back to the `name=value;name=value` form. Parsing the
    /// result reproduces the options exactly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.options.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_whitespace() {
        let options = IngestionOptions::parse("a=1; b = two ;c=3").unwrap();
        let parsed: Vec<(&str, &str)> = options.iter().collect();
        assert_eq!(parsed, [("a", "1"), ("b", "two"), ("c", "3")]);
    }

    #[test]
    fn test_duplicate_name_replaces() {
        let options = IngestionOptions::parse("a=1;a=2").unwrap();
        let parsed: Vec<(&str, &str)> = options.iter().collect();
        assert_eq!(parsed, [("a", "2")]);
    }

    #[test]
    fn test_missing_name_is_syntax_error() {
        assert!(matches!(
            IngestionOptions::parse("= 5"),
            Err(IngestionError::OptionSyntax(_))
        ));
    }

    #[test]
    fn test_missing_value_is_syntax_error() {
        assert!(matches!(
            IngestionOptions::parse("a="),
            Err(IngestionError::OptionSyntax(_))
        ));
        assert!(matches!(
            IngestionOptions::parse("a=;b=1"),
            Err(IngestionError::OptionSyntax(_))
        ));
    }

    #[test]
    fn test_missing_equals_is_syntax_error() {
        assert!(matches!(
            IngestionOptions::parse("abc"),
            Err(IngestionError::OptionSyntax(_))
        ));
    }

    #[test]
    fn test_name_must_start_alphabetic() {
        assert!(matches!(
            IngestionOptions::parse("1a=5"),
            Err(IngestionError::OptionSyntax(_))
        ));
        assert!(IngestionOptions::parse("a_1=5").is_ok());
    }

    #[test]
    fn test_empty_and_trailing_separator() {
        assert!(IngestionOptions::parse("").unwrap().is_empty());
        assert!(IngestionOptions::parse("   ").unwrap().is_empty());
        let options = IngestionOptions::parse("a=1;").unwrap();
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn test_round_trip() {
        let options = IngestionOptions::parse("a=1; b = two ;c=3").unwrap();
        let reparsed = IngestionOptions::parse(&options.to_string()).unwrap();
        assert_eq!(options, reparsed);
    }

    #[test]
    fn test_set_get_remove() {
        let mut options = IngestionOptions::new();
        options.set("band", "uv");
        options.set("band", "vis");
        assert_eq!(options.get("band"), Some("vis"));
        assert_eq!(options.remove("band"), Some("vis".to_string()));
        assert_eq!(options.get("band"), None);
    }
}
