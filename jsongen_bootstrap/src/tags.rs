//! Conditional-compilation tags.
//!
//! Tags arrive as one string and are threaded through three places: the cfg
//! header of the stub, the feature table of the launcher manifest, and the
//! feature flag of the toolchain invocation. In Rust the tags are cargo
//! features of the target crate.

use std::fmt::{self, Write as _};

/// Parsed build tags together with the string they were parsed from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildTags {
    raw: String,
    tags: Vec<String>,
}

impl BuildTags {
    /// Parses a tag string delimited by whitespace, commas or quotes.
    ///
    /// ```
    /// use jsongen_bootstrap::BuildTags;
    ///
    /// let tags = BuildTags::parse("fast 'extra',\"nightly\"");
    /// assert_eq!(tags.iter().collect::<Vec<_>>(), ["fast", "extra", "nightly"]);
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let tags = raw
            .split(|ch: char| ch.is_whitespace() || ch == ',')
            .map(|token| token.trim_matches(|ch| ch == '"' || ch == '\''))
            .filter(|token| !token.is_empty())
            .map(str::to_owned)
            .collect();
        Self {
            raw: raw.trim().to_owned(),
            tags,
        }
    }

    /// Returns `true` when no tag survived parsing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// The trimmed string the tags were parsed from.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Iterates over the individual tags in their original order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Value passed to the toolchain's feature flag.
    #[must_use]
    pub fn feature_list(&self) -> String {
        self.tags.join(",")
    }

    /// Inner attribute gating a whole source file on any of the tags.
    pub(crate) fn cfg_header(&self) -> Result<Option<String>, fmt::Error> {
        if self.is_empty() {
            return Ok(None);
        }
        let mut header = String::from("#![cfg(any(");
        for (idx, tag) in self.iter().enumerate() {
            if idx > 0 {
                header.push_str(", ");
            }
            write!(header, "feature = {tag:?}")?;
        }
        header.push_str("))]");
        Ok(Some(header))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for tag parsing.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty("", &[])]
    #[case::blank("   ", &[])]
    #[case::single("fast", &["fast"])]
    #[case::spaces("fast  nightly", &["fast", "nightly"])]
    #[case::commas("fast,nightly", &["fast", "nightly"])]
    #[case::quoted("'fast' \"nightly\"", &["fast", "nightly"])]
    #[case::quoted_empty("'' fast", &["fast"])]
    fn parses_tags(#[case] raw: &str, #[case] expected: &[&str]) {
        let tags = BuildTags::parse(raw);
        assert_eq!(tags.iter().collect::<Vec<_>>(), expected);
        assert_eq!(tags.is_empty(), expected.is_empty());
    }

    #[test]
    fn cfg_header_is_absent_without_tags() {
        let header = BuildTags::parse(" ").cfg_header().expect("render header");
        assert_eq!(header, None);
    }

    #[test]
    fn cfg_header_gates_on_any_tag() {
        let header = BuildTags::parse("fast nightly")
            .cfg_header()
            .expect("render header");
        assert_eq!(
            header.as_deref(),
            Some("#![cfg(any(feature = \"fast\", feature = \"nightly\"))]")
        );
    }

    #[test]
    fn feature_list_joins_with_commas() {
        assert_eq!(BuildTags::parse("a 'b' c").feature_list(), "a,b,c");
        assert_eq!(BuildTags::parse("").feature_list(), "");
    }
}
