use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Maximum length of a single label in bytes.
pub const MAX_LABEL_LEN: usize = 63;

/// Maximum length of a dotted domain name in bytes (without the root dot).
pub const MAX_NAME_LEN: usize = 253;

/// One non-empty ASCII label of a domain name. Dots are separators, never
/// label content.
///
/// Labels are compared byte-exact. No case folding is applied: `WWW` and
/// `www` are different keys in a delegation record.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Label(String);

impl Label {
    /// Validate and wrap a label.
    pub fn new(s: impl Into<String>) -> Result<Self, TypeError> {
        let s = s.into();
        if s.is_empty() {
            return Err(TypeError::EmptyLabel(s));
        }
        if !s.is_ascii() {
            return Err(TypeError::NonAsciiLabel(s));
        }
        if s.contains('.') {
            return Err(TypeError::DotInLabel(s));
        }
        if s.len() > MAX_LABEL_LEN {
            return Err(TypeError::LabelTooLong {
                max: MAX_LABEL_LEN,
                actual: s.len(),
            });
        }
        Ok(Self(s))
    }

    /// Build a label from raw wire bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|_| TypeError::NonAsciiLabel(String::from_utf8_lossy(bytes).into_owned()))?;
        Self::new(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label({})", self.0)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Label {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.0
    }
}

/// A domain name as an ordered sequence of labels, leftmost first.
///
/// The root terminator is not a label: `www.example.test.` and
/// `www.example.test` parse to the same three labels, and `.` or the
/// empty string parse to zero labels.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct DomainName {
    labels: Vec<Label>,
}

impl DomainName {
    /// The root name (zero labels).
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a name from labels, leftmost first.
    pub fn from_labels(labels: Vec<Label>) -> Result<Self, TypeError> {
        let name = Self { labels };
        let len = name.text_len();
        if len > MAX_NAME_LEN {
            return Err(TypeError::NameTooLong {
                max: MAX_NAME_LEN,
                actual: len,
            });
        }
        Ok(name)
    }

    /// Parse a dotted name. At most one trailing dot is stripped; any other
    /// empty label is an error.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let trimmed = s.strip_suffix('.').unwrap_or(s);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let labels = trimmed
            .split('.')
            .map(|part| {
                if part.is_empty() {
                    Err(TypeError::EmptyLabel(s.to_string()))
                } else {
                    Label::new(part)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_labels(labels)
    }

    /// Labels, leftmost first.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Labels in walk order: top-level domain first.
    pub fn walk_order(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    fn text_len(&self) -> usize {
        let bytes: usize = self.labels.iter().map(|l| l.0.len()).sum();
        bytes + self.labels.len().saturating_sub(1)
    }
}

impl fmt::Debug for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DomainName({self})")
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.labels.is_empty() {
            return f.write_str(".");
        }
        for (i, label) in self.labels.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(label.as_str())?;
        }
        Ok(())
    }
}

impl FromStr for DomainName {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
