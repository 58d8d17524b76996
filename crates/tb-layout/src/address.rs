// ABOUTME: Structural window addresses.
// ABOUTME: A path of child indices from the root container down to a node.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Path of child indices from the root container.
///
/// The empty address names the root itself. A segment of `-1` picks the last
/// child; no other negative segment is valid. Addresses are positional, so an
/// address taken before a sibling is inserted or removed may point elsewhere
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Address(Vec<isize>);

impl Address {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[isize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// This address with `index` appended
    pub fn child(&self, index: isize) -> Self {
        let mut segments = self.0.clone();
        segments.push(index);
        Self(segments)
    }
}

impl From<Vec<isize>> for Address {
    fn from(segments: Vec<isize>) -> Self {
        Self(segments)
    }
}

impl From<&[isize]> for Address {
    fn from(segments: &[isize]) -> Self {
        Self(segments.to_vec())
    }
}

impl<const N: usize> From<[isize; N]> for Address {
    fn from(segments: [isize; N]) -> Self {
        Self(segments.to_vec())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str(".");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed address segment: {0:?}")]
pub struct ParseAddressError(String);

impl FromStr for Address {
    type Err = ParseAddressError;

    /// Parses `.` (or an empty string) as the root and `0.1.-1` style paths
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "." {
            return Ok(Self::root());
        }
        s.split('.')
            .map(|part| {
                part.parse::<isize>()
                    .map_err(|_| ParseAddressError(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}
