//! Qualified names.

use std::fmt;

/// A dot-separated qualified name such as `Modelica.Math.sin` or `E.red`.
///
/// Always has at least one segment.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Single-identifier path.
    pub fn ident(name: impl Into<String>) -> Self {
        Path {
            segments: vec![name.into()],
        }
    }

    /// Parse a dotted string. Empty segments are dropped; an empty input
    /// yields a single empty identifier.
    pub fn parse(dotted: &str) -> Self {
        let segments: Vec<String> = dotted
            .split('.')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if segments.is_empty() {
            return Path::ident("");
        }
        Path { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last identifier (`sin` for `Modelica.Math.sin`).
    pub fn last(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// The first identifier.
    pub fn first(&self) -> &str {
        self.segments.first().map_or("", String::as_str)
    }

    pub fn is_ident(&self) -> bool {
        self.segments.len() == 1
    }

    /// Append an identifier, producing `self.name`.
    #[must_use]
    pub fn join(&self, name: impl Into<String>) -> Path {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Path { segments }
    }

    /// Everything but the last identifier, or `None` for single identifiers.
    pub fn parent(&self) -> Option<Path> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Path {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Path::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        let p = Path::parse("Modelica.Math.sin");
        assert_eq!(p.segments().len(), 3);
        assert_eq!(p.last(), "sin");
        assert_eq!(p.first(), "Modelica");
        assert_eq!(p.to_string(), "Modelica.Math.sin");
    }

    #[test]
    fn join_and_parent() {
        let e = Path::ident("Colors");
        let lit = e.join("red");
        assert_eq!(lit.to_string(), "Colors.red");
        assert_eq!(lit.parent(), Some(e));
        assert_eq!(Path::ident("x").parent(), None);
    }
}
