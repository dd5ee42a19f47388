use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const DOCUMENTS_MARKER: &str = "/documents/";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathPatternError {
    #[error("path pattern cannot be empty")]
    Empty,
    #[error("path pattern '{pattern}' contains an empty segment")]
    EmptySegment { pattern: String },
    #[error("wildcard in '{segment}' must span the whole segment")]
    PartialWildcard { segment: String },
    #[error("wildcard name in '{segment}' cannot be empty")]
    EmptyWildcardName { segment: String },
    #[error("wildcard '{name}' appears more than once")]
    DuplicateWildcard { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Wildcard(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, PathPatternError> {
        let trimmed = pattern.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(PathPatternError::Empty);
        }

        let mut segments = Vec::new();
        let mut seen = Vec::<&str>::new();
        for segment in trimmed.split('/') {
            if segment.is_empty() {
                return Err(PathPatternError::EmptySegment {
                    pattern: pattern.to_string(),
                });
            }

            let opens = segment.contains('{');
            let closes = segment.contains('}');
            if !opens && !closes {
                segments.push(Segment::Literal(segment.to_string()));
                continue;
            }

            let Some(name) = segment
                .strip_prefix('{')
                .and_then(|rest| rest.strip_suffix('}'))
                .filter(|name| !name.contains(['{', '}']))
            else {
                return Err(PathPatternError::PartialWildcard {
                    segment: segment.to_string(),
                });
            };
            if name.trim().is_empty() {
                return Err(PathPatternError::EmptyWildcardName {
                    segment: segment.to_string(),
                });
            }
            if seen.contains(&name) {
                return Err(PathPatternError::DuplicateWildcard {
                    name: name.to_string(),
                });
            }
            seen.push(name);
            segments.push(Segment::Wildcard(name.to_string()));
        }

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, document: &str) -> Option<BTreeMap<String, String>> {
        let path = document_path(document);
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() != self.segments.len() || parts.iter().any(|part| part.is_empty()) {
            return None;
        }

        let mut params = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Wildcard(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(params)
    }
}

impl FromStr for PathPattern {
    type Err = PathPatternError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

pub fn document_path(document: &str) -> &str {
    let trimmed = document.trim_matches('/');
    if trimmed.starts_with("projects/") {
        if let Some(index) = trimmed.find(DOCUMENTS_MARKER) {
            return &trimmed[index + DOCUMENTS_MARKER.len()..];
        }
    }
    trimmed
}
