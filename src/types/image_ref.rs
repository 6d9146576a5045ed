// ABOUTME: Node image reference validation.
// ABOUTME: Accepts forms like kindest/node:v1.16.2 or registry:5000/img@sha256:... verbatim.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseImageRefError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("invalid character in image reference: {0:?}")]
    InvalidChar(char),

    #[error("image reference has an empty {0}")]
    EmptyComponent(&'static str),

    #[error("image reference cannot start with {0:?}")]
    LeadingOption(char),
}

/// A validated image reference.
///
/// The reference is passed to the runtime exactly as written: no default tag
/// or registry is added, so the runtime's own resolution rules apply.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    raw: String,
    name_end: usize,
    tag: Option<(usize, usize)>,
    digest_start: Option<usize>,
}

impl ImageRef {
    pub fn parse(input: &str) -> Result<Self, ParseImageRefError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(ParseImageRefError::Empty);
        }
        // Anything starting with '-' would be read as a runtime flag.
        if raw.starts_with('-') {
            return Err(ParseImageRefError::LeadingOption('-'));
        }
        if let Some(c) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || "/:.-_@+".contains(*c)))
        {
            return Err(ParseImageRefError::InvalidChar(c));
        }

        let (named, digest_start) = match raw.find('@') {
            Some(at) if at + 1 == raw.len() => {
                return Err(ParseImageRefError::EmptyComponent("digest"));
            }
            Some(at) => (&raw[..at], Some(at + 1)),
            None => (raw, None),
        };

        // A colon after the last slash separates the tag; earlier colons belong
        // to a registry port.
        let last_slash = named.rfind('/').map_or(0, |i| i + 1);
        let (name_end, tag) = match named[last_slash..].find(':') {
            Some(offset) => {
                let colon = last_slash + offset;
                if colon + 1 == named.len() {
                    return Err(ParseImageRefError::EmptyComponent("tag"));
                }
                (colon, Some((colon + 1, named.len())))
            }
            None => (named.len(), None),
        };

        if named[..name_end].split('/').any(str::is_empty) {
            return Err(ParseImageRefError::EmptyComponent("name"));
        }

        Ok(Self {
            raw: raw.to_string(),
            name_end,
            tag,
            digest_start,
        })
    }

    /// Repository including any registry host, without tag or digest.
    pub fn name(&self) -> &str {
        &self.raw[..self.name_end]
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.map(|(start, end)| &self.raw[start..end])
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest_start.map(|start| &self.raw[start..])
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_name_has_no_tag() {
        let image = ImageRef::parse("busybox").unwrap();
        assert_eq!(image.name(), "busybox");
        assert_eq!(image.tag(), None);
        assert_eq!(image.to_string(), "busybox");
    }

    #[test]
    fn name_and_tag() {
        let image = ImageRef::parse("kindest/node:v1.16.2").unwrap();
        assert_eq!(image.name(), "kindest/node");
        assert_eq!(image.tag(), Some("v1.16.2"));
    }

    #[test]
    fn registry_port_is_not_a_tag() {
        let image = ImageRef::parse("localhost:5000/node").unwrap();
        assert_eq!(image.name(), "localhost:5000/node");
        assert_eq!(image.tag(), None);
    }

    #[test]
    fn tag_and_digest() {
        let image = ImageRef::parse("gcr.io/k8s/node:v1@sha256:abc123").unwrap();
        assert_eq!(image.name(), "gcr.io/k8s/node");
        assert_eq!(image.tag(), Some("v1"));
        assert_eq!(image.digest(), Some("sha256:abc123"));
        assert_eq!(image.as_str(), "gcr.io/k8s/node:v1@sha256:abc123");
    }

    #[test]
    fn rejects_invalid_references() {
        assert_eq!(ImageRef::parse("  "), Err(ParseImageRefError::Empty));
        assert_eq!(
            ImageRef::parse("--privileged"),
            Err(ParseImageRefError::LeadingOption('-'))
        );
        assert_eq!(
            ImageRef::parse("node image"),
            Err(ParseImageRefError::InvalidChar(' '))
        );
        assert_eq!(
            ImageRef::parse("node:"),
            Err(ParseImageRefError::EmptyComponent("tag"))
        );
        assert_eq!(
            ImageRef::parse("a//b"),
            Err(ParseImageRefError::EmptyComponent("name"))
        );
    }
}
