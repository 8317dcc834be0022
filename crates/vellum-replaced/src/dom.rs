//! The element view probes inspect.
//!
//! Probes only need an element's tag and attributes, so this is a flat,
//! owned snapshot rather than a node in a document tree.

use crate::url::Url;

/// An element attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// A markup element: lowercased tag name plus attributes in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: Vec<Attribute>,
}

impl Element {
    /// Create an element with no attributes. The tag is lowercased.
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Set an attribute, replacing an existing one with the same
    /// (case-insensitive) name.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self
            .attributes
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(name))
        {
            Some(existing) => existing.value = value.to_string(),
            None => self.attributes.push(Attribute {
                name: name.to_ascii_lowercase(),
                value: value.to_string(),
            }),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// `true` if this element has the given tag (case-insensitive).
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// Get an attribute value by name (case-insensitive lookup).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Parse an attribute as a non-negative pixel length (`"40"`, `"40px"`).
    pub fn length_attr(&self, name: &str) -> Option<f32> {
        let raw = self.attr(name)?.trim();
        let raw = raw.strip_suffix("px").unwrap_or(raw).trim();
        raw.parse::<f32>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
    }

    /// Get a URL-valued attribute, resolved against `base` when given.
    ///
    /// Whitespace-only values count as missing. A value that cannot be
    /// resolved is returned as written; the resource decoder reports it as
    /// unavailable later.
    pub fn url_attribute(&self, name: &str, base: Option<&Url>) -> Option<String> {
        let value = self.attr(name)?.trim();
        if value.is_empty() {
            return None;
        }
        let resolved = match base {
            Some(base) => base.join(value).map(|u| u.to_string()),
            None => Url::parse(value).map(|u| u.to_string()),
        };
        Some(resolved.unwrap_or_else(|| value.to_string()))
    }
}
