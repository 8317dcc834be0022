//! URL parsing and reference resolution for resource attributes.
//!
//! Only what attribute resolution needs: absolute URLs of the form
//! `scheme://host[:port]/path?query#fragment` (including `file:///path`)
//! and relative references resolved against a document base.

use std::fmt;

/// A parsed absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    /// Lowercased scheme (`"file"`, `"http"`, `"mem"`, ...).
    pub scheme: String,
    /// Host component; empty for `file:///...`.
    pub host: String,
    pub port: Option<u16>,
    /// Path component, always starting with `/`.
    pub path: String,
    /// Query string without the leading `?`.
    pub query: Option<String>,
    /// Fragment without the leading `#`.
    pub fragment: Option<String>,
}

impl Url {
    /// Parse an absolute URL. Returns `None` for relative references and
    /// strings without a `scheme://` prefix.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let (scheme, rest) = input.split_once("://")?;
        if scheme.is_empty() || !is_valid_scheme(scheme) {
            return None;
        }
        Some(Self::from_parts(&scheme.to_ascii_lowercase(), rest))
    }

    fn from_parts(scheme: &str, rest: &str) -> Self {
        let (rest, query, fragment) = split_query_fragment(rest);
        let rest = rest.as_str();
        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, "/"),
        };
        let (host, port) = match authority.rsplit_once(':') {
            Some((h, p)) => match p.parse::<u16>() {
                Ok(port) => (h, Some(port)),
                Err(_) => (authority, None),
            },
            None => (authority, None),
        };
        Url {
            scheme: scheme.to_string(),
            host: host.to_string(),
            port,
            path: path.to_string(),
            query,
            fragment,
        }
    }

    /// Resolve `reference` against this URL.
    ///
    /// References carrying their own scheme are parsed as-is; everything
    /// else keeps this URL's scheme and authority. Returns `None` when a
    /// schemed reference has no `//` authority (`data:`, `mailto:`) or
    /// fails to parse; callers pass such references through verbatim.
    pub fn join(&self, reference: &str) -> Option<Url> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Some(self.clone());
        }
        if has_scheme(reference) {
            return Url::parse(reference);
        }
        if let Some(rest) = reference.strip_prefix("//") {
            return Some(Self::from_parts(&self.scheme, rest));
        }
        if let Some(frag) = reference.strip_prefix('#') {
            return Some(Url {
                fragment: Some(frag.to_string()),
                ..self.clone()
            });
        }
        let (rel_path, query, fragment) = split_query_fragment(reference);
        if rel_path.is_empty() {
            // Query-only reference: keep the path, replace query and fragment.
            return Some(Url {
                query,
                fragment,
                ..self.clone()
            });
        }

        let path = if rel_path.starts_with('/') {
            normalize_segments("/", &rel_path)
        } else {
            normalize_segments(self.directory(), &rel_path)
        };
        Some(Url {
            scheme: self.scheme.clone(),
            host: self.host.clone(),
            port: self.port,
            path,
            query,
            fragment,
        })
    }

    /// Directory part of the path, up to and including the last `/`.
    pub fn directory(&self) -> &str {
        match self.path.rfind('/') {
            Some(i) => &self.path[..=i],
            None => "/",
        }
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        f.write_str(&self.path)?;
        if let Some(q) = &self.query {
            write!(f, "?{q}")?;
        }
        if let Some(frag) = &self.fragment {
            write!(f, "#{frag}")?;
        }
        Ok(())
    }
}

/// Whether `reference` starts with an RFC 3986 `scheme:` prefix.
fn has_scheme(reference: &str) -> bool {
    reference
        .split_once(':')
        .is_some_and(|(scheme, _)| is_valid_scheme(scheme))
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Split `path?query#fragment` into its three parts.
fn split_query_fragment(s: &str) -> (String, Option<String>, Option<String>) {
    let (s, fragment) = match s.split_once('#') {
        Some((head, frag)) => (head, Some(frag.to_string())),
        None => (s, None),
    };
    let (path, query) = match s.split_once('?') {
        Some((head, q)) => (head.to_string(), Some(q.to_string())),
        None => (s.to_string(), None),
    };
    (path, query, fragment)
}

/// Apply `relative` to `base_dir`, collapsing `.` and `..` segments.
/// `..` never climbs above the root.
fn normalize_segments(base_dir: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    let trailing_slash = relative.ends_with('/');
    for seg in relative.split('/') {
        match seg {
            "" | "." => {},
            ".." => {
                segments.pop();
            },
            s => segments.push(s),
        }
    }
    let mut path = format!("/{}", segments.join("/"));
    if trailing_slash && path.len() > 1 {
        path.push('/');
    }
    path
}
