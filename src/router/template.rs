//! URL template compilation and structural matching.
//!
//! A template is split on `/` into segments. A segment starting with
//! [`CAPTURE_MARKER`] binds the concrete segment at that position to a named
//! parameter; every other segment must equal the concrete segment literally
//! (case-sensitive, compared after percent-decoding the concrete side).

use super::core::ParamVec;
use crate::error::ConfigError;
use std::borrow::Cow;
use std::sync::Arc;

/// Prefix that turns a template segment into a named capture.
pub const CAPTURE_MARKER: char = ':';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Capture(Arc<str>),
}

/// A compiled URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl UrlTemplate {
    /// Compile a template, rejecting anything that would make matching ambiguous.
    ///
    /// `/` is the only template with zero segments. Every other template must
    /// start with `/`, contain no empty segments, not end with `/`, and use each
    /// capture name at most once. Literal segments may not contain `{` or `}`,
    /// which would collide with captures once rendered as OpenAPI paths.
    pub fn parse(url_path: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidTemplate {
            url_path: url_path.to_string(),
            reason: reason.to_string(),
        };

        let rest = url_path
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'"))?;
        if rest.is_empty() {
            return Ok(Self {
                raw: url_path.to_string(),
                segments: Vec::new(),
            });
        }
        if rest.ends_with('/') {
            return Err(invalid("trailing slash is not allowed"));
        }

        let mut segments = Vec::with_capacity(rest.matches('/').count() + 1);
        for part in rest.split('/') {
            if part.is_empty() {
                return Err(invalid("empty path segment"));
            }
            match part.strip_prefix(CAPTURE_MARKER) {
                Some(name) => {
                    if name.is_empty() {
                        return Err(invalid("capture segment without a name"));
                    }
                    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                        return Err(invalid(&format!(
                            "capture name '{name}' may only contain letters, digits and '_'"
                        )));
                    }
                    let duplicate = segments
                        .iter()
                        .any(|s| matches!(s, Segment::Capture(existing) if existing.as_ref() == name));
                    if duplicate {
                        return Err(ConfigError::DuplicateCapture {
                            url_path: url_path.to_string(),
                            name: name.to_string(),
                        });
                    }
                    segments.push(Segment::Capture(Arc::from(name)));
                }
                None => {
                    if part.contains(['{', '}']) {
                        return Err(invalid("braces are not allowed in literal segments"));
                    }
                    segments.push(Segment::Literal(part.to_string()));
                }
            }
        }

        Ok(Self {
            raw: url_path.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Capture names in template order.
    pub fn capture_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Capture(name) => Some(name.as_ref()),
            Segment::Literal(_) => None,
        })
    }

    /// Match a concrete request path (no query string) against this template.
    ///
    /// Returns the captured values, percent-decoded, in template order. A
    /// capture never binds an empty segment, and a concrete segment that does
    /// not decode to UTF-8 never matches.
    pub fn match_path(&self, path: &str) -> Option<ParamVec> {
        let rest = path.strip_prefix('/')?;
        if self.segments.is_empty() {
            return rest.is_empty().then(ParamVec::new);
        }

        let mut params = ParamVec::new();
        let mut concrete = rest.split('/');
        for segment in &self.segments {
            let raw = concrete.next()?;
            let decoded: Cow<'_, str> = urlencoding::decode(raw).ok()?;
            match segment {
                Segment::Literal(literal) => {
                    if decoded != literal.as_str() {
                        return None;
                    }
                }
                Segment::Capture(name) => {
                    if decoded.is_empty() {
                        return None;
                    }
                    params.push((Arc::clone(name), decoded.into_owned()));
                }
            }
        }
        if concrete.next().is_some() {
            return None;
        }
        Some(params)
    }

    /// True when both templates match exactly the same set of paths.
    ///
    /// Capture names do not matter: `/items/:a` and `/items/:b` have the same shape.
    pub fn same_shape(&self, other: &UrlTemplate) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|pair| match pair {
                    (Segment::Capture(_), Segment::Capture(_)) => true,
                    (Segment::Literal(a), Segment::Literal(b)) => a == b,
                    _ => false,
                })
    }

    /// True when every path matched by `other` is also matched by `self`.
    pub fn covers(&self, other: &UrlTemplate) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|pair| match pair {
                    (Segment::Capture(_), _) => true,
                    (Segment::Literal(a), Segment::Literal(b)) => a == b,
                    (Segment::Literal(_), Segment::Capture(_)) => false,
                })
    }

    /// Render the template in OpenAPI path syntax (`/orders/:id` → `/orders/{id}`).
    pub fn to_openapi_path(&self) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        let mut out = String::with_capacity(self.raw.len() + self.segments.len());
        for segment in &self.segments {
            out.push('/');
            match segment {
                Segment::Literal(literal) => out.push_str(literal),
                Segment::Capture(name) => {
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                }
            }
        }
        out
    }
}

impl std::fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
