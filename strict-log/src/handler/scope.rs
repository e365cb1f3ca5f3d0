//! Bound attributes and open groups of a derived handler.

use std::borrow::Cow;
use std::sync::Arc;

use crate::value::{Attr, Value};

/// One step of scoping, in the order it was applied.
#[derive(Debug)]
enum Segment {
    Attrs(Box<[Attr]>),
    Group(Cow<'static, str>),
}

/// A segment linked to the scope it was derived from.
#[derive(Debug)]
struct Node {
    parent: Option<Arc<Node>>,
    segment: Segment,
}

/// The append-only scope a handler accumulates through `with_attrs` and `with_group`.
///
/// A derived scope links to its parent instead of copying it, so deriving is constant time.
///
/// # Examples
///
/// ```rust
/// use strict_log::Attr;
/// use strict_log::handler::Scope;
///
/// let scope = Scope::default()
///     .with_attrs(&[Attr::new("service", "api")])
///     .with_group("request")
///     .with_attrs(&[Attr::new("method", "GET")]);
///
/// assert_eq!(
///     scope.apply(&[Attr::new("status", 200)]),
///     [
///         Attr::new("service", "api"),
///         Attr::group("request", [Attr::new("method", "GET"), Attr::new("status", 200)]),
///     ],
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct Scope {
    last: Option<Arc<Node>>,
}

impl Scope {
    /// Returns a scope that binds `attrs` after everything already bound.
    pub fn with_attrs(&self, attrs: &[Attr]) -> Self {
        if attrs.is_empty() {
            return self.clone();
        }
        self.push(Segment::Attrs(attrs.into()))
    }

    /// Returns a scope that nests everything bound or logged later under `name`.
    ///
    /// An empty name opens no group.
    pub fn with_group(&self, name: &str) -> Self {
        if name.is_empty() {
            return self.clone();
        }
        self.push(Segment::Group(Cow::Owned(name.to_owned())))
    }

    /// Returns whether nothing has been bound and no group opened.
    pub fn is_empty(&self) -> bool {
        self.last.is_none()
    }

    /// Returns the group names opened so far, outermost first.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        let mut groups: Vec<&str> = self
            .segments()
            .filter_map(|segment| match segment {
                Segment::Group(name) => Some(name.as_ref()),
                Segment::Attrs(_) => None,
            })
            .collect();
        groups.reverse();
        groups.into_iter()
    }

    /// Combines the bound attributes with a record's attributes.
    ///
    /// Bound attributes come first, and every attribute ends up under the groups that were open
    /// when it was bound. Groups left without attributes are dropped.
    pub fn apply(&self, attrs: &[Attr]) -> Vec<Attr> {
        let mut nested = attrs.to_vec();
        for segment in self.segments() {
            match segment {
                Segment::Attrs(bound) => {
                    let mut combined = Vec::with_capacity(bound.len() + nested.len());
                    combined.extend(bound.iter().cloned());
                    combined.append(&mut nested);
                    nested = combined;
                }
                Segment::Group(name) => {
                    if !nested.is_empty() {
                        nested = vec![Attr::new(name.clone(), Value::Group(nested))];
                    }
                }
            }
        }
        nested
    }

    /// Iterates the segments, most recent first.
    fn segments(&self) -> impl Iterator<Item = &Segment> {
        core::iter::successors(self.last.as_deref(), |node| node.parent.as_deref())
            .map(|node| &node.segment)
    }

    fn push(&self, segment: Segment) -> Self {
        Self {
            last: Some(Arc::new(Node {
                parent: self.last.clone(),
                segment,
            })),
        }
    }
}

/// Prepares attributes for output.
///
/// Resolves lazy values, drops empty attributes and empty groups, and inlines groups with an
/// empty key into their parent.
pub(crate) fn normalize(attrs: Vec<Attr>) -> Vec<Attr> {
    let mut normalized = Vec::with_capacity(attrs.len());
    for Attr { key, value } in attrs {
        match value.resolve() {
            Value::Group(group) => {
                let group = normalize(group);
                if group.is_empty() {
                    continue;
                }
                if key.is_empty() {
                    normalized.extend(group);
                } else {
                    normalized.push(Attr::new(key, Value::Group(group)));
                }
            }
            value => {
                let attr = Attr { key, value };
                if !attr.is_empty() {
                    normalized.push(attr);
                }
            }
        }
    }
    normalized
}
