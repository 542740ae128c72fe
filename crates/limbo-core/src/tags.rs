//! Tag-expression queries and the tag hierarchy.
//!
//! A tag expression is a compact infix string: `music+art-spam` includes
//! `music` and `art` and excludes `spam`. There is no whitespace or comma
//! delimiter; tags are separated only by their signs, so a tag name can never
//! contain `+` or `-`.
//!
//! # Sign Attribution
//!
//! A tag belongs to the list named by the sign that *preceded* it. The parser
//! commits the buffered tag when it reaches the next sign, using the sign it
//! remembered from before the tag, then remembers the new sign for the tag
//! that follows. The first tag, with no sign before it, is included. A sign
//! as the very first character has nothing buffered and commits nothing.
//!
//! Parsing never fails. Two signs in a row commit an empty tag, which no
//! thread carries, so it never matches.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Inclusion/exclusion filter for thread listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagQuery {
    /// A thread must carry at least one of these (when non-empty)
    pub include: Vec<String>,
    /// A thread must carry none of these
    pub exclude: Vec<String>,
}

#[derive(Clone, Copy)]
enum Sign {
    Include,
    Exclude,
}

impl TagQuery {
    /// Parse a tag expression.
    pub fn parse(expr: &str) -> Self {
        let mut query = Self::default();
        let mut buffer = String::new();
        let mut sign = Sign::Include;
        let mut started = false;

        for c in expr.chars() {
            match c {
                '+' | '-' => {
                    if started {
                        query.push(sign, std::mem::take(&mut buffer));
                    }
                    sign = if c == '+' { Sign::Include } else { Sign::Exclude };
                },
                _ => buffer.push(c),
            }
            started = true;
        }

        if !buffer.is_empty() {
            query.push(sign, buffer);
        }

        query
    }

    fn push(&mut self, sign: Sign, tag: String) {
        match sign {
            Sign::Include => self.include.push(tag),
            Sign::Exclude => self.exclude.push(tag),
        }
    }

    /// Whether the query filters nothing.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Whether a thread with `tags` passes the filter.
    pub fn matches(&self, tags: &[String]) -> bool {
        let carries = |wanted: &[String]| {
            wanted.iter().any(|w| !w.is_empty() && tags.iter().any(|t| t == w))
        };

        (self.include.is_empty() || carries(&self.include)) && !carries(&self.exclude)
    }
}

/// A stored tag with its child tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Lower-cased name, unique
    pub id: String,
    /// Display name
    pub name: String,
    /// Description shown to clients
    pub desc: String,
    /// Names of child tags
    pub children: Vec<String>,
}

impl Tag {
    /// Create a tag with no children.
    pub fn new(name: &str, desc: &str) -> Self {
        Self {
            id: name.to_lowercase(),
            name: name.to_string(),
            desc: desc.to_string(),
            children: Vec::new(),
        }
    }

    /// Builder-style child list.
    #[must_use]
    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }
}

/// Tag adjacency map for expanding a tag into its descendants.
///
/// Tag data is user-editable and may contain cycles (`a -> b -> a`); the
/// closure tracks visited tags so expansion always terminates.
#[derive(Debug, Clone, Default)]
pub struct TagTree {
    tags: HashMap<String, Tag>,
}

impl TagTree {
    /// Build from stored tags, keyed case-insensitively.
    pub fn new(tags: impl IntoIterator<Item = Tag>) -> Self {
        Self { tags: tags.into_iter().map(|t| (t.id.to_lowercase(), t)).collect() }
    }

    /// Whether no tags are known.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// `name` followed by all its descendants, depth first, each at most once.
    pub fn descendants(&self, name: &str) -> Vec<String> {
        let mut out = vec![name.to_string()];
        let mut visited = HashSet::from([name.to_lowercase()]);
        let mut stack: Vec<&str> =
            self.children_of(name).iter().rev().map(String::as_str).collect();

        while let Some(child) = stack.pop() {
            if !visited.insert(child.to_lowercase()) {
                continue;
            }
            out.push(child.to_string());
            stack.extend(self.children_of(child).iter().rev().map(String::as_str));
        }

        out
    }

    fn children_of(&self, name: &str) -> &[String] {
        self.tags.get(&name.to_lowercase()).map(|t| t.children.as_slice()).unwrap_or_default()
    }

    /// Replace every tag in `query` by itself and its descendants.
    ///
    /// Order is preserved and duplicates are dropped.
    pub fn expand(&self, query: &TagQuery) -> TagQuery {
        TagQuery {
            include: self.expand_list(&query.include),
            exclude: self.expand_list(&query.exclude),
        }
    }

    fn expand_list(&self, tags: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        tags.iter()
            .flat_map(|t| self.descendants(t))
            .filter(|t| seen.insert(t.clone()))
            .collect()
    }
}
