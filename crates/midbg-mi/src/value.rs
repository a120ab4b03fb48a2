//! Recursive value tree carried by MI result and async records.
//!
//! MI data is built from three shapes: quoted constants, `{...}` tuples and
//! `[...]` lists. Tuple members are normally named (`name=value`) while list
//! members may be bare values or named results; both containers therefore
//! store [`MiEntry`] children with an optional name. Children keep their parse
//! order and name lookup returns the first match, because the grammar does not
//! guarantee unique names.
//!
//! A node that failed to parse never appears in the tree: lookups return
//! `None` for it, which keeps "missing" distinguishable from an empty `{}` or
//! `[]` container.

use std::fmt;

use crate::cstring;

/// A parsed MI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiValue {
    /// Unescaped contents of a C-string constant.
    Const(String),
    /// `{}` or `{name=value,...}`.
    Tuple(Vec<MiEntry>),
    /// `[]` or `[value,...]` / `[name=value,...]`.
    List(Vec<MiEntry>),
}

/// A child of a tuple or list: a value with an optional result name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiEntry {
    name: Option<String>,
    value: MiValue,
}

impl MiEntry {
    /// Builds a named result (`name=value`).
    #[must_use]
    pub fn named(name: impl Into<String>, value: MiValue) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }

    /// Builds a bare list element.
    #[must_use]
    pub const fn unnamed(value: MiValue) -> Self {
        Self { name: None, value }
    }

    /// Result name, when the entry was written as `name=value`.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The entry's value.
    #[must_use]
    pub const fn value(&self) -> &MiValue {
        &self.value
    }
}

impl MiValue {
    /// Builds a constant from already-unescaped text.
    #[must_use]
    pub fn constant(text: impl Into<String>) -> Self {
        Self::Const(text.into())
    }

    /// An empty `{}` tuple.
    #[must_use]
    pub const fn empty_tuple() -> Self {
        Self::Tuple(Vec::new())
    }

    /// An empty `[]` list.
    #[must_use]
    pub const fn empty_list() -> Self {
        Self::List(Vec::new())
    }

    /// Whether the value is a list.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Children of a tuple or list, in parse order. Constants have none.
    #[must_use]
    pub fn entries(&self) -> &[MiEntry] {
        match self {
            Self::Const(_) => &[],
            Self::Tuple(entries) | Self::List(entries) => entries,
        }
    }

    /// Number of children held by a container.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether the value has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Returns the first child named `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Self> {
        self.entries()
            .iter()
            .find(|entry| entry.name() == Some(name))
            .map(MiEntry::value)
    }

    /// Constant text, when the value is a constant.
    #[must_use]
    pub fn as_const(&self) -> Option<&str> {
        match self {
            Self::Const(text) => Some(text.as_str()),
            Self::Tuple(_) | Self::List(_) => None,
        }
    }

    /// Constant text, or the empty string for containers.
    #[must_use]
    pub fn text(&self) -> &str {
        self.as_const().unwrap_or_default()
    }

    /// Text of the constant child `name`; empty when missing or not a constant.
    #[must_use]
    pub fn field(&self, name: &str) -> &str {
        self.find(name).map(Self::text).unwrap_or_default()
    }
}

impl fmt::Display for MiValue {
    /// Writes the canonical MI text for the value, which parses back to an
    /// equal tree.
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(text) => formatter.write_str(&cstring::quote(text)),
            Self::Tuple(entries) => write_entries(formatter, '{', entries, '}'),
            Self::List(entries) => write_entries(formatter, '[', entries, ']'),
        }
    }
}

impl fmt::Display for MiEntry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(formatter, "{name}=")?;
        }
        write!(formatter, "{}", self.value)
    }
}

fn write_entries(
    formatter: &mut fmt::Formatter<'_>,
    open: char,
    entries: &[MiEntry],
    close: char,
) -> fmt::Result {
    write!(formatter, "{open}")?;
    for (index, entry) in entries.iter().enumerate() {
        if index > 0 {
            formatter.write_str(",")?;
        }
        write!(formatter, "{entry}")?;
    }
    write!(formatter, "{close}")
}
