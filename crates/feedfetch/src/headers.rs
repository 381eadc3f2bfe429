//! Case-insensitive, order-preserving header storage.

use std::fmt;

/// How a header's value arrived from the wire.
///
/// A name seen once is a [`Scalar`](HeaderValue::Scalar); a name repeated in
/// the same message becomes a [`List`](HeaderValue::List) holding each
/// occurrence in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Scalar(String),
    List(Vec<String>),
}

impl HeaderValue {
    /// The stored value as one line, list entries joined with `", "`.
    pub fn joined(&self) -> String {
        match self {
            Self::Scalar(v) => v.clone(),
            Self::List(vs) => vs.join(", "),
        }
    }

    /// The first stored value, unsplit.
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Scalar(v) => Some(v),
            Self::List(vs) => vs.first().map(String::as_str),
        }
    }

    /// Values as a sequence.
    ///
    /// A scalar is split on every `,` and each part trimmed, so a single
    /// value with a literal comma (an HTTP date, a cookie `Expires`) comes
    /// back in pieces. Lists are returned as stored.
    pub fn values(&self) -> Vec<String> {
        match self {
            Self::Scalar(v) if v.contains(',') => v.split(',').map(|p| p.trim().to_string()).collect(),
            Self::Scalar(v) => vec![v.clone()],
            Self::List(vs) => vs.clone(),
        }
    }
}

/// Response headers.
///
/// Names compare case-insensitively; the spelling kept is the one first
/// observed for that name. Iteration follows first-observation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, HeaderValue)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Add one occurrence of `name`, promoting an existing scalar to a list.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => {
                let slot = &mut self.entries[idx].1;
                let promoted = match &mut *slot {
                    HeaderValue::List(vs) => {
                        vs.push(value);
                        return;
                    }
                    HeaderValue::Scalar(existing) => {
                        HeaderValue::List(vec![std::mem::take(existing), value])
                    }
                };
                *slot = promoted;
            }
            None => self.entries.push((name, HeaderValue::Scalar(value))),
        }
    }

    /// Replace whatever is stored for `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: HeaderValue) {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// The stored value for `name`, in whichever shape it was stored.
    pub fn raw(&self, name: &str) -> Option<&HeaderValue> {
        self.position(name).map(|idx| &self.entries[idx].1)
    }

    /// Ordered values for `name`; empty when absent. See [`HeaderValue::values`].
    pub fn get(&self, name: &str) -> Vec<String> {
        self.raw(name).map(HeaderValue::values).unwrap_or_default()
    }

    /// Values for `name` joined with `", "`; empty when absent.
    pub fn get_line(&self, name: &str) -> String {
        self.get(name).join(", ")
    }

    pub fn contains(&self, name: &str) -> bool {
        !self.get(name).is_empty()
    }

    /// Every stored name (first-observed spelling) with its values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Vec<String>)> + '_ {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.values()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.entries {
            match value {
                HeaderValue::Scalar(v) => writeln!(f, "{name}: {v}")?,
                HeaderValue::List(vs) => {
                    for v in vs {
                        writeln!(f, "{name}: {v}")?;
                    }
                }
            }
        }
        Ok(())
    }
}
