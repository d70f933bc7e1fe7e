//! Multi-value replies.

/// The values returned by a multi-key lookup.
///
/// A reply carries a status message and an ordered list of byte strings.
/// Scans that return key-value pairs flatten them into `key, value, key,
/// value, ...`, which [`Reply::pairs`] splits back apart. Failures are not
/// stored in the reply; they are returned as [`Error`](crate::Error).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    msg: String,
    items: Vec<Vec<u8>>,
}

impl Reply {
    /// Create an empty reply with no message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty reply carrying `msg`.
    #[must_use]
    pub fn with_msg(msg: impl Into<String>) -> Self {
        Self { msg: msg.into(), items: Vec::new() }
    }

    /// The status message.
    #[must_use]
    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// Append an item.
    pub fn push(&mut self, item: impl Into<Vec<u8>>) -> &mut Self {
        self.items.push(item.into());
        self
    }

    /// The items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[Vec<u8>] {
        &self.items
    }

    /// The items read as consecutive `(key, value)` pairs.
    ///
    /// A trailing unpaired item is ignored.
    pub fn pairs(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.items.chunks_exact(2).map(|pair| (pair[0].as_slice(), pair[1].as_slice()))
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the reply holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume the reply, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<Vec<u8>> {
        self.items
    }
}

impl IntoIterator for Reply {
    type Item = Vec<u8>;
    type IntoIter = std::vec::IntoIter<Vec<u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Reply {
    type Item = &'a Vec<u8>;
    type IntoIter = std::slice::Iter<'a, Vec<u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
