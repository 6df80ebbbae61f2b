use std::collections::HashMap;

/// A buffer name with its final extension removed.
///
/// This is the key that associates an image with its mask across every stage.
/// A name without an extension (or a leading-dot name like `.hidden`) is its
/// own stem.
pub fn stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// One-time stem to buffer-name index over a listing.
///
/// Built once per batch and looked up in constant time per item. When several
/// names share a stem the first one in listing order wins; listings are
/// sorted, so the winner is deterministic.
#[derive(Clone, Debug, Default)]
pub struct StemIndex {
    by_stem: HashMap<String, String>,
}

impl StemIndex {
    /// Build the index from an iterator of buffer names.
    pub fn build<I>(names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut by_stem = HashMap::new();
        for name in names {
            by_stem.entry(stem(&name).to_string()).or_insert(name);
        }
        Self { by_stem }
    }

    /// Look up the buffer name registered for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.by_stem.get(key).map(String::as_str)
    }

    /// Number of distinct stems in the index.
    pub fn len(&self) -> usize {
        self.by_stem.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.by_stem.is_empty()
    }
}
