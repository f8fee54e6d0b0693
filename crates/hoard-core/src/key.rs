//! Structural cache keys and backend key rendering.
//!
//! A [`CacheKey`] is an ordered sequence of opaque parameter values.
//! Equality and hashing are structural and order-sensitive, with nested
//! collections compared element-wise. Keys are never persisted; only the
//! rendered backend key string is, in the form
//! `{cacheName}[-{group}]-{renderedKeyOrUNIQUE}`.

/// Separator between the cache name, group and key parts in a backend key.
pub const KEY_SEPARATOR: char = '-';

/// Filler character substituted for whitespace so backend keys never
/// contain spaces.
pub const KEY_FILLER: char = '-';

/// Rendered form of a key with zero parameters.
pub const UNIQUE_KEY: &str = "UNIQUE";

/// One parameter of a [`CacheKey`]: either an atomic value (already in its
/// string form) or an ordered collection of nested parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    /// A single opaque value.
    Atom(String),
    /// An ordered collection of parts, compared element-wise.
    Seq(Vec<KeyPart>),
}

impl KeyPart {
    fn render_into(&self, out: &mut String) {
        match self {
            Self::Atom(value) => out.push_str(value),
            Self::Seq(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        out.push(KEY_SEPARATOR);
                    }
                    part.render_into(out);
                }
            }
        }
    }
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        Self::Atom(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        Self::Atom(value)
    }
}

impl From<bool> for KeyPart {
    fn from(value: bool) -> Self {
        Self::Atom(value.to_string())
    }
}

macro_rules! key_part_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for KeyPart {
            fn from(value: $ty) -> Self {
                Self::Atom(value.to_string())
            }
        })*
    };
}

key_part_from_int!(i32, i64, u32, u64, usize);

impl<T: Into<KeyPart>> From<Vec<T>> for KeyPart {
    fn from(values: Vec<T>) -> Self {
        Self::Seq(values.into_iter().map(Into::into).collect())
    }
}

/// A structural cache key.
///
/// Constructed per logical cache operation and immutable afterwards. A key
/// with zero parameters is the canonical "unique" key for a cache that has
/// no variation; a key is *bulk* iff it has exactly one parameter and that
/// parameter is a collection of individual lookup identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CacheKey {
    parts: Vec<KeyPart>,
}

impl CacheKey {
    /// Creates the canonical key for a cache without parameters.
    #[must_use]
    pub fn unique() -> Self {
        Self { parts: Vec::new() }
    }

    /// Creates a key from an ordered sequence of parts.
    #[must_use]
    pub fn new(parts: Vec<KeyPart>) -> Self {
        Self { parts }
    }

    /// Creates a key with a single parameter.
    #[must_use]
    pub fn single(part: impl Into<KeyPart>) -> Self {
        Self {
            parts: vec![part.into()],
        }
    }

    /// Creates a bulk key from a collection of lookup identifiers.
    #[must_use]
    pub fn bulk<I, P>(members: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<KeyPart>,
    {
        Self {
            parts: vec![KeyPart::Seq(members.into_iter().map(Into::into).collect())],
        }
    }

    /// The ordered parameter sequence.
    #[must_use]
    pub fn parts(&self) -> &[KeyPart] {
        &self.parts
    }

    /// Returns `true` if the key has zero parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Returns `true` if the key has exactly one parameter and that
    /// parameter is a collection.
    #[must_use]
    pub fn is_bulk(&self) -> bool {
        matches!(self.parts.as_slice(), [KeyPart::Seq(_)])
    }

    /// The members of a bulk key, or `None` for non-bulk keys.
    #[must_use]
    pub fn bulk_members(&self) -> Option<&[KeyPart]> {
        match self.parts.as_slice() {
            [KeyPart::Seq(members)] => Some(members),
            _ => None,
        }
    }
}

/// Renders the backend key string for a cache key.
///
/// Distinct structural keys must render to distinct strings; two keys
/// whose parameter string-forms happen to collide are indistinguishable
/// downstream, so parameter renderings should be kept unambiguous.
#[must_use]
pub fn backend_key(cache_name: &str, key: &CacheKey, group: Option<&str>) -> String {
    let mut out = String::from(cache_name);
    if let Some(group) = group {
        out.push(KEY_SEPARATOR);
        out.push_str(group);
    }
    if key.is_empty() {
        out.push(KEY_SEPARATOR);
        out.push_str(UNIQUE_KEY);
    } else {
        for part in key.parts() {
            out.push(KEY_SEPARATOR);
            part.render_into(&mut out);
        }
    }
    normalize(out)
}

/// Renders one derived backend key per member of a bulk key.
///
/// Returns `None` when the key is not bulk. Used when the caller needs a
/// key per collection member, never for the bulk key itself.
#[must_use]
pub fn member_backend_keys(
    cache_name: &str,
    key: &CacheKey,
    group: Option<&str>,
) -> Option<Vec<String>> {
    key.bulk_members().map(|members| {
        members
            .iter()
            .map(|member| {
                let mut out = String::from(cache_name);
                if let Some(group) = group {
                    out.push(KEY_SEPARATOR);
                    out.push_str(group);
                }
                out.push(KEY_SEPARATOR);
                member.render_into(&mut out);
                normalize(out)
            })
            .collect()
    })
}

/// The backend-key prefix owned by a cache.
///
/// Every key a cache writes starts with this prefix, so deleting by it
/// clears one cache without touching siblings on the same connection.
#[must_use]
pub fn cache_prefix(cache_name: &str) -> String {
    let mut prefix = String::from(cache_name);
    prefix.push(KEY_SEPARATOR);
    normalize(prefix)
}

fn normalize(rendered: String) -> String {
    if rendered.contains(char::is_whitespace) {
        rendered
            .chars()
            .map(|c| if c.is_whitespace() { KEY_FILLER } else { c })
            .collect()
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(key: &CacheKey) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_unique_key_rendering() {
        assert_eq!(backend_key("users", &CacheKey::unique(), None), "users-UNIQUE");
        assert_eq!(
            backend_key("users", &CacheKey::unique(), Some("by-id")),
            "users-by-id-UNIQUE"
        );
    }

    #[test]
    fn test_multi_part_rendering() {
        let key = CacheKey::new(vec![KeyPart::from("42"), KeyPart::from(true)]);
        assert_eq!(backend_key("profiles", &key, None), "profiles-42-true");
    }

    #[test]
    fn test_whitespace_is_normalized() {
        let key = CacheKey::single("John Doe\tJr");
        assert_eq!(backend_key("names", &key, None), "names-John-Doe-Jr");
    }

    #[test]
    fn test_bulk_detection() {
        assert!(CacheKey::bulk(["a", "b"]).is_bulk());
        assert!(!CacheKey::single("a").is_bulk());
        assert!(!CacheKey::unique().is_bulk());
        // Two parameters, one of them a collection: not bulk.
        let key = CacheKey::new(vec![KeyPart::from(vec!["a", "b"]), KeyPart::from("c")]);
        assert!(!key.is_bulk());
    }

    #[test]
    fn test_bulk_members_render_one_key_each() {
        let key = CacheKey::bulk(["1", "2", "3"]);
        let keys = member_backend_keys("users", &key, Some("id")).unwrap();
        assert_eq!(keys, vec!["users-id-1", "users-id-2", "users-id-3"]);

        assert!(member_backend_keys("users", &CacheKey::single("1"), None).is_none());
    }

    #[test]
    fn test_structural_equality_is_order_sensitive() {
        let a = CacheKey::new(vec![KeyPart::from("x"), KeyPart::from("y")]);
        let b = CacheKey::new(vec![KeyPart::from("x"), KeyPart::from("y")]);
        let c = CacheKey::new(vec![KeyPart::from("y"), KeyPart::from("x")]);

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, c);
    }

    #[test]
    fn test_nested_collections_compared_element_wise() {
        let a = CacheKey::single(vec![vec!["1", "2"], vec!["3"]]);
        let b = CacheKey::single(vec![vec!["1", "2"], vec!["3"]]);
        let c = CacheKey::single(vec![vec!["1"], vec!["2", "3"]]);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_nested_seq_rendering() {
        let key = CacheKey::single(vec![vec!["1", "2"], vec!["3"]]);
        assert_eq!(backend_key("grid", &key, None), "grid-1-2-3");
    }
}
