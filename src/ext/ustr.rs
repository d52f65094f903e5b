use std::borrow::Borrow;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// A string that is either `'static` or shared behind an [`Arc`].
///
/// Type, field and procedure names are cloned into every descriptor that refers to
/// them; this keeps those clones to a reference count bump.
#[derive(Clone, Eq)]
pub enum UStr {
    /// A borrowed `'static` string, usually a builtin name.
    Static(&'static str),
    /// A shared string, usually a name read from the catalog.
    Shared(Arc<str>),
}

impl UStr {
    /// Create a new shared string from a `&str`.
    pub fn new(s: &str) -> Self {
        UStr::Shared(Arc::from(s.to_owned()))
    }

    /// View this string as a `&str`.
    pub fn as_str(&self) -> &str {
        self
    }
}

impl Deref for UStr {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        match self {
            UStr::Static(s) => s,
            UStr::Shared(s) => s,
        }
    }
}

impl Hash for UStr {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Forward the hash to the string representation of this
        // A derive(Hash) encodes the enum discriminant
        (**self).hash(state);
    }
}

impl Borrow<str> for UStr {
    #[inline]
    fn borrow(&self) -> &str {
        self
    }
}

impl PartialEq<UStr> for UStr {
    fn eq(&self, other: &UStr) -> bool {
        (**self).eq(&**other)
    }
}

impl PartialEq<str> for UStr {
    fn eq(&self, other: &str) -> bool {
        (**self).eq(other)
    }
}

impl PartialEq<&str> for UStr {
    fn eq(&self, other: &&str) -> bool {
        (**self).eq(*other)
    }
}

impl Default for UStr {
    fn default() -> Self {
        UStr::Static("")
    }
}

impl From<&'static str> for UStr {
    #[inline]
    fn from(s: &'static str) -> Self {
        UStr::Static(s)
    }
}

impl From<String> for UStr {
    #[inline]
    fn from(s: String) -> Self {
        UStr::Shared(s.into())
    }
}

impl From<Arc<str>> for UStr {
    #[inline]
    fn from(s: Arc<str>) -> Self {
        UStr::Shared(s)
    }
}

impl Debug for UStr {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&**self, f)
    }
}

impl Display for UStr {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&**self, f)
    }
}

// manual impls because otherwise things get a little screwy with lifetimes
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for UStr {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as serde::Deserializer<'de>>::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(String::deserialize(deserializer)?.into())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for UStr {
    fn serialize<S>(&self, serializer: S) -> Result<<S as serde::Serializer>::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::UStr;
    use crate::HashMap;

    #[test]
    fn static_and_shared_are_interchangeable_keys() {
        let mut map = HashMap::new();
        map.insert(UStr::from("int4send"), 1);

        assert_eq!(map.get("int4send"), Some(&1));
        assert_eq!(map.get(&UStr::new("int4send")), Some(&1));
        assert_eq!(UStr::from(String::from("int4send")), UStr::Static("int4send"));
    }
}
