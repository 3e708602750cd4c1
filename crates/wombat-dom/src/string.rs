//! Script strings.
//!
//! [§ 6.1.4 The String Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-string-type)
//! "The String type is the set of all ordered sequences of zero or more
//! 16-bit unsigned integer values."
//!
//! Script strings may hold lone surrogates, so they cannot round-trip through
//! `str`. [`DomString`] keeps the UTF-16 code units as given and only decodes
//! when a Rust string is actually needed (tag names, host commands, logs).

use std::fmt;
use std::rc::Rc;

/// An immutable, shared sequence of UTF-16 code units.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DomString(Rc<[u16]>);

impl DomString {
    /// The empty string.
    #[must_use]
    pub fn empty() -> Self {
        Self(Rc::from(Vec::new()))
    }

    /// The code units.
    #[must_use]
    pub fn as_utf16(&self) -> &[u16] {
        &self.0
    }

    /// Length in code units, which is what script sees as `length`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// No code units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode to a Rust string, or `None` if the string holds a lone
    /// surrogate.
    #[must_use]
    pub fn to_utf8(&self) -> Option<String> {
        String::from_utf16(&self.0).ok()
    }

    /// Decode to a Rust string, replacing lone surrogates with U+FFFD.
    #[must_use]
    pub fn to_utf8_lossy(&self) -> String {
        String::from_utf16_lossy(&self.0)
    }
}

impl From<&str> for DomString {
    fn from(text: &str) -> Self {
        Self(text.encode_utf16().collect())
    }
}

impl From<String> for DomString {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

impl From<Vec<u16>> for DomString {
    fn from(units: Vec<u16>) -> Self {
        Self(Rc::from(units))
    }
}

impl From<&[u16]> for DomString {
    fn from(units: &[u16]) -> Self {
        Self(Rc::from(units))
    }
}

impl PartialEq<str> for DomString {
    fn eq(&self, other: &str) -> bool {
        self.0.iter().copied().eq(other.encode_utf16())
    }
}

impl PartialEq<&str> for DomString {
    fn eq(&self, other: &&str) -> bool {
        *self == **other
    }
}

impl fmt::Display for DomString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for unit in char::decode_utf16(self.0.iter().copied()) {
            fmt::Write::write_char(f, unit.unwrap_or(char::REPLACEMENT_CHARACTER))?;
        }
        Ok(())
    }
}

impl fmt::Debug for DomString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_utf8() {
            Some(text) => fmt::Debug::fmt(&text, f),
            None => f.debug_tuple("DomString").field(&&*self.0).finish(),
        }
    }
}
