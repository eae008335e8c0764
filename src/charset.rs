//! Character set registry
//!
//! Charset names are resolved against the WHATWG encoding label table provided by
//! `encoding_rs`. Lookup is in-memory and case-insensitive. Labels that only
//! exist to neutralize unsafe decoders (`replacement`) or that do not name a
//! character set (`x-user-defined`) are not charsets and are rejected.

use encoding_rs::{Encoding, REPLACEMENT, UTF_16BE, UTF_16LE, X_USER_DEFINED};
use std::fmt;

/// Canonical names of every encoding the registry knows about
const CANONICAL_NAMES: &[&str] = &[
    "UTF-8",
    "UTF-16BE",
    "UTF-16LE",
    "IBM866",
    "ISO-8859-2",
    "ISO-8859-3",
    "ISO-8859-4",
    "ISO-8859-5",
    "ISO-8859-6",
    "ISO-8859-7",
    "ISO-8859-8",
    "ISO-8859-8-I",
    "ISO-8859-10",
    "ISO-8859-13",
    "ISO-8859-14",
    "ISO-8859-15",
    "ISO-8859-16",
    "KOI8-R",
    "KOI8-U",
    "macintosh",
    "windows-874",
    "windows-1250",
    "windows-1251",
    "windows-1252",
    "windows-1253",
    "windows-1254",
    "windows-1255",
    "windows-1256",
    "windows-1257",
    "windows-1258",
    "x-mac-cyrillic",
    "GBK",
    "gb18030",
    "Big5",
    "EUC-JP",
    "ISO-2022-JP",
    "Shift_JIS",
    "EUC-KR",
];

/// A resolved character encoding
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Charset(&'static Encoding);

impl Charset {
    /// Look up a charset by name or alias
    pub fn for_name(name: &str) -> Option<Self> {
        Encoding::for_label(name.trim().as_bytes())
            .filter(|encoding| *encoding != REPLACEMENT && *encoding != X_USER_DEFINED)
            .map(Charset)
    }

    /// Check whether the registry recognizes a name
    pub fn is_supported(name: &str) -> bool {
        Self::for_name(name).is_some()
    }

    /// Canonical names of all available charsets
    pub fn available() -> &'static [&'static str] {
        CANONICAL_NAMES
    }

    pub fn utf8() -> Self {
        Charset(encoding_rs::UTF_8)
    }

    /// Canonical name (e.g. "UTF-8" for the alias "utf8")
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.0
    }

    /// Encode a string for writing to the store.
    ///
    /// `encoding_rs` only encodes to ASCII-compatible encodings, so UTF-16 is
    /// produced here directly, without a byte order mark.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        if self.0 == UTF_16LE {
            text.encode_utf16().flat_map(u16::to_le_bytes).collect()
        } else if self.0 == UTF_16BE {
            text.encode_utf16().flat_map(u16::to_be_bytes).collect()
        } else {
            let (bytes, _, _) = self.0.encode(text);
            bytes.into_owned()
        }
    }

    /// Decode bytes read from the store, replacing malformed sequences
    pub fn decode(&self, bytes: &[u8]) -> String {
        let (text, _, _) = self.0.decode(bytes);
        text.into_owned()
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self::utf8()
    }
}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Charset({})", self.name())
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_resolve_to_canonical_name() {
        assert_eq!(Charset::for_name("utf8").unwrap().name(), "UTF-8");
        assert_eq!(Charset::for_name("Latin1").unwrap().name(), "windows-1252");
    }

    #[test]
    fn test_unknown_name() {
        assert!(!Charset::is_supported("NOT-A-REAL-CHARSET"));
    }

    #[test]
    fn test_non_charset_labels_are_rejected() {
        for name in ["ISO-2022-KR", "HZ-GB-2312", "replacement", "x-user-defined"] {
            assert!(!Charset::is_supported(name), "{} should be rejected", name);
        }
    }

    #[test]
    fn test_every_canonical_name_resolves() {
        for name in Charset::available() {
            let charset = Charset::for_name(name).unwrap();
            assert_eq!(charset.name(), *name);
        }
    }

    #[test]
    fn test_encode_decode() {
        let charset = Charset::utf8();
        assert_eq!(charset.decode(&charset.encode("héllo")), "héllo");
    }

    #[test]
    fn test_utf16_encodes_as_utf16() {
        let le = Charset::for_name("UTF-16LE").unwrap();
        assert_eq!(le.encode("ab"), vec![b'a', 0, b'b', 0]);
        assert_eq!(le.decode(&le.encode("héllo")), "héllo");

        let be = Charset::for_name("utf-16be").unwrap();
        assert_eq!(be.encode("ab"), vec![0, b'a', 0, b'b']);
        assert_eq!(be.decode(&be.encode("héllo")), "héllo");
    }

    #[test]
    fn test_legacy_encoding() {
        let latin = Charset::for_name("ISO-8859-1").unwrap();
        assert_eq!(latin.encode("é"), vec![0xE9]);
    }
}
