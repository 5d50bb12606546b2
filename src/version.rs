// version.rs - libyara header version parsing and the version guard.
//
// Also compiled into build.rs through `#[path]`, so this module may only
// depend on std and memchr.

use std::cmp::Ordering;
use std::fmt;

use memchr::{memchr, memmem, memrchr};

/// The libyara major version this crate is written against.
pub const SUPPORTED_MAJOR: u32 = 4;

pub const MAJOR_MACRO: &str = "YR_MAJOR_VERSION";
pub const MINOR_MACRO: &str = "YR_MINOR_VERSION";
pub const MICRO_MACRO: &str = "YR_MICRO_VERSION";

/// A libyara version as reported by its headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, micro: u32) -> Self {
        Version {
            major,
            minor,
            micro,
        }
    }

    /// Extract the version from the text of `yara/libyara.h`.
    ///
    /// `YR_MAJOR_VERSION` and `YR_MINOR_VERSION` must both be defined;
    /// `YR_MICRO_VERSION` defaults to 0 when absent.
    pub fn parse_header(header: &[u8]) -> Result<Version, VersionError> {
        let major =
            define_value(header, MAJOR_MACRO)?.ok_or(VersionError::MissingMacro(MAJOR_MACRO))?;
        let minor =
            define_value(header, MINOR_MACRO)?.ok_or(VersionError::MissingMacro(MINOR_MACRO))?;
        let micro = define_value(header, MICRO_MACRO)?.unwrap_or(0);
        Ok(Version::new(major, minor, micro))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)
    }
}

/// Outcome of a successful version check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    /// Major version equals [`SUPPORTED_MAJOR`].
    Supported,
    /// Major version is above [`SUPPORTED_MAJOR`]: builds, with a warning.
    Newer,
}

/// Why a libyara installation cannot be built against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// A required version macro is not defined.
    MissingMacro(&'static str),
    /// A version macro is defined but its value is not a plain integer.
    InvalidMacro { name: &'static str, value: String },
    /// The major version is older than the supported one.
    Unsupported { found: Version, supported: u32 },
}

impl fmt::Display for VersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionError::MissingMacro(name) => {
                write!(f, "yara version macro not defined: {}", name)
            }
            VersionError::InvalidMacro { name, value } => {
                write!(f, "yara version macro {} has invalid value {:?}", name, value)
            }
            VersionError::Unsupported { found, supported } => write!(
                f,
                "yara {} is not supported: only yara v{} is supported",
                found, supported
            ),
        }
    }
}

impl std::error::Error for VersionError {}

/// Apply the version guard.
///
/// A major below [`SUPPORTED_MAJOR`] is an error, a major above it is
/// accepted as [`Compatibility::Newer`].
pub fn check(version: Version) -> Result<Compatibility, VersionError> {
    match version.major.cmp(&SUPPORTED_MAJOR) {
        Ordering::Equal => Ok(Compatibility::Supported),
        Ordering::Greater => Ok(Compatibility::Newer),
        Ordering::Less => Err(VersionError::Unsupported {
            found: version,
            supported: SUPPORTED_MAJOR,
        }),
    }
}

/// Parse and check in one step.
pub fn check_header(header: &[u8]) -> Result<(Version, Compatibility), VersionError> {
    let version = Version::parse_header(header)?;
    check(version).map(|compat| (version, compat))
}

/// Value of the first `#define <name> <value>` line in `header`.
///
/// Occurrences of `name` outside a `#define` of exactly that name (uses in
/// other macros, longer identifiers, comments) are skipped, as are defines
/// inside `/* */` blocks.
fn define_value(header: &[u8], name: &'static str) -> Result<Option<u32>, VersionError> {
    for pos in memmem::find_iter(header, name.as_bytes()) {
        let start = memrchr(b'\n', &header[..pos]).map_or(0, |i| i + 1);
        let end = memchr(b'\n', &header[pos..]).map_or(header.len(), |i| pos + i);

        if in_block_comment(header, start) {
            continue;
        }

        let Some((defined, value)) = split_define(&header[start..end]) else {
            continue;
        };
        if defined != name.as_bytes() {
            continue;
        }

        return parse_integer(value).map(Some).ok_or_else(|| VersionError::InvalidMacro {
            name,
            value: String::from_utf8_lossy(value).into_owned(),
        });
    }
    Ok(None)
}

/// Whether `pos` lies after an unterminated `/*`.
fn in_block_comment(header: &[u8], pos: usize) -> bool {
    let before = &header[..pos];
    match memmem::rfind(before, b"/*") {
        Some(open) => memmem::find(&before[open + 2..], b"*/").is_none(),
        None => false,
    }
}

/// Split a `#define NAME VALUE` line into `(NAME, VALUE)`.
fn split_define(line: &[u8]) -> Option<(&[u8], &[u8])> {
    let rest = line.trim_ascii().strip_prefix(b"#")?.trim_ascii_start();
    let rest = rest.strip_prefix(b"define")?;
    if !rest.first().is_some_and(u8::is_ascii_whitespace) {
        return None;
    }
    let rest = rest.trim_ascii_start();
    let name_len = rest
        .iter()
        .position(|b| !(b.is_ascii_alphanumeric() || *b == b'_'))
        .unwrap_or(rest.len());
    let (name, value) = rest.split_at(name_len);

    // cut trailing comments
    let value = match memmem::find(value, b"/") {
        Some(i) => &value[..i],
        None => value,
    };
    Some((name, value.trim_ascii()))
}

fn parse_integer(value: &[u8]) -> Option<u32> {
    let mut value = value;
    while let Some(inner) = value.strip_prefix(b"(").and_then(|v| v.strip_suffix(b")")) {
        value = inner.trim_ascii();
    }
    let digits = value
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(value.len());
    let (number, suffix) = value.split_at(digits);
    if number.is_empty() || !suffix.iter().all(|b| matches!(b, b'u' | b'U' | b'l' | b'L')) {
        return None;
    }
    std::str::from_utf8(number).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_define_handles_spacing() {
        assert_eq!(
            split_define(b"#  define   YR_MAJOR_VERSION\t4 "),
            Some((&b"YR_MAJOR_VERSION"[..], &b"4"[..]))
        );
        assert_eq!(split_define(b"#defineYR_MAJOR_VERSION 4"), None);
        assert_eq!(split_define(b"int YR_MAJOR_VERSION = 4;"), None);
    }

    #[test]
    fn split_define_strips_comments() {
        assert_eq!(
            split_define(b"#define YR_MINOR_VERSION 3 /* minor */"),
            Some((&b"YR_MINOR_VERSION"[..], &b"3"[..]))
        );
    }

    #[test]
    fn parse_integer_accepts_suffix_and_parens() {
        assert_eq!(parse_integer(b"4"), Some(4));
        assert_eq!(parse_integer(b"(12)"), Some(12));
        assert_eq!(parse_integer(b"5U"), Some(5));
        assert_eq!(parse_integer(b"four"), None);
        assert_eq!(parse_integer(b""), None);
        assert_eq!(parse_integer(b"4x"), None);
    }

    #[test]
    fn longer_identifier_is_not_the_macro() {
        let header = b"#define YR_MAJOR_VERSION_STRING \"4\"\n#define YR_MAJOR_VERSION 4\n";
        assert_eq!(define_value(header, MAJOR_MACRO), Ok(Some(4)));
    }

    #[test]
    fn block_comments_are_skipped() {
        let header = b"/* old:\n#define YR_MAJOR_VERSION 3\n*/\n#define YR_MAJOR_VERSION 4\n";
        assert_eq!(define_value(header, MAJOR_MACRO), Ok(Some(4)));

        assert!(in_block_comment(b"/* open", 7));
        assert!(!in_block_comment(b"/* closed */ x", 13));
        assert!(!in_block_comment(b"#define A 1", 0));
    }

    #[test]
    fn check_orders_by_major_only() {
        assert_eq!(check(Version::new(4, 0, 0)), Ok(Compatibility::Supported));
        assert_eq!(check(Version::new(4, 99, 1)), Ok(Compatibility::Supported));
        assert_eq!(check(Version::new(5, 0, 0)), Ok(Compatibility::Newer));
        assert!(matches!(
            check(Version::new(3, 11, 0)),
            Err(VersionError::Unsupported { supported: 4, .. })
        ));
    }

    #[test]
    fn display() {
        assert_eq!(Version::new(4, 5, 2).to_string(), "4.5.2");
        assert_eq!(
            VersionError::MissingMacro(MINOR_MACRO).to_string(),
            "yara version macro not defined: YR_MINOR_VERSION"
        );
    }
}
