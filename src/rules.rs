// rules.rs - Compiled rulesets, scanning, and borrowed rule handles.
//
// Rules owns a YR_RULES and destroys it on drop. RulesRef and Rule are
// borrowed views over libyara memory: they never allocate, mutate, or free
// anything, and their lifetimes are tied to the owning ruleset.

use std::borrow::Cow;
use std::ffi::{CStr, CString};
use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::os::raw::c_char;
use std::path::Path;
use std::ptr::{self, NonNull};

use log::{debug, warn};
use smallvec::SmallVec;

use crate::error::{Error, IoError, IoErrorKind, YaraError};
use crate::ffi::{self, YR_META, YR_RULE, YR_RULES};
use crate::flags::{RuleFlags, ScanFlags};
use crate::initialize::InitializationToken;
use crate::ruleset::{self, Ruleset};
use crate::scan;
use crate::stream::{ReadStream, WriteStream};

/// A set of compiled rules.
///
/// Obtained from [`Compiler::compile_rules`](crate::Compiler::compile_rules)
/// or by loading a rules file saved earlier.
pub struct Rules {
    inner: NonNull<YR_RULES>,
    _token: InitializationToken,
    flags: ScanFlags,
}

// Enumeration and introspection only read the rules table. libyara's scan
// thread-locals live only for the duration of one yr_rules_scan_* call and
// our callback never changes thread; saving goes through a caller-owned
// stream.
unsafe impl Send for Rules {}
unsafe impl Sync for Rules {}

impl Rules {
    /// Take ownership of a ruleset returned by libyara.
    pub(crate) fn from_owned(
        raw: *mut YR_RULES,
        token: InitializationToken,
    ) -> Result<Rules, YaraError> {
        let inner = NonNull::new(raw).ok_or(YaraError::InternalFatalError)?;
        Ok(Rules {
            inner,
            _token: token,
            flags: ScanFlags::empty(),
        })
    }

    /// Load rules saved with [`Rules::save`].
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Rules, Error> {
        let token = InitializationToken::new()?;
        let filename = path_to_cstring(path.as_ref())?;
        let mut raw: *mut YR_RULES = ptr::null_mut();
        YaraError::from_code(unsafe { ffi::yr_rules_load(filename.as_ptr(), &mut raw) })?;

        let rules = Rules::from_owned(raw, token)?;
        debug!(
            "loaded {} rules from {}",
            rules.count(),
            path.as_ref().display()
        );
        Ok(rules)
    }

    /// Load rules saved with [`Rules::save_to_stream`].
    pub fn load_from_stream<R: Read>(mut reader: R) -> Result<Rules, Error> {
        let token = InitializationToken::new()?;
        let mut stream = ReadStream::new(&mut reader);
        let mut yr_stream = stream.as_yara();
        let mut raw: *mut YR_RULES = ptr::null_mut();
        let result = unsafe { ffi::yr_rules_load_stream(&mut yr_stream, &mut raw) };

        stream
            .result()
            .map_err(|e| IoError::new(e, IoErrorKind::ReadingRules))?;
        YaraError::from_code(result)?;

        let rules = Rules::from_owned(raw, token)?;
        debug!("loaded {} rules from stream", rules.count());
        Ok(rules)
    }

    /// Save the compiled rules to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let filename = path_to_cstring(path.as_ref())?;
        YaraError::from_code(unsafe { ffi::yr_rules_save(self.as_ptr(), filename.as_ptr()) })?;
        Ok(())
    }

    /// Save the compiled rules to a writer.
    pub fn save_to_stream<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        let mut stream = WriteStream::new(&mut writer);
        let mut yr_stream = stream.as_yara();
        let result = unsafe { ffi::yr_rules_save_stream(self.as_ptr(), &mut yr_stream) };

        stream
            .result()
            .map_err(|e| IoError::new(e, IoErrorKind::WritingRules))?;
        YaraError::from_code(result)?;
        Ok(())
    }

    /// Scan a memory buffer.
    ///
    /// Returns the matching rules in table order. Private rules are never
    /// reported. `timeout` is in seconds, 0 for none.
    ///
    /// ```no_run
    /// # use yara_helpers::Compiler;
    /// let mut compiler = Compiler::new()?;
    /// compiler.add_rules_str("rule has_rust { strings: $a = \"rust\" nocase condition: $a }")?;
    /// let rules = compiler.compile_rules()?;
    /// let matches = rules.scan_mem(b"I love Rust!", 5)?;
    /// assert_eq!(matches[0].identifier(), "has_rust");
    /// # Ok::<(), yara_helpers::Error>(())
    /// ```
    pub fn scan_mem(&self, mem: &[u8], timeout: u16) -> Result<Vec<Rule<'_>>, YaraError> {
        let matches = scan::scan_mem(self.as_ptr(), mem, self.flags, timeout)?;
        debug!(
            "{} of {} rules matched {} bytes",
            matches.len(),
            self.count(),
            mem.len()
        );
        Ok(matches)
    }

    /// Scan a file. See [`Rules::scan_mem`].
    pub fn scan_file<P: AsRef<Path>>(
        &self,
        path: P,
        timeout: u16,
    ) -> Result<Vec<Rule<'_>>, Error> {
        let file =
            File::open(path.as_ref()).map_err(|e| IoError::new(e, IoErrorKind::OpenScanFile))?;
        let matches = scan::scan_file(self.as_ptr(), &file, self.flags, timeout)?;
        debug!(
            "{} of {} rules matched {}",
            matches.len(),
            self.count(),
            path.as_ref().display()
        );
        Ok(matches)
    }

    /// Flags used by every later scan of this ruleset.
    pub fn set_flags(&mut self, flags: ScanFlags) {
        self.flags = flags;
    }

    pub fn flags(&self) -> ScanFlags {
        self.flags
    }

    /// Borrowed view usable with the [`ruleset`] helpers.
    pub fn view(&self) -> RulesRef<'_> {
        RulesRef {
            raw: self.inner,
            _marker: PhantomData,
        }
    }

    pub fn iter(&self) -> RuleIter<'_> {
        self.view().iter()
    }

    /// See [`ruleset::count`].
    pub fn count(&self) -> usize {
        self.view().count()
    }

    /// See [`ruleset::enumerate`].
    pub fn enumerate<'a, S>(&'a self, out: &mut [S], capacity: usize) -> usize
    where
        S: From<Rule<'a>>,
    {
        self.view().enumerate(out, capacity)
    }

    pub fn as_ptr(&self) -> *mut YR_RULES {
        self.inner.as_ptr()
    }
}

impl Drop for Rules {
    fn drop(&mut self) {
        if let Err(e) = YaraError::from_code(unsafe { ffi::yr_rules_destroy(self.inner.as_ptr()) })
        {
            warn!("destroying rules failed: {}", e);
        }
    }
}

impl fmt::Debug for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rules")
            .field("count", &self.count())
            .field("flags", &self.flags)
            .finish()
    }
}

impl<'a> IntoIterator for &'a Rules {
    type Item = Rule<'a>;
    type IntoIter = RuleIter<'a>;

    fn into_iter(self) -> RuleIter<'a> {
        self.iter()
    }
}

/// A borrowed ruleset handle. Never owns or frees the ruleset.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RulesRef<'a> {
    raw: NonNull<YR_RULES>,
    _marker: PhantomData<&'a YR_RULES>,
}

impl<'a> RulesRef<'a> {
    /// Wrap a ruleset handle owned by someone else. Null yields `None`.
    ///
    /// # Safety
    ///
    /// A non-null `raw` must point to a valid `YR_RULES` that stays alive
    /// and unmodified for `'a`.
    pub unsafe fn from_raw(raw: *const YR_RULES) -> Option<RulesRef<'a>> {
        NonNull::new(raw as *mut YR_RULES).map(|raw| RulesRef {
            raw,
            _marker: PhantomData,
        })
    }

    pub fn iter(self) -> RuleIter<'a> {
        RuleIter {
            next: unsafe { ffi::yrh_rules_first(self.raw.as_ptr()) },
            _marker: PhantomData,
        }
    }

    pub fn count(self) -> usize {
        ruleset::count(&self)
    }

    pub fn enumerate<S: From<Rule<'a>>>(self, out: &mut [S], capacity: usize) -> usize {
        ruleset::enumerate(&self, out, capacity)
    }

    pub fn as_ptr(self) -> *mut YR_RULES {
        self.raw.as_ptr()
    }
}

impl fmt::Debug for RulesRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RulesRef").field(&self.raw).finish()
    }
}

impl<'a> Ruleset for RulesRef<'a> {
    type Rule = Rule<'a>;
    type Iter<'r> = RuleIter<'a> where Self: 'r;

    fn rules(&self) -> RuleIter<'a> {
        self.iter()
    }
}

impl<'a> IntoIterator for RulesRef<'a> {
    type Item = Rule<'a>;
    type IntoIter = RuleIter<'a>;

    fn into_iter(self) -> RuleIter<'a> {
        self.iter()
    }
}

/// Rules of a ruleset in libyara's table order.
///
/// See `yr_rules_foreach` in libyara.
pub struct RuleIter<'a> {
    next: *const YR_RULE,
    _marker: PhantomData<&'a YR_RULE>,
}

impl<'a> Iterator for RuleIter<'a> {
    type Item = Rule<'a>;

    fn next(&mut self) -> Option<Rule<'a>> {
        let current = unsafe { Rule::from_ptr(self.next)? };
        self.next = unsafe { ffi::yrh_rules_next(current.raw.as_ptr()) };
        Some(current)
    }
}

impl FusedIterator for RuleIter<'_> {}

/// Handle to one compiled rule, valid as long as its ruleset.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rule<'a> {
    raw: NonNull<YR_RULE>,
    _marker: PhantomData<&'a YR_RULE>,
}

impl<'a> Rule<'a> {
    /// # Safety
    ///
    /// A non-null `raw` must point into a rules table alive for `'a`.
    pub(crate) unsafe fn from_ptr(raw: *const YR_RULE) -> Option<Rule<'a>> {
        NonNull::new(raw as *mut YR_RULE).map(|raw| Rule {
            raw,
            _marker: PhantomData,
        })
    }

    /// Rule name. Identifiers are ASCII in the rule language.
    pub fn identifier(&self) -> &'a str {
        unsafe { borrow_str(ffi::yrh_rule_identifier(self.raw.as_ptr())) }
            .and_then(|s| s.to_str().ok())
            .unwrap_or_default()
    }

    /// Namespace the rule was compiled into (`"default"` unless given).
    pub fn namespace(&self) -> Cow<'a, str> {
        unsafe { borrow_str(ffi::yrh_rule_namespace(self.raw.as_ptr())) }
            .map(CStr::to_string_lossy)
            .unwrap_or_default()
    }

    pub fn tags(&self) -> SmallVec<[&'a str; 4]> {
        TagIter {
            head: unsafe { ffi::yrh_rule_tags(self.raw.as_ptr()) },
            _marker: PhantomData,
        }
        .filter_map(|tag| tag.to_str().ok())
        .collect()
    }

    pub fn flags(&self) -> RuleFlags {
        RuleFlags::from_raw(unsafe { ffi::yrh_rule_flags(self.raw.as_ptr()) })
    }

    pub fn is_private(&self) -> bool {
        self.flags().contains(RuleFlags::PRIVATE)
    }

    pub fn is_global(&self) -> bool {
        self.flags().contains(RuleFlags::GLOBAL)
    }

    /// Metadata entries in declaration order.
    pub fn metadatas(&self) -> Vec<Metadata<'a>> {
        MetadataIter {
            head: unsafe { ffi::yrh_rule_metas_first(self.raw.as_ptr()) },
            _marker: PhantomData,
        }
        .filter_map(|meta| unsafe { Metadata::from_raw(meta) })
        .collect()
    }

    pub fn as_ptr(&self) -> *mut YR_RULE {
        self.raw.as_ptr()
    }
}

impl fmt::Debug for Rule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("namespace", &self.namespace())
            .field("identifier", &self.identifier())
            .finish()
    }
}

impl<'a> From<Rule<'a>> for *mut YR_RULE {
    fn from(rule: Rule<'a>) -> Self {
        rule.as_ptr()
    }
}

impl<'a> From<Rule<'a>> for *const YR_RULE {
    fn from(rule: Rule<'a>) -> Self {
        rule.as_ptr()
    }
}

/// A metadata entry of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata<'a> {
    pub identifier: &'a str,
    pub value: MetadataValue<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue<'a> {
    Integer(i64),
    String(Cow<'a, str>),
    Boolean(bool),
}

impl<'a> Metadata<'a> {
    /// `None` for the null meta type or an unknown one.
    unsafe fn from_raw(meta: *const YR_META) -> Option<Metadata<'a>> {
        let identifier = borrow_str(ffi::yrh_meta_identifier(meta))?.to_str().ok()?;
        let value = match ffi::yrh_meta_type(meta) {
            ffi::META_TYPE_INTEGER => MetadataValue::Integer(ffi::yrh_meta_integer(meta)),
            ffi::META_TYPE_BOOLEAN => MetadataValue::Boolean(ffi::yrh_meta_integer(meta) != 0),
            ffi::META_TYPE_STRING => MetadataValue::String(
                borrow_str(ffi::yrh_meta_string(meta))
                    .map(CStr::to_string_lossy)
                    .unwrap_or_default(),
            ),
            _ => return None,
        };
        Some(Metadata { identifier, value })
    }
}

/// Walks a rule's tag list: consecutive NUL-terminated strings ending
/// with an empty one.
struct TagIter<'a> {
    head: *const c_char,
    _marker: PhantomData<&'a c_char>,
}

impl<'a> Iterator for TagIter<'a> {
    type Item = &'a CStr;

    fn next(&mut self) -> Option<&'a CStr> {
        if self.head.is_null() || unsafe { *self.head } == 0 {
            return None;
        }
        let tag = unsafe { CStr::from_ptr(self.head) };
        self.head = unsafe { self.head.add(tag.to_bytes_with_nul().len()) };
        Some(tag)
    }
}

/// See `yr_rule_metas_foreach` in libyara.
struct MetadataIter<'a> {
    head: *const YR_META,
    _marker: PhantomData<&'a YR_META>,
}

impl Iterator for MetadataIter<'_> {
    type Item = *const YR_META;

    fn next(&mut self) -> Option<*const YR_META> {
        if self.head.is_null() {
            return None;
        }
        let meta = self.head;
        self.head = unsafe { ffi::yrh_rule_metas_next(meta) };
        Some(meta)
    }
}

unsafe fn borrow_str<'a>(ptr: *const c_char) -> Option<&'a CStr> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr))
    }
}

pub(crate) fn path_to_cstring(path: &Path) -> Result<CString, Error> {
    Ok(CString::new(path.to_string_lossy().into_owned())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_iter_walks_packed_list() {
        let packed = b"first\0second\0\0";
        let tags: Vec<&str> = TagIter {
            head: packed.as_ptr().cast(),
            _marker: PhantomData,
        }
        .map(|t| t.to_str().unwrap())
        .collect();
        assert_eq!(tags, ["first", "second"]);
    }

    #[test]
    fn tag_iter_null_and_empty() {
        assert_eq!(
            TagIter {
                head: ptr::null(),
                _marker: PhantomData
            }
            .count(),
            0
        );
        let empty = b"\0";
        assert_eq!(
            TagIter {
                head: empty.as_ptr().cast(),
                _marker: PhantomData
            }
            .count(),
            0
        );
    }

    #[test]
    fn from_raw_null_is_none() {
        assert!(unsafe { RulesRef::from_raw(ptr::null()) }.is_none());
    }

    #[test]
    fn path_with_nul_is_rejected() {
        assert!(matches!(
            path_to_cstring(Path::new("bad\0name")),
            Err(Error::Nul(_))
        ));
    }
}
