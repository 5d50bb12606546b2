// error.rs - Error types for the libyara bindings.
//
// Maps libyara's integer status codes (yara/error.h) onto named variants
// while preserving the original code for interop.

use std::ffi::NulError;
use std::fmt;
use std::io;
use std::os::raw::c_int;

pub const ERROR_SUCCESS: c_int = 0;
pub const ERROR_INSUFFICIENT_MEMORY: c_int = 1;
pub const ERROR_COULD_NOT_ATTACH_TO_PROCESS: c_int = 2;
pub const ERROR_COULD_NOT_OPEN_FILE: c_int = 3;
pub const ERROR_COULD_NOT_MAP_FILE: c_int = 4;
pub const ERROR_INVALID_FILE: c_int = 6;
pub const ERROR_CORRUPT_FILE: c_int = 7;
pub const ERROR_UNSUPPORTED_FILE_VERSION: c_int = 8;
pub const ERROR_SYNTAX_ERROR: c_int = 11;
pub const ERROR_DUPLICATED_IDENTIFIER: c_int = 14;
pub const ERROR_UNDEFINED_IDENTIFIER: c_int = 20;
pub const ERROR_WRONG_TYPE: c_int = 24;
pub const ERROR_SCAN_TIMEOUT: c_int = 26;
pub const ERROR_CALLBACK_ERROR: c_int = 28;
pub const ERROR_INVALID_ARGUMENT: c_int = 29;
pub const ERROR_TOO_MANY_MATCHES: c_int = 30;
pub const ERROR_INTERNAL_FATAL_ERROR: c_int = 31;

pub const YARA_ERROR_LEVEL_ERROR: c_int = 0;
pub const YARA_ERROR_LEVEL_WARNING: c_int = 1;

/// A libyara status code other than `ERROR_SUCCESS`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum YaraError {
    /// Insufficient memory to complete the operation.
    InsufficientMemory,
    /// Could not attach to process.
    CouldNotAttach,
    /// File could not be opened.
    CouldNotOpenFile,
    /// File could not be mapped into memory.
    CouldNotMapFile,
    /// File is not a valid rules file.
    InvalidFile,
    /// Rules file is corrupt.
    CorruptFile,
    /// Rules file version is not supported.
    UnsupportedFileVersion,
    /// Syntax error in a rule.
    SyntaxError,
    /// Identifier defined twice (rule or external variable).
    DuplicatedIdentifier,
    /// Reference to an undefined identifier.
    UndefinedIdentifier,
    /// Value of the wrong type (for instance an external variable).
    WrongType,
    /// Timed out during scan.
    ScanTimeout,
    /// A callback returned an error.
    CallbackError,
    /// Invalid argument passed to a libyara function.
    InvalidArgument,
    /// Too many matches.
    TooManyMatches,
    /// Internal fatal error.
    InternalFatalError,
    /// Any code not listed above.
    Unknown(i32),
}

impl YaraError {
    /// Convert a libyara return code; `ERROR_SUCCESS` becomes `Ok(())`.
    pub fn from_code(code: c_int) -> Result<(), YaraError> {
        let err = match code {
            ERROR_SUCCESS => return Ok(()),
            ERROR_INSUFFICIENT_MEMORY => YaraError::InsufficientMemory,
            ERROR_COULD_NOT_ATTACH_TO_PROCESS => YaraError::CouldNotAttach,
            ERROR_COULD_NOT_OPEN_FILE => YaraError::CouldNotOpenFile,
            ERROR_COULD_NOT_MAP_FILE => YaraError::CouldNotMapFile,
            ERROR_INVALID_FILE => YaraError::InvalidFile,
            ERROR_CORRUPT_FILE => YaraError::CorruptFile,
            ERROR_UNSUPPORTED_FILE_VERSION => YaraError::UnsupportedFileVersion,
            ERROR_SYNTAX_ERROR => YaraError::SyntaxError,
            ERROR_DUPLICATED_IDENTIFIER => YaraError::DuplicatedIdentifier,
            ERROR_UNDEFINED_IDENTIFIER => YaraError::UndefinedIdentifier,
            ERROR_WRONG_TYPE => YaraError::WrongType,
            ERROR_SCAN_TIMEOUT => YaraError::ScanTimeout,
            ERROR_CALLBACK_ERROR => YaraError::CallbackError,
            ERROR_INVALID_ARGUMENT => YaraError::InvalidArgument,
            ERROR_TOO_MANY_MATCHES => YaraError::TooManyMatches,
            ERROR_INTERNAL_FATAL_ERROR => YaraError::InternalFatalError,
            other => YaraError::Unknown(other),
        };
        Err(err)
    }

    /// Returns the original libyara error code.
    pub fn code(&self) -> i32 {
        match self {
            YaraError::InsufficientMemory => ERROR_INSUFFICIENT_MEMORY,
            YaraError::CouldNotAttach => ERROR_COULD_NOT_ATTACH_TO_PROCESS,
            YaraError::CouldNotOpenFile => ERROR_COULD_NOT_OPEN_FILE,
            YaraError::CouldNotMapFile => ERROR_COULD_NOT_MAP_FILE,
            YaraError::InvalidFile => ERROR_INVALID_FILE,
            YaraError::CorruptFile => ERROR_CORRUPT_FILE,
            YaraError::UnsupportedFileVersion => ERROR_UNSUPPORTED_FILE_VERSION,
            YaraError::SyntaxError => ERROR_SYNTAX_ERROR,
            YaraError::DuplicatedIdentifier => ERROR_DUPLICATED_IDENTIFIER,
            YaraError::UndefinedIdentifier => ERROR_UNDEFINED_IDENTIFIER,
            YaraError::WrongType => ERROR_WRONG_TYPE,
            YaraError::ScanTimeout => ERROR_SCAN_TIMEOUT,
            YaraError::CallbackError => ERROR_CALLBACK_ERROR,
            YaraError::InvalidArgument => ERROR_INVALID_ARGUMENT,
            YaraError::TooManyMatches => ERROR_TOO_MANY_MATCHES,
            YaraError::InternalFatalError => ERROR_INTERNAL_FATAL_ERROR,
            YaraError::Unknown(code) => *code,
        }
    }
}

impl fmt::Display for YaraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YaraError::InsufficientMemory => write!(f, "insufficient memory"),
            YaraError::CouldNotAttach => write!(f, "could not attach to process"),
            YaraError::CouldNotOpenFile => write!(f, "file could not be opened"),
            YaraError::CouldNotMapFile => write!(f, "file could not be mapped into memory"),
            YaraError::InvalidFile => write!(f, "file is not a valid rules file"),
            YaraError::CorruptFile => write!(f, "rules file is corrupt"),
            YaraError::UnsupportedFileVersion => write!(f, "rules file version is not supported"),
            YaraError::SyntaxError => write!(f, "syntax error in rule"),
            YaraError::DuplicatedIdentifier => write!(f, "duplicated identifier"),
            YaraError::UndefinedIdentifier => write!(f, "undefined identifier"),
            YaraError::WrongType => write!(f, "wrong type"),
            YaraError::ScanTimeout => write!(f, "scan timed out"),
            YaraError::CallbackError => write!(f, "callback returned an error"),
            YaraError::InvalidArgument => write!(f, "invalid argument"),
            YaraError::TooManyMatches => write!(f, "too many matches"),
            YaraError::InternalFatalError => write!(f, "internal fatal error"),
            YaraError::Unknown(code) => write!(f, "unknown yara error code {}", code),
        }
    }
}

impl std::error::Error for YaraError {}

/// Severity of a compiler diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompileErrorLevel {
    Error,
    Warning,
}

impl CompileErrorLevel {
    /// Returns `Err(code)` when the level is neither error nor warning.
    pub fn try_from_code(code: c_int) -> Result<CompileErrorLevel, c_int> {
        match code {
            YARA_ERROR_LEVEL_ERROR => Ok(CompileErrorLevel::Error),
            YARA_ERROR_LEVEL_WARNING => Ok(CompileErrorLevel::Warning),
            other => Err(other),
        }
    }
}

/// One diagnostic reported by the libyara compiler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileError {
    pub level: CompileErrorLevel,
    pub filename: Option<String>,
    pub line: usize,
    pub message: String,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            CompileErrorLevel::Error => "error",
            CompileErrorLevel::Warning => "warning",
        };
        write!(f, "compile {} ", level)?;
        if let Some(filename) = &self.filename {
            write!(f, "in {} ", filename)?;
        }
        write!(f, "at line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for CompileError {}

/// All diagnostics of a failed compiler call, in report order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompileErrors {
    errors: Vec<CompileError>,
}

impl CompileErrors {
    pub fn new(errors: Vec<CompileError>) -> Self {
        CompileErrors { errors }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompileError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// First diagnostic at [`CompileErrorLevel::Error`].
    pub fn first_error(&self) -> Option<&CompileError> {
        self.errors
            .iter()
            .find(|e| e.level == CompileErrorLevel::Error)
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "rule compilation failed");
        }
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileErrors {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.first_error()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// What was being done when an I/O error happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IoErrorKind {
    OpenRulesFile,
    OpenScanFile,
    ReadingRules,
    WritingRules,
}

impl fmt::Display for IoErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoErrorKind::OpenRulesFile => write!(f, "error while opening rules file"),
            IoErrorKind::OpenScanFile => write!(f, "error while opening file to scan"),
            IoErrorKind::ReadingRules => write!(f, "error while reading compiled rules"),
            IoErrorKind::WritingRules => write!(f, "error while writing compiled rules"),
        }
    }
}

#[derive(Debug)]
pub struct IoError {
    kind: IoErrorKind,
    source: io::Error,
}

impl IoError {
    pub fn new(source: io::Error, kind: IoErrorKind) -> Self {
        IoError { kind, source }
    }

    pub fn kind(&self) -> IoErrorKind {
        self.kind
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.source)
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Any error returned by this crate.
#[derive(Debug)]
pub enum Error {
    /// A libyara status code.
    Yara(YaraError),
    /// Rule compilation diagnostics.
    Compile(CompileErrors),
    /// An I/O error on a rules file or stream.
    Io(IoError),
    /// A string passed to libyara contained an interior NUL byte.
    Nul(NulError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Yara(e) => write!(f, "{}", e),
            Error::Compile(e) => write!(f, "{}", e),
            Error::Io(e) => write!(f, "{}", e),
            Error::Nul(e) => write!(f, "invalid string for yara: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Yara(e) => Some(e),
            Error::Compile(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::Nul(e) => Some(e),
        }
    }
}

impl From<YaraError> for Error {
    fn from(error: YaraError) -> Self {
        Error::Yara(error)
    }
}

impl From<CompileErrors> for Error {
    fn from(error: CompileErrors) -> Self {
        Error::Compile(error)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Self {
        Error::Io(error)
    }
}

impl From<NulError> for Error {
    fn from(error: NulError) -> Self {
        Error::Nul(error)
    }
}
