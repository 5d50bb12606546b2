// compiler.rs - Thin wrapper over YR_COMPILER producing Rules.
//
// Diagnostics reach us through the libyara compiler callback; each add
// call installs a callback pointing at a local Vec and removes it before
// returning.

use std::ffi::{c_void, CStr, CString};
use std::fs::File;
use std::os::raw::{c_char, c_int};
use std::path::Path;
use std::ptr::{self, NonNull};

use log::{debug, warn};

use crate::error::{
    CompileError, CompileErrorLevel, CompileErrors, Error, IoError, IoErrorKind, YaraError,
};
use crate::ffi::{self, YR_COMPILER, YR_RULE, YR_RULES};
use crate::initialize::InitializationToken;
use crate::rules::{path_to_cstring, Rules};

/// Yara rules compiler.
///
/// Once an add call has reported an error, libyara refuses to produce
/// rules from this compiler; start over with a new one.
pub struct Compiler {
    inner: NonNull<YR_COMPILER>,
    _token: InitializationToken,
}

impl Compiler {
    pub fn new() -> Result<Compiler, YaraError> {
        let token = InitializationToken::new()?;
        let mut raw: *mut YR_COMPILER = ptr::null_mut();
        YaraError::from_code(unsafe { ffi::yr_compiler_create(&mut raw) })?;
        let inner = NonNull::new(raw).ok_or(YaraError::InsufficientMemory)?;
        Ok(Compiler {
            inner,
            _token: token,
        })
    }

    /// Add rule definitions from a string.
    ///
    /// ```no_run
    /// # use yara_helpers::Compiler;
    /// let mut compiler = Compiler::new()?;
    /// compiler.add_rules_str("rule is_empty { condition: filesize == 0 }")?;
    /// let rules = compiler.compile_rules()?;
    /// assert_eq!(rules.count(), 1);
    /// # Ok::<(), yara_helpers::Error>(())
    /// ```
    pub fn add_rules_str(&mut self, rules: &str) -> Result<(), Error> {
        self.add_string(rules, None)
    }

    /// Add rule definitions from a string within a namespace.
    pub fn add_rules_str_with_namespace(
        &mut self,
        rules: &str,
        namespace: &str,
    ) -> Result<(), Error> {
        self.add_string(rules, Some(namespace))
    }

    /// Add rule definitions from a file.
    pub fn add_rules_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {
        self.add_file(path.as_ref(), None)
    }

    /// Add rule definitions from a file within a namespace.
    pub fn add_rules_file_with_namespace<P: AsRef<Path>>(
        &mut self,
        path: P,
        namespace: &str,
    ) -> Result<(), Error> {
        self.add_file(path.as_ref(), Some(namespace))
    }

    /// Define an external variable.
    ///
    /// Variables must be defined before the rules that use them are added.
    pub fn define_variable<V: CompilerVariableValue>(
        &mut self,
        identifier: &str,
        value: V,
    ) -> Result<(), Error> {
        let identifier = CString::new(identifier)?;
        let code = value.define(self.inner.as_ptr(), &identifier)?;
        YaraError::from_code(code)?;
        Ok(())
    }

    /// Compile everything added so far. Consumes the compiler.
    ///
    /// The rules do not depend on the compiler, which is destroyed here.
    pub fn compile_rules(self) -> Result<Rules, YaraError> {
        let token = InitializationToken::new()?;
        let mut raw: *mut YR_RULES = ptr::null_mut();
        let result = unsafe { ffi::yr_compiler_get_rules(self.inner.as_ptr(), &mut raw) };
        YaraError::from_code(result)?;
        let rules = Rules::from_owned(raw, token)?;
        debug!("compiled {} rules", rules.count());
        Ok(rules)
    }

    fn add_string(&mut self, rules: &str, namespace: Option<&str>) -> Result<(), Error> {
        let rules = CString::new(rules)?;
        let namespace = namespace.map(CString::new).transpose()?;
        let compiler = self.inner.as_ptr();
        self.collect_diagnostics(|| unsafe {
            ffi::yr_compiler_add_string(compiler, rules.as_ptr(), opt_ptr(namespace.as_deref()))
        })
    }

    fn add_file(&mut self, path: &Path, namespace: Option<&str>) -> Result<(), Error> {
        let file = File::open(path).map_err(|e| IoError::new(e, IoErrorKind::OpenRulesFile))?;
        let file_name = path_to_cstring(path)?;
        let namespace = namespace.map(CString::new).transpose()?;
        let compiler = self.inner.as_ptr();
        self.collect_diagnostics(|| unsafe {
            ffi::yr_compiler_add_fd(
                compiler,
                ffi::file_descriptor(&file),
                opt_ptr(namespace.as_deref()),
                file_name.as_ptr(),
            )
        })
    }

    /// Run an add call with the diagnostics callback installed.
    fn collect_diagnostics<F: FnOnce() -> c_int>(&mut self, add: F) -> Result<(), Error> {
        let mut messages: Vec<CompileError> = Vec::new();
        let compiler = self.inner.as_ptr();
        let result = unsafe {
            ffi::yr_compiler_set_callback(
                compiler,
                Some(compile_callback),
                &mut messages as *mut Vec<CompileError> as *mut c_void,
            );
            let result = add();
            ffi::yr_compiler_set_callback(compiler, None, ptr::null_mut());
            result
        };

        for warning in messages.iter().filter(|m| m.level == CompileErrorLevel::Warning) {
            warn!("{}", warning);
        }

        let has_error = messages.iter().any(|m| m.level == CompileErrorLevel::Error);
        if result == 0 && !has_error {
            Ok(())
        } else {
            Err(CompileErrors::new(messages).into())
        }
    }
}

impl Drop for Compiler {
    fn drop(&mut self) {
        unsafe { ffi::yr_compiler_destroy(self.inner.as_ptr()) }
    }
}

fn opt_ptr(s: Option<&CStr>) -> *const c_char {
    s.map_or(ptr::null(), CStr::as_ptr)
}

unsafe extern "C" fn compile_callback(
    error_level: c_int,
    file_name: *const c_char,
    line_number: c_int,
    _rule: *const YR_RULE,
    message: *const c_char,
    user_data: *mut c_void,
) {
    let messages = &mut *(user_data as *mut Vec<CompileError>);
    let text = |ptr: *const c_char| {
        if ptr.is_null() {
            None
        } else {
            Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
        }
    };
    messages.push(CompileError {
        // unknown levels are treated as errors
        level: CompileErrorLevel::try_from_code(error_level).unwrap_or(CompileErrorLevel::Error),
        filename: text(file_name),
        line: usize::try_from(line_number).unwrap_or(0),
        message: text(message).unwrap_or_default(),
    });
}

/// Types accepted as external variable values.
///
/// Valid types are `bool`, `i64`, `f64`, `&str` and `&CStr`.
pub trait CompilerVariableValue {
    /// Returns the raw libyara status code.
    fn define(&self, compiler: *mut YR_COMPILER, identifier: &CStr) -> Result<c_int, Error>;
}

impl CompilerVariableValue for bool {
    fn define(&self, compiler: *mut YR_COMPILER, identifier: &CStr) -> Result<c_int, Error> {
        let value = c_int::from(*self);
        Ok(unsafe { ffi::yr_compiler_define_boolean_variable(compiler, identifier.as_ptr(), value) })
    }
}

impl CompilerVariableValue for i64 {
    fn define(&self, compiler: *mut YR_COMPILER, identifier: &CStr) -> Result<c_int, Error> {
        Ok(unsafe { ffi::yr_compiler_define_integer_variable(compiler, identifier.as_ptr(), *self) })
    }
}

impl CompilerVariableValue for f64 {
    fn define(&self, compiler: *mut YR_COMPILER, identifier: &CStr) -> Result<c_int, Error> {
        Ok(unsafe { ffi::yr_compiler_define_float_variable(compiler, identifier.as_ptr(), *self) })
    }
}

impl CompilerVariableValue for &str {
    fn define(&self, compiler: *mut YR_COMPILER, identifier: &CStr) -> Result<c_int, Error> {
        let value = CString::new(*self)?;
        value.as_c_str().define(compiler, identifier)
    }
}

impl CompilerVariableValue for &CStr {
    fn define(&self, compiler: *mut YR_COMPILER, identifier: &CStr) -> Result<c_int, Error> {
        Ok(unsafe {
            ffi::yr_compiler_define_string_variable(compiler, identifier.as_ptr(), self.as_ptr())
        })
    }
}
