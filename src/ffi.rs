// ffi.rs - Raw bindings to libyara and to the compiled cursor shim.
//
// Minimal surface: lifecycle, compiler, rules load/save/destroy/scan and
// global configuration from libyara, plus the csrc/cursor.c helpers that walk the
// rules table with libyara's own foreach macros. Gated behind `ffi`.

#![allow(non_camel_case_types)]

use std::ffi::c_void;
use std::fs::File;
use std::os::raw::{c_char, c_int};
#[cfg(unix)]
use std::os::unix::io::AsRawFd;
#[cfg(windows)]
use std::os::windows::io::AsRawHandle;

// --- Opaque types ---

#[repr(C)]
pub struct YR_RULES {
    _opaque: [u8; 0],
}

#[repr(C)]
pub struct YR_RULE {
    _opaque: [u8; 0],
}

#[repr(C)]
pub struct YR_META {
    _opaque: [u8; 0],
}

#[repr(C)]
pub struct YR_COMPILER {
    _opaque: [u8; 0],
}

#[repr(C)]
pub struct YR_SCAN_CONTEXT {
    _opaque: [u8; 0],
}

// --- YR_STREAM ---

pub type YR_STREAM_READ_FUNC = Option<
    unsafe extern "C" fn(ptr: *mut c_void, size: usize, count: usize, user_data: *mut c_void)
        -> usize,
>;

pub type YR_STREAM_WRITE_FUNC = Option<
    unsafe extern "C" fn(ptr: *const c_void, size: usize, count: usize, user_data: *mut c_void)
        -> usize,
>;

#[repr(C)]
pub struct YR_STREAM {
    pub user_data: *mut c_void,
    pub read: YR_STREAM_READ_FUNC,
    pub write: YR_STREAM_WRITE_FUNC,
}

// --- Compiler callback ---

pub type YR_COMPILER_CALLBACK_FUNC = Option<
    unsafe extern "C" fn(
        error_level: c_int,
        file_name: *const c_char,
        line_number: c_int,
        rule: *const YR_RULE,
        message: *const c_char,
        user_data: *mut c_void,
    ),
>;

// --- Scan callback ---

pub type YR_CALLBACK_FUNC = Option<
    unsafe extern "C" fn(
        context: *mut YR_SCAN_CONTEXT,
        message: c_int,
        message_data: *mut c_void,
        user_data: *mut c_void,
    ) -> c_int,
>;

#[cfg(unix)]
pub type YR_FILE_DESCRIPTOR = c_int;
#[cfg(windows)]
pub type YR_FILE_DESCRIPTOR = *mut c_void;

#[cfg(unix)]
pub(crate) fn file_descriptor(file: &File) -> YR_FILE_DESCRIPTOR {
    file.as_raw_fd()
}

#[cfg(windows)]
pub(crate) fn file_descriptor(file: &File) -> YR_FILE_DESCRIPTOR {
    file.as_raw_handle() as YR_FILE_DESCRIPTOR
}

// --- Constants ---

pub type YR_CONFIG_NAME = c_int;

pub const YR_CONFIG_STACK_SIZE: YR_CONFIG_NAME = 0;
pub const YR_CONFIG_MAX_STRINGS_PER_RULE: YR_CONFIG_NAME = 1;
pub const YR_CONFIG_MAX_MATCH_DATA: YR_CONFIG_NAME = 2;
pub const YR_CONFIG_MAX_PROCESS_MEMORY_CHUNK: YR_CONFIG_NAME = 3;

pub const META_TYPE_INTEGER: c_int = 1;
pub const META_TYPE_STRING: c_int = 2;
pub const META_TYPE_BOOLEAN: c_int = 3;

pub const CALLBACK_MSG_RULE_MATCHING: c_int = 1;
pub const CALLBACK_CONTINUE: c_int = 0;

// --- libyara ---

extern "C" {
    pub fn yr_initialize() -> c_int;
    pub fn yr_finalize() -> c_int;

    pub fn yr_compiler_create(compiler: *mut *mut YR_COMPILER) -> c_int;
    pub fn yr_compiler_destroy(compiler: *mut YR_COMPILER);
    pub fn yr_compiler_set_callback(
        compiler: *mut YR_COMPILER,
        callback: YR_COMPILER_CALLBACK_FUNC,
        user_data: *mut c_void,
    );
    pub fn yr_compiler_add_string(
        compiler: *mut YR_COMPILER,
        rules_string: *const c_char,
        namespace_: *const c_char,
    ) -> c_int;
    pub fn yr_compiler_add_fd(
        compiler: *mut YR_COMPILER,
        rules_fd: YR_FILE_DESCRIPTOR,
        namespace_: *const c_char,
        file_name: *const c_char,
    ) -> c_int;
    pub fn yr_compiler_define_integer_variable(
        compiler: *mut YR_COMPILER,
        identifier: *const c_char,
        value: i64,
    ) -> c_int;
    pub fn yr_compiler_define_float_variable(
        compiler: *mut YR_COMPILER,
        identifier: *const c_char,
        value: f64,
    ) -> c_int;
    pub fn yr_compiler_define_boolean_variable(
        compiler: *mut YR_COMPILER,
        identifier: *const c_char,
        value: c_int,
    ) -> c_int;
    pub fn yr_compiler_define_string_variable(
        compiler: *mut YR_COMPILER,
        identifier: *const c_char,
        value: *const c_char,
    ) -> c_int;
    pub fn yr_compiler_get_rules(compiler: *mut YR_COMPILER, rules: *mut *mut YR_RULES) -> c_int;

    pub fn yr_rules_destroy(rules: *mut YR_RULES) -> c_int;
    pub fn yr_rules_save(rules: *mut YR_RULES, filename: *const c_char) -> c_int;
    pub fn yr_rules_save_stream(rules: *mut YR_RULES, stream: *mut YR_STREAM) -> c_int;
    pub fn yr_rules_load(filename: *const c_char, rules: *mut *mut YR_RULES) -> c_int;
    pub fn yr_rules_load_stream(stream: *mut YR_STREAM, rules: *mut *mut YR_RULES) -> c_int;
    pub fn yr_rules_scan_mem(
        rules: *mut YR_RULES,
        buffer: *const u8,
        buffer_size: usize,
        flags: c_int,
        callback: YR_CALLBACK_FUNC,
        user_data: *mut c_void,
        timeout: c_int,
    ) -> c_int;
    pub fn yr_rules_scan_fd(
        rules: *mut YR_RULES,
        fd: YR_FILE_DESCRIPTOR,
        flags: c_int,
        callback: YR_CALLBACK_FUNC,
        user_data: *mut c_void,
        timeout: c_int,
    ) -> c_int;

    pub fn yr_set_configuration_uint32(name: YR_CONFIG_NAME, value: u32) -> c_int;
    pub fn yr_set_configuration_uint64(name: YR_CONFIG_NAME, value: u64) -> c_int;
    pub fn yr_get_configuration_uint32(name: YR_CONFIG_NAME, dest: *mut u32) -> c_int;
    pub fn yr_get_configuration_uint64(name: YR_CONFIG_NAME, dest: *mut u64) -> c_int;
}

// --- csrc/cursor.c ---

extern "C" {
    /// First rule of the table, or null for a null or empty ruleset.
    pub fn yrh_rules_first(rules: *const YR_RULES) -> *const YR_RULE;
    /// Rule following `rule`, or null once the table sentinel is reached.
    pub fn yrh_rules_next(rule: *const YR_RULE) -> *const YR_RULE;

    pub fn yrh_rule_identifier(rule: *const YR_RULE) -> *const c_char;
    pub fn yrh_rule_namespace(rule: *const YR_RULE) -> *const c_char;
    pub fn yrh_rule_tags(rule: *const YR_RULE) -> *const c_char;
    pub fn yrh_rule_flags(rule: *const YR_RULE) -> u32;

    pub fn yrh_rule_metas_first(rule: *const YR_RULE) -> *const YR_META;
    pub fn yrh_rule_metas_next(meta: *const YR_META) -> *const YR_META;

    pub fn yrh_meta_identifier(meta: *const YR_META) -> *const c_char;
    pub fn yrh_meta_type(meta: *const YR_META) -> c_int;
    pub fn yrh_meta_integer(meta: *const YR_META) -> i64;
    pub fn yrh_meta_string(meta: *const YR_META) -> *const c_char;
}
