// scan.rs - yr_rules_scan_* with a callback collecting matching rules.
//
// The callback only ever sees rule pointers from the table of the ruleset
// being scanned, so the collected handles share its lifetime.

use std::ffi::c_void;
use std::fs::File;
use std::os::raw::c_int;

use crate::error::YaraError;
use crate::ffi::{self, YR_RULE, YR_RULES, YR_SCAN_CONTEXT};
use crate::flags::ScanFlags;
use crate::rules::Rule;

pub(crate) fn scan_mem<'a>(
    rules: *mut YR_RULES,
    mem: &[u8],
    flags: ScanFlags,
    timeout: u16,
) -> Result<Vec<Rule<'a>>, YaraError> {
    let mut matches: Vec<Rule<'a>> = Vec::new();
    let result = unsafe {
        ffi::yr_rules_scan_mem(
            rules,
            mem.as_ptr(),
            mem.len(),
            flags.bits(),
            Some(scan_callback),
            &mut matches as *mut Vec<Rule<'a>> as *mut c_void,
            c_int::from(timeout),
        )
    };
    YaraError::from_code(result).map(|()| matches)
}

pub(crate) fn scan_file<'a>(
    rules: *mut YR_RULES,
    file: &File,
    flags: ScanFlags,
    timeout: u16,
) -> Result<Vec<Rule<'a>>, YaraError> {
    let mut matches: Vec<Rule<'a>> = Vec::new();
    let result = unsafe {
        ffi::yr_rules_scan_fd(
            rules,
            ffi::file_descriptor(file),
            flags.bits(),
            Some(scan_callback),
            &mut matches as *mut Vec<Rule<'a>> as *mut c_void,
            c_int::from(timeout),
        )
    };
    YaraError::from_code(result).map(|()| matches)
}

unsafe extern "C" fn scan_callback(
    _context: *mut YR_SCAN_CONTEXT,
    message: c_int,
    message_data: *mut c_void,
    user_data: *mut c_void,
) -> c_int {
    if message == ffi::CALLBACK_MSG_RULE_MATCHING {
        let matches = &mut *(user_data as *mut Vec<Rule>);
        if let Some(rule) = Rule::from_ptr(message_data as *const YR_RULE) {
            matches.push(rule);
        }
    }
    ffi::CALLBACK_CONTINUE
}
