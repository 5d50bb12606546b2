// config.rs - libyara global configuration (YR_CONFIG_*).
//
// These settings are process-wide and shared by every ruleset.

use std::os::raw::c_int;

use crate::error::YaraError;
use crate::ffi;

/// Set the scan stack size (YR_CONFIG_STACK_SIZE).
pub fn set_stack_size(value: u32) -> Result<(), YaraError> {
    set_u32(ffi::YR_CONFIG_STACK_SIZE, value)
}

pub fn get_stack_size() -> Result<u32, YaraError> {
    get_u32(ffi::YR_CONFIG_STACK_SIZE)
}

/// Set the maximum number of strings per rule (YR_CONFIG_MAX_STRINGS_PER_RULE).
pub fn set_max_strings_per_rule(value: u32) -> Result<(), YaraError> {
    set_u32(ffi::YR_CONFIG_MAX_STRINGS_PER_RULE, value)
}

pub fn get_max_strings_per_rule() -> Result<u32, YaraError> {
    get_u32(ffi::YR_CONFIG_MAX_STRINGS_PER_RULE)
}

/// Set the maximum number of bytes kept per match (YR_CONFIG_MAX_MATCH_DATA).
pub fn set_max_match_data(value: u32) -> Result<(), YaraError> {
    set_u32(ffi::YR_CONFIG_MAX_MATCH_DATA, value)
}

pub fn get_max_match_data() -> Result<u32, YaraError> {
    get_u32(ffi::YR_CONFIG_MAX_MATCH_DATA)
}

/// Set the chunk size used when reading process memory
/// (YR_CONFIG_MAX_PROCESS_MEMORY_CHUNK).
pub fn set_max_process_memory_chunk(value: u64) -> Result<(), YaraError> {
    set_u64(ffi::YR_CONFIG_MAX_PROCESS_MEMORY_CHUNK, value)
}

pub fn get_max_process_memory_chunk() -> Result<u64, YaraError> {
    get_u64(ffi::YR_CONFIG_MAX_PROCESS_MEMORY_CHUNK)
}

fn set_u32(name: ffi::YR_CONFIG_NAME, value: u32) -> Result<(), YaraError> {
    status(unsafe { ffi::yr_set_configuration_uint32(name, value) })
}

fn set_u64(name: ffi::YR_CONFIG_NAME, value: u64) -> Result<(), YaraError> {
    status(unsafe { ffi::yr_set_configuration_uint64(name, value) })
}

fn get_u32(name: ffi::YR_CONFIG_NAME) -> Result<u32, YaraError> {
    let mut value = 0;
    status(unsafe { ffi::yr_get_configuration_uint32(name, &mut value) }).map(|()| value)
}

fn get_u64(name: ffi::YR_CONFIG_NAME) -> Result<u64, YaraError> {
    let mut value = 0;
    status(unsafe { ffi::yr_get_configuration_uint64(name, &mut value) }).map(|()| value)
}

fn status(code: c_int) -> Result<(), YaraError> {
    YaraError::from_code(code)
}
