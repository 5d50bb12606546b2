// capi.rs - C ABI exports for binding layers.
//
// Declared in include/yara_helpers.h. Both functions are total: a null
// ruleset or a null buffer yields 0 and nothing is written.

use std::mem::MaybeUninit;
use std::slice;

use log::trace;

use crate::ffi::{YR_RULE, YR_RULES};
use crate::rules::RulesRef;
use crate::ruleset;

/// Copy up to `n` rule handles of `rules` into `out`, in libyara's table
/// order. Returns the number of handles written, at most `n`.
///
/// # Safety
///
/// `rules` must be null or a valid `YR_RULES*`; `out` must be null or
/// valid for writes of `min(n, yrh_get_num_rules(rules))` pointers, so
/// `SIZE_MAX` may be passed for a buffer sized from the rule count.
#[no_mangle]
pub unsafe extern "C" fn yrh_get_rules(
    rules: *const YR_RULES,
    out: *mut *mut YR_RULE,
    n: usize,
) -> usize {
    let Some(view) = RulesRef::from_raw(rules) else {
        return 0;
    };
    if out.is_null() || n == 0 {
        return 0;
    }

    let total = ruleset::count(&view);
    let len = n.min(total);
    if total > n {
        trace!("rule buffer of {} slots truncated {} rules", n, total);
    }

    // view only the slots that will be written
    let out = slice::from_raw_parts_mut(out.cast::<MaybeUninit<*mut YR_RULE>>(), len);
    ruleset::enumerate_uninit(&view, out, len)
}

/// Number of rules in `rules`; 0 for null.
///
/// # Safety
///
/// `rules` must be null or a valid `YR_RULES*`.
#[no_mangle]
pub unsafe extern "C" fn yrh_get_num_rules(rules: *const YR_RULES) -> usize {
    match RulesRef::from_raw(rules) {
        Some(view) => ruleset::count(&view),
        None => 0,
    }
}
