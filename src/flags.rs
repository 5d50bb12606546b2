// flags.rs - Rule flag word and scan flags (yara/types.h).

use bitflags::bitflags;

bitflags! {
    /// Flags carried by a compiled rule.
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RuleFlags: u32 {
        /// RULE_FLAGS_PRIVATE
        const PRIVATE = 0x01;
        /// RULE_FLAGS_GLOBAL
        const GLOBAL = 0x02;
        /// RULE_FLAGS_NULL: marks the end of the rules table, never set on a real rule.
        const NULL = 0x04;
        /// RULE_FLAGS_DISABLED
        const DISABLED = 0x08;
    }
}

impl RuleFlags {
    /// Keep bits this crate does not name, so newer libyara flags survive.
    pub fn from_raw(raw: u32) -> Self {
        RuleFlags::from_bits_retain(raw)
    }
}

bitflags! {
    /// Flags passed to libyara's scan functions (SCAN_FLAGS_* in yara/types.h).
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ScanFlags: i32 {
        /// SCAN_FLAGS_FAST_MODE: stop at the first match of each string.
        const FAST_MODE = 0x01;
        /// SCAN_FLAGS_NO_TRYCATCH
        const NO_TRYCATCH = 0x04;
        /// SCAN_FLAGS_REPORT_RULES_MATCHING
        const REPORT_RULES_MATCHING = 0x08;
        /// SCAN_FLAGS_REPORT_RULES_NOT_MATCHING
        const REPORT_RULES_NOT_MATCHING = 0x10;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_keeps_unknown_bits() {
        let flags = RuleFlags::from_raw(0x01 | 0x40);
        assert!(flags.contains(RuleFlags::PRIVATE));
        assert!(!flags.contains(RuleFlags::GLOBAL));
        assert_eq!(flags.bits(), 0x41);
    }

    #[test]
    fn default_is_empty() {
        assert!(RuleFlags::default().is_empty());
        assert!(ScanFlags::default().is_empty());
    }

    #[test]
    fn scan_flag_bits() {
        let flags = ScanFlags::FAST_MODE | ScanFlags::REPORT_RULES_MATCHING;
        assert_eq!(flags.bits(), 0x09);
    }
}
