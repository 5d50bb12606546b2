// version_test.rs - Tests for the libyara header version guard.

use yara_helpers::version::{self, Compatibility, Version, VersionError, SUPPORTED_MAJOR};

fn libyara_h(major: &str, minor: &str, micro: &str) -> String {
    format!(
        r##"/*
Copyright (c) 2014. The YARA Authors. All Rights Reserved.
*/

#ifndef YR_LIBYARA_H
#define YR_LIBYARA_H

#include <yara/utils.h>

// YR_MAJOR_VERSION is bumped on incompatible changes.
#define YR_MAJOR_VERSION {major}
#define YR_MINOR_VERSION {minor}
#define YR_MICRO_VERSION {micro}

#define version_str(s)  _version_str(s)
#define _version_str(s) #s

// Version as a string
#define YR_VERSION                                                    \
  version_str(YR_MAJOR_VERSION) "." version_str(YR_MINOR_VERSION) "." \
      version_str(YR_MICRO_VERSION)

// Version as a single 4-byte hex number, e.g. 0x030401 == 3.4.1.
#define YR_VERSION_HEX \
  ((YR_MAJOR_VERSION << 16) | (YR_MINOR_VERSION << 8) | (YR_MICRO_VERSION << 0))

YR_API int yr_initialize(void);

YR_API int yr_finalize(void);

#endif
"##
    )
}

// === parse_header ===

#[test]
fn parses_v4_header() {
    let header = libyara_h("4", "5", "2");
    assert_eq!(
        Version::parse_header(header.as_bytes()),
        Ok(Version::new(4, 5, 2))
    );
}

#[test]
fn micro_defaults_to_zero() {
    let header = "#define YR_MAJOR_VERSION 4\n#define YR_MINOR_VERSION 1\n";
    assert_eq!(
        Version::parse_header(header.as_bytes()),
        Ok(Version::new(4, 1, 0))
    );
}

#[test]
fn crlf_line_endings() {
    let header = "#define YR_MAJOR_VERSION 4\r\n#define YR_MINOR_VERSION 3\r\n#define YR_MICRO_VERSION 1\r\n";
    assert_eq!(
        Version::parse_header(header.as_bytes()),
        Ok(Version::new(4, 3, 1))
    );
}

#[test]
fn missing_major_macro() {
    let header = "#define YR_MINOR_VERSION 3\n";
    assert_eq!(
        Version::parse_header(header.as_bytes()),
        Err(VersionError::MissingMacro("YR_MAJOR_VERSION"))
    );
}

#[test]
fn missing_minor_macro() {
    let header = "#define YR_MAJOR_VERSION 4\n#define YR_MICRO_VERSION 0\n";
    let err = Version::parse_header(header.as_bytes()).unwrap_err();
    assert_eq!(err, VersionError::MissingMacro("YR_MINOR_VERSION"));
    assert_eq!(
        err.to_string(),
        "yara version macro not defined: YR_MINOR_VERSION"
    );
}

#[test]
fn mentions_outside_define_do_not_count() {
    let header = "// see YR_MAJOR_VERSION\nint x = YR_MINOR_VERSION;\n";
    assert_eq!(
        Version::parse_header(header.as_bytes()),
        Err(VersionError::MissingMacro("YR_MAJOR_VERSION"))
    );
}

#[test]
fn commented_out_defines_do_not_count() {
    let header = "/*\n#define YR_MAJOR_VERSION 3\n*/\n\
                  #define YR_MAJOR_VERSION 4\n\
                  #define YR_MINOR_VERSION 1\n";
    assert_eq!(
        version::check_header(header.as_bytes()),
        Ok((Version::new(4, 1, 0), Compatibility::Supported))
    );
}

#[test]
fn invalid_macro_value() {
    let header = libyara_h("four", "0", "0");
    let err = Version::parse_header(header.as_bytes()).unwrap_err();
    assert_eq!(
        err,
        VersionError::InvalidMacro {
            name: "YR_MAJOR_VERSION",
            value: "four".to_string(),
        }
    );
}

// === check ===

#[test]
fn v3_is_rejected() {
    let header = libyara_h("3", "11", "0");
    let err = version::check_header(header.as_bytes()).unwrap_err();
    assert_eq!(
        err,
        VersionError::Unsupported {
            found: Version::new(3, 11, 0),
            supported: SUPPORTED_MAJOR,
        }
    );
    assert_eq!(
        err.to_string(),
        "yara 3.11.0 is not supported: only yara v4 is supported"
    );
}

#[test]
fn v4_is_supported() {
    for minor in ["0", "3", "5"] {
        let header = libyara_h("4", minor, "0");
        let (found, compat) = version::check_header(header.as_bytes()).unwrap();
        assert_eq!(found.major, 4);
        assert_eq!(compat, Compatibility::Supported);
    }
}

#[test]
fn v5_builds_as_newer() {
    let header = libyara_h("5", "0", "0");
    assert_eq!(
        version::check_header(header.as_bytes()),
        Ok((Version::new(5, 0, 0), Compatibility::Newer))
    );
}

#[test]
fn versions_order_by_component() {
    assert!(Version::new(4, 0, 9) < Version::new(4, 1, 0));
    assert!(Version::new(3, 99, 99) < Version::new(4, 0, 0));
}
