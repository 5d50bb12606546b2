// build.rs -- Check the libyara version and compile the cursor shim (gated on `ffi` feature)

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    #[cfg(feature = "ffi")]
    build_yara_shim();
}

#[cfg(feature = "ffi")]
#[allow(dead_code)]
#[path = "src/version.rs"]
mod version;

#[cfg(feature = "ffi")]
fn build_yara_shim() {
    use std::env;
    use std::path::PathBuf;

    use version::{Compatibility, Version, SUPPORTED_MAJOR};

    println!("cargo:rerun-if-env-changed=YARA_INCLUDE_DIR");
    println!("cargo:rerun-if-env-changed=YARA_LIBRARY_PATH");
    println!("cargo:rerun-if-changed=csrc/cursor.c");
    println!("cargo:rerun-if-changed=src/version.rs");

    // Link the system libyara.
    println!("cargo:rustc-link-lib=yara");
    if let Some(path) = env::var("YARA_LIBRARY_PATH")
        .ok()
        .filter(|path| !path.is_empty())
    {
        println!("cargo:rustc-link-search=native={}", path);
    }

    // Locate the headers the shim will be compiled against.
    let explicit = env::var("YARA_INCLUDE_DIR")
        .ok()
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from);
    let candidates: Vec<PathBuf> = match &explicit {
        Some(dir) => vec![dir.clone()],
        None => ["/usr/include", "/usr/local/include", "/opt/homebrew/include"]
            .iter()
            .map(PathBuf::from)
            .collect(),
    };
    let include_dir = candidates
        .iter()
        .find(|dir| dir.join("yara").join("libyara.h").is_file())
        .cloned()
        .unwrap_or_else(|| {
            panic!(
                "could not find yara/libyara.h in {:?}; set YARA_INCLUDE_DIR",
                candidates
            )
        });

    let libyara_h = include_dir.join("yara").join("libyara.h");
    println!("cargo:rerun-if-changed={}", libyara_h.display());
    let header = std::fs::read(&libyara_h).unwrap();

    // Version guard: missing macros and older majors fail the build,
    // newer majors only warn.
    let (found, compat): (Version, Compatibility) = match version::check_header(&header) {
        Ok(result) => result,
        Err(e) => panic!("{} ({})", e, libyara_h.display()),
    };
    if compat == Compatibility::Newer {
        println!(
            "cargo:warning=yara versions above v{} are not supported (found {}); please use yara v{}",
            SUPPORTED_MAJOR, found, SUPPORTED_MAJOR
        );
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    std::fs::write(
        out_dir.join("yara_version.rs"),
        format!(
            "crate::version::Version::new({}, {}, {})\n",
            found.major, found.minor, found.micro
        ),
    )
    .unwrap();

    cc::Build::new()
        .include(&include_dir)
        .file("csrc/cursor.c")
        .warnings(true)
        .compile("yara_helpers_cursor");
}
