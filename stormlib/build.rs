use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=STORMLIB_LIB_DIR");
    println!("cargo:rerun-if-env-changed=STORMLIB_STATIC");

    // Only the `link` feature resolves StormLib at build time
    if env::var_os("CARGO_FEATURE_LINK").is_none() {
        return;
    }

    if let Some(dir) = env::var_os("STORMLIB_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", dir.to_string_lossy());
    }

    if env::var_os("STORMLIB_STATIC").is_some() {
        println!("cargo:rustc-link-lib=static=storm");

        // A static StormLib pulls in its compression backends and the C++ runtime
        let target = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
        println!("cargo:rustc-link-lib=z");
        println!("cargo:rustc-link-lib=bz2");
        match target.as_str() {
            "windows" => println!("cargo:rustc-link-lib=wininet"),
            "macos" | "ios" => println!("cargo:rustc-link-lib=c++"),
            _ => println!("cargo:rustc-link-lib=stdc++"),
        }
    } else {
        println!("cargo:rustc-link-lib=dylib=storm");
    }
}
