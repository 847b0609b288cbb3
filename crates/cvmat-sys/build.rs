fn main() {
    // Only build the C++ glue shim when the `cpp` feature is enabled.
    #[cfg(feature = "cpp")]
    {
        use std::env;

        let glue_src = env::var("CVRS_GLUE_SRC").unwrap_or_else(|_| "../../glue".to_string());

        let dst = cmake::Config::new(&glue_src)
            .define("CMAKE_BUILD_TYPE", "Release")
            .build();

        println!(
            "cargo:rustc-link-search=native={}",
            dst.join("lib").display()
        );
        println!("cargo:rustc-link-lib=static=cvrs_capi");
        println!("cargo:rustc-link-lib=opencv_core");

        #[cfg(target_os = "macos")]
        println!("cargo:rustc-link-lib=c++");

        println!("cargo:rerun-if-env-changed=CVRS_GLUE_SRC");
    }
}
