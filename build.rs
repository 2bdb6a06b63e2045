fn main() {
    println!("cargo:rerun-if-env-changed=JIG_CONFIG");

    // Only the ESP-IDF build needs the IDF environment exported; host test
    // builds run without embuild.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
