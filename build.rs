fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // ESP-IDF link args; device builds only.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
