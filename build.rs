fn main() {
    // Propagate the ESP-IDF build environment to dependents when the
    // espidf feature is active. Host builds have nothing to propagate.
    if std::env::var_os("CARGO_FEATURE_ESPIDF").is_some() {
        embuild::espidf::sysenv::output();
    }
}
