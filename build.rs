fn main() {
    // The ESP-IDF environment only exists when cross-compiling for the board.
    // Host builds (simulator + tests) skip it.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}
