use teelog::{Level, init_for_test};

// Own test binary: the facade must not be set by any other test.
#[test]
fn log_to_console() {
    let _flush = init_for_test(Level::Debug);
    assert_eq!(log::max_level(), log::LevelFilter::Trace);

    log::error!("This is a test {}", 42);
    log::warn!("This is a test {}", 42);
    log::info!("This is a test {}", 42);
    log::debug!("This is a test {}", 42);
    log::trace!("This is a test {}", 42);

    // already registered, the first logger stays
    let _ = init_for_test(Level::Error);
    assert_eq!(log::max_level(), log::LevelFilter::Trace);
}
