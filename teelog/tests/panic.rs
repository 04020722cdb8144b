use teelog::{Field, FileLogger, Level, RotateOptions, default_formatter, tee};

#[test]
#[should_panic(expected = "Test Panic")]
fn log_panic() {
    let dir = tempfile::tempdir().unwrap();
    let a = FileLogger::new_shared(
        Level::Error,
        default_formatter,
        dir.path().join("a.log"),
        64,
        RotateOptions::default(),
    )
    .unwrap();
    let b = FileLogger::new_shared(
        Level::Debug,
        default_formatter,
        dir.path().join("b.log"),
        64,
        RotateOptions::default(),
    )
    .unwrap();
    let logger = tee(vec![a, b]).unwrap();

    logger.info("This is a panic test.", &[]);
    logger.panic("Test Panic", &[Field::int("code", 1)]);
}

#[test]
fn panic_reaches_filtered_sink() {
    let dir = tempfile::tempdir().unwrap();
    let a_path = dir.path().join("a.log");
    let b_path = dir.path().join("b.log");
    let a = FileLogger::new_shared(
        Level::Fatal,
        default_formatter,
        &a_path,
        64,
        RotateOptions::default(),
    )
    .unwrap();
    let b = FileLogger::new_shared(
        Level::Debug,
        default_formatter,
        &b_path,
        64,
        RotateOptions::default(),
    )
    .unwrap();
    let logger = tee(vec![a, b]).unwrap();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        logger.panic("boom", &[]);
    }));
    assert!(result.is_err());
    drop(logger);

    for path in [a_path, b_path] {
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("[PANIC] boom"));
    }
}
