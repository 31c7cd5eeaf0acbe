//! Standard bootstrap tests

use amx_bytecode::{AmxFlags, ImageBuilder};
use amx_engine::{Amx, InitPolicy, Stage};
use amx_runtime::{amx_init, initialize_with_standard_libraries, RuntimeOptions};
use amx_sdk::{AmxError, Cell};
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Log sink shared with a test subscriber
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

/// Run `f` with debug logging captured
fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, buffer.contents())
}

fn mixed_program() -> Vec<u8> {
    ImageBuilder::new()
        .native("max")
        .native("fmul")
        .public("main", 0)
        .build()
}

#[test]
fn test_minimal_program() {
    let mut amx = Amx::new();
    assert_eq!(amx_init(&mut amx, &ImageBuilder::new().build()), Ok(()));
    assert!(amx.is_initialized());
    assert!(amx.flags().contains(AmxFlags::NTVREG));
}

#[test]
fn test_core_failure_is_not_reported() {
    // core cannot bind fmul, so its registration returns FunctionNotFound
    let program = mixed_program();
    let mut amx = Amx::new();
    assert_eq!(amx_init(&mut amx, &program), Ok(()));

    // both libraries still got installed
    assert!(amx.unbound_natives().is_empty());
    assert_eq!(
        amx.call_native_by_name("max", &[Cell::new(3), Cell::new(9)]),
        Ok(Cell::new(9))
    );
    assert_eq!(
        amx.call_native_by_name("fmul", &[Cell::new(1500), Cell::new(4000)]),
        Ok(Cell::new(6000))
    );
}

#[test]
fn test_report_shows_library_statuses() {
    let mut amx = Amx::new();
    let report = initialize_with_standard_libraries(&mut amx, &mixed_program());

    let outcomes: Vec<(String, i32)> = report
        .outcomes()
        .iter()
        .map(|o| (o.stage.to_string(), o.code()))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            ("machine".to_string(), 0),
            ("library core".to_string(), AmxError::FunctionNotFound.code()),
            ("library fixed".to_string(), 0),
        ]
    );
    assert!(report.all_natives_bound());
}

#[test]
fn test_malformed_program() {
    let mut amx = Amx::new();
    assert_eq!(amx_init(&mut amx, b"definitely not an amx file"), Err(AmxError::InvalidFormat));

    let report = initialize_with_standard_libraries(&mut Amx::new(), &[]);
    assert_eq!(report.outcomes().len(), 1);
    assert_eq!(report.outcomes()[0].stage, Stage::Machine);
}

#[test]
fn test_unknown_native_passes_legacy_entry_point() {
    let program = ImageBuilder::new().native("printf").build();
    let mut amx = Amx::new();
    assert_eq!(amx_init(&mut amx, &program), Ok(()));
    assert_eq!(amx.unbound_natives(), vec!["printf"]);
}

#[test]
fn test_second_init_fails() {
    let program = ImageBuilder::new().build();
    let mut amx = Amx::new();
    amx_init(&mut amx, &program).unwrap();
    assert_eq!(amx_init(&mut amx, &program), Err(AmxError::InitFailure));
}

#[test]
fn test_options_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "policy = \"require-all-natives-bound\"").unwrap();
    writeln!(file, "libraries = [\"core\"]").unwrap();

    let options = RuntimeOptions::from_file(file.path()).unwrap();
    let initializer = options.build_initializer().unwrap();
    assert_eq!(initializer.policy(), InitPolicy::RequireAllNativesBound);

    // without the fixed library fmul stays unbound
    let mut amx = Amx::new();
    assert_eq!(
        initializer.initialize(&mut amx, &mixed_program()),
        Err(AmxError::FunctionNotFound)
    );
}

#[test]
fn test_missing_options_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(RuntimeOptions::from_file(&dir.path().join("amx.toml")).is_err());
}

#[test]
fn test_options_loading_is_logged() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "libraries = [\"fixed\"]").unwrap();

    let (initializer, logs) = capture_logs(|| {
        RuntimeOptions::from_file(file.path())
            .and_then(|options| options.build_initializer())
            .unwrap()
    });
    assert_eq!(initializer.library_names(), vec!["fixed"]);
    assert!(logs.contains("loading runtime options"));
    assert!(logs.contains("initializer configured"));
    assert!(logs.contains("IgnoreLibraryFailures"));
}
