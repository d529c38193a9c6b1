#![allow(dead_code)]

pub mod fixtures {
    use std::path::{Path, PathBuf};

    /// Path of a file under `tests/fixtures`
    pub fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }

    pub fn read_fixture(name: &str) -> String {
        std::fs::read_to_string(fixture_path(name)).unwrap()
    }

    /// Copy a fixture into `dir` so a test can rewrite it
    pub fn copy_fixture(name: &str, dir: &Path) -> PathBuf {
        let target = dir.join(name);
        std::fs::copy(fixture_path(name), &target).unwrap();
        target
    }
}

pub mod temp_files {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::{SystemTime, UNIX_EPOCH};

    // Global counter and lock for thread-safe temporary file creation
    static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);
    static TEMP_LOCK: Mutex<()> = Mutex::new(());

    /// Creates a temporary directory with a name unique across parallel tests
    pub fn create_temp_dir(label: &str) -> PathBuf {
        let _lock = TEMP_LOCK.lock().unwrap();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::SeqCst);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();

        let path = std::env::temp_dir().join(format!(
            "protoroute_{}_{}_{}_{}",
            label,
            std::process::id(),
            counter,
            nanos
        ));
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    /// Cleanup temporary directories (best effort)
    pub fn cleanup_temp_dirs(paths: &[PathBuf]) {
        for path in paths {
            let _ = std::fs::remove_dir_all(path);
        }
    }
}
