#![allow(dead_code)]

use studypilot::db::Db;
use studypilot::email::ResendEmailSender;
use studypilot::AppState;

pub async fn create_test_db() -> Db {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let path =
        std::env::temp_dir().join(format!("studypilot_test_{}_{}.db", std::process::id(), id));
    // Clean up leftover file from previous runs
    let _ = std::fs::remove_file(&path);
    let url = format!("file:{}", path.display());
    Db::new(url, String::new())
        .await
        .expect("failed to create test database")
}

pub fn test_state(db: Db) -> AppState {
    AppState::new(
        db,
        ResendEmailSender::disabled(),
        "test-secret".to_string(),
        24,
    )
}
