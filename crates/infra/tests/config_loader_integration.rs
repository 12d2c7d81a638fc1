//! Configuration file to running context.

use std::io::Write;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use jobsync_common::SecretCipher;
use jobsync_infra::{AppContext, ConfigLoader};
use tempfile::TempDir;

#[test]
fn toml_file_configures_a_working_context() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("jobsync.db");
    let key = BASE64.encode(SecretCipher::generate_key());

    let config_path = dir.path().join("jobsync.toml");
    let mut file = std::fs::File::create(&config_path).unwrap();
    write!(
        file,
        r#"
[database]
path = "{}"
pool_size = 2

[encryption]
key = "{key}"

[remote]
request_timeout_secs = 3

[logging]
level = "debug"
"#,
        db_path.display()
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_path).unwrap();
    assert_eq!(config.remote.request_timeout_secs, 3);
    assert_eq!(config.logging.level, "debug");

    let ctx = AppContext::new(config).expect("context should build");
    ctx.db.health_check().unwrap();
    assert!(db_path.exists());
}
