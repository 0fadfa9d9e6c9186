//! Loading lobby configuration from disk.

use matchbox_lobby::{Lobby, LobbyConfig, Matchmaking};
use matchbox_rules::Variant;
use std::io::Write;

#[test]
fn test_config_file_drives_lobby() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "queue_timeout_secs = 30").expect("write");
    writeln!(file, "erase_window = 4").expect("write");

    let config = LobbyConfig::from_file(file.path()).expect("valid config");
    assert_eq!(*config.queue_timeout_secs(), 30);
    assert_eq!(*config.match_idle_timeout_secs(), 150);
    assert_eq!(*config.erase_window(), 4);

    let lobby = Lobby::new(config);
    let ack = lobby
        .enqueue_or_match(Variant::Erase, "p1")
        .expect("enqueue");
    assert!(matches!(ack, Matchmaking::Waiting(ref ack) if ack.timeout_secs == 30));

    let game = lobby
        .create_match(Variant::Erase, ["a".to_string(), "b".to_string()])
        .expect("match");
    assert_eq!(game.history().expect("erase history").base(), 4);
}

#[test]
fn test_missing_config_file_reports_location() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = LobbyConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(err.message.starts_with("Failed to read config file"));
    assert!(err.file.ends_with("config.rs"));
}
