use std::fs;

use assert_cmd::Command;

fn bookstore(config_dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("bookstore").unwrap();
    cmd.env("BOOKSTORE_ENV", "local")
        .env("BOOKSTORE_CONFIG_DIR", config_dir)
        .env_remove("DB_HOST")
        .env_remove("DB_PORT")
        .env_remove("DB_USER")
        .env_remove("DB_NAME");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let output = Command::cargo_bin("bookstore")
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for subcommand in ["serve", "migrate", "config"] {
        assert!(stdout.contains(subcommand), "missing {subcommand}");
    }
}

#[test]
fn config_layers_files_and_db_variables_and_redacts_password() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("base.toml"), "[server]\nport = 9090\n").unwrap();

    let output = bookstore(dir.path())
        .env("DB_HOST", "db.internal")
        .env("DB_PASSWORD", "hunter2")
        .arg("config")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let settings: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(settings["environment"], "local");
    assert_eq!(settings["server"]["port"], 9090);
    assert_eq!(settings["database"]["host"], "db.internal");
    assert_eq!(settings["database"]["port"], 5432);
    assert_eq!(settings["database"]["name"], "bookstore");
    assert!(!stdout.contains("hunter2"));
}

#[test]
fn unknown_environment_fails() {
    let dir = tempfile::tempdir().unwrap();

    let output = bookstore(dir.path())
        .env("BOOKSTORE_ENV", "qa")
        .arg("config")
        .output()
        .unwrap();

    assert!(!output.status.success());
}
