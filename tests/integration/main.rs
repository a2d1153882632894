//! Integration tests for Handoff

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn handoff() -> Command {
        let mut cmd = cargo_bin_cmd!("handoff");
        cmd.env_remove("PUID")
            .env_remove("PGID")
            .env_remove("HANDOFF_CONFIG");
        cmd
    }

    /// Config whose paths all live under `root`
    fn write_config(root: &Path) -> std::path::PathBuf {
        let etc = root.join("etc");
        let app = root.join("app");
        std::fs::create_dir_all(&etc).unwrap();
        std::fs::create_dir_all(&app).unwrap();

        let path = root.join("config.toml");
        std::fs::write(
            &path,
            format!(
                r#"
[account]
etc_dir = "{}"

[paths]
app_dir = "{}"
config_dir = "{}"

[process]
product_name = "TestApp"

[cache]
root = "{}"
"#,
                etc.display(),
                app.display(),
                root.join("config").display(),
                root.join("caches").display(),
            ),
        )
        .unwrap();
        path
    }

    #[test]
    fn help_displays() {
        handoff()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("container entry point"));
    }

    #[test]
    fn version_displays() {
        handoff()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("handoff"));
    }

    #[test]
    fn config_path_uses_flag() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path());

        handoff()
            .arg("--config")
            .arg(&config)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path());

        handoff()
            .arg("--config")
            .arg(&config)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[account]"))
            .stdout(predicate::str::contains("TestApp"));
    }

    #[test]
    fn config_set_persists() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("fresh.toml");

        handoff()
            .arg("--config")
            .arg(&config)
            .args(["config", "set", "account.name", "abc"])
            .assert()
            .success();

        let saved = std::fs::read_to_string(&config).unwrap();
        assert!(saved.contains("name = \"abc\""));
    }

    #[test]
    fn cache_reset_deletes_every_bucket() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("caches");
        for bucket in ["static-v1", "static-v2", "runtime"] {
            std::fs::create_dir_all(root.join(bucket).join("entries")).unwrap();
            std::fs::write(root.join(bucket).join("entries").join("0"), "body").unwrap();
        }

        handoff()
            .args(["cache", "reset", "--root"])
            .arg(&root)
            .assert()
            .success()
            .stdout(predicate::str::contains("Deleted 3 cache bucket(s)"));

        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn cache_reset_missing_root_succeeds() {
        let temp = TempDir::new().unwrap();

        handoff()
            .args(["cache", "reset", "--root"])
            .arg(temp.path().join("absent"))
            .assert()
            .success()
            .stdout(predicate::str::contains("Deleted 0 cache bucket(s)"));
    }

    #[test]
    fn cache_list_plain() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path());
        std::fs::create_dir_all(temp.path().join("caches").join("api-v2")).unwrap();

        handoff()
            .arg("--config")
            .arg(&config)
            .args(["cache", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::diff("api-v2\n"));
    }

    #[test]
    fn entrypoint_rejects_invalid_puid() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path());

        handoff()
            .arg("--config")
            .arg(&config)
            .env("PUID", "not-a-number")
            .args(["entrypoint", "--", "true"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Invalid numeric ID in PUID"));
    }

    #[test]
    fn entrypoint_requires_command() {
        handoff()
            .args(["entrypoint"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("No command given"));
    }

    #[test]
    fn entrypoint_dry_run_prints_startup_line() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path());

        handoff()
            .arg("--config")
            .arg(&config)
            .env("PUID", "1234")
            .args(["entrypoint", "--dry-run", "--", "sleep", "1"])
            .assert()
            .success()
            .stdout(predicate::str::is_match(
                r"(?m)^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} \[INFO\] Starting TestApp with UID=1234 GID=1000$",
            )
            .unwrap())
            .stdout(predicate::str::contains("Dry run, nothing changed"))
            .stdout(predicate::str::contains("run as app: sleep 1"));

        assert!(!temp.path().join("etc").join("passwd").exists());
    }
}
