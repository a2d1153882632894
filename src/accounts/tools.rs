//! Account creation through the system's account tools
//!
//! Two tool families are supported:
//! - shadow-utils: `groupadd` / `useradd` (Debian, Fedora, Ubuntu)
//! - busybox: `addgroup` / `adduser` (Alpine)

use crate::accounts::{AccountManager, NewUser};
use crate::error::{HandoffError, HandoffResult};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Find an executable on `PATH`
pub fn find_program(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &std::path::Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Run an account tool, failing with its exit status
async fn run_tool(program: &str, args: &[String]) -> HandoffResult<()> {
    debug!("Executing: {} {:?}", program, args);

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| HandoffError::command_failed(format!("{} {:?}", program, args), e))?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(HandoffError::tool_failed(
            program,
            output.status.code().unwrap_or(1),
            stderr.trim(),
        ))
    }
}

/// shadow-utils backend
#[derive(Debug, Default, Clone, Copy)]
pub struct ShadowTools;

impl ShadowTools {
    pub fn new() -> Self {
        Self
    }

    pub fn is_available() -> bool {
        find_program("groupadd").is_some() && find_program("useradd").is_some()
    }

    pub fn group_args(name: &str, gid: u32) -> Vec<String> {
        vec!["-g".to_string(), gid.to_string(), name.to_string()]
    }

    /// `-M`: no home directory
    pub fn user_args(user: &NewUser) -> Vec<String> {
        vec![
            "-M".to_string(),
            "-s".to_string(),
            user.shell.clone(),
            "-g".to_string(),
            user.group.clone(),
            "-u".to_string(),
            user.uid.to_string(),
            user.name.clone(),
        ]
    }
}

#[async_trait]
impl AccountManager for ShadowTools {
    async fn create_group(&self, name: &str, gid: u32) -> HandoffResult<()> {
        run_tool("groupadd", &Self::group_args(name, gid)).await?;
        info!("Created group {} ({})", name, gid);
        Ok(())
    }

    async fn create_user(&self, user: &NewUser) -> HandoffResult<()> {
        run_tool("useradd", &Self::user_args(user)).await?;
        info!("Created user {} ({})", user.name, user.uid);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "shadow"
    }
}

/// busybox backend
#[derive(Debug, Default, Clone, Copy)]
pub struct BusyboxTools;

impl BusyboxTools {
    pub fn new() -> Self {
        Self
    }

    pub fn is_available() -> bool {
        find_program("addgroup").is_some() && find_program("adduser").is_some()
    }

    pub fn group_args(name: &str, gid: u32) -> Vec<String> {
        vec!["-g".to_string(), gid.to_string(), name.to_string()]
    }

    /// `-D`: no password, `-H`: no home directory
    pub fn user_args(user: &NewUser) -> Vec<String> {
        vec![
            "-D".to_string(),
            "-H".to_string(),
            "-s".to_string(),
            user.shell.clone(),
            "-G".to_string(),
            user.group.clone(),
            "-u".to_string(),
            user.uid.to_string(),
            user.name.clone(),
        ]
    }
}

#[async_trait]
impl AccountManager for BusyboxTools {
    async fn create_group(&self, name: &str, gid: u32) -> HandoffResult<()> {
        run_tool("addgroup", &Self::group_args(name, gid)).await?;
        info!("Created group {} ({})", name, gid);
        Ok(())
    }

    async fn create_user(&self, user: &NewUser) -> HandoffResult<()> {
        run_tool("adduser", &Self::user_args(user)).await?;
        info!("Created user {} ({})", user.name, user.uid);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "busybox"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user() -> NewUser {
        NewUser {
            name: "app".to_string(),
            uid: 1001,
            group: "app".to_string(),
            shell: "/bin/sh".to_string(),
        }
    }

    #[test]
    fn shadow_args() {
        assert_eq!(ShadowTools::group_args("app", 1002), ["-g", "1002", "app"]);
        assert_eq!(
            ShadowTools::user_args(&new_user()),
            ["-M", "-s", "/bin/sh", "-g", "app", "-u", "1001", "app"]
        );
    }

    #[test]
    fn busybox_args() {
        assert_eq!(BusyboxTools::group_args("app", 1002), ["-g", "1002", "app"]);
        assert_eq!(
            BusyboxTools::user_args(&new_user()),
            ["-D", "-H", "-s", "/bin/sh", "-G", "app", "-u", "1001", "app"]
        );
    }

    #[test]
    fn find_program_locates_sh() {
        assert!(find_program("sh").is_some());
        assert!(find_program("definitely-not-a-real-program-xyz").is_none());
    }

    #[tokio::test]
    async fn run_tool_propagates_exit_code() {
        let err = run_tool("sh", &["-c".to_string(), "echo taken >&2; exit 9".to_string()])
            .await
            .unwrap_err();
        match err {
            HandoffError::ToolFailed { code, stderr, .. } => {
                assert_eq!(code, 9);
                assert_eq!(stderr, "taken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
