//! Handing the process over to the target command
//!
//! `exec` replaces the process image so the target inherits the PID and
//! receives signals directly. `supervise` keeps a thin parent that forwards
//! signals and exits with the child's status.

use crate::accounts::PasswdEntry;
use crate::error::{HandoffError, HandoffResult};
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::ExitStatus;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, warn};

/// Command to run and the account to run it as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub program: String,
    pub args: Vec<String>,
    pub user: String,
    pub uid: u32,
    pub gid: u32,
    pub home: PathBuf,
}

impl Target {
    /// Build from the command line; the first element is the program
    pub fn new(command: &[String], account: &PasswdEntry) -> HandoffResult<Self> {
        let (program, args) = command.split_first().ok_or(HandoffError::NoCommand)?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            user: account.name.clone(),
            uid: account.uid,
            gid: account.gid,
            home: account.home.clone(),
        })
    }

    fn env(&self) -> [(&'static str, std::ffi::OsString); 3] {
        [
            ("HOME", self.home.clone().into_os_string()),
            ("USER", self.user.clone().into()),
            ("LOGNAME", self.user.clone().into()),
        ]
    }

    /// Shell-like rendering for logs
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Replace the current process with the target. Only returns on failure.
///
/// When running as root, supplementary groups are cleared before `setuid`.
pub fn exec(target: &Target) -> HandoffError {
    use std::os::unix::process::CommandExt;

    debug!("Exec {} as {}:{}", target.display(), target.uid, target.gid);

    let error = std::process::Command::new(&target.program)
        .args(&target.args)
        .envs(target.env())
        .gid(target.gid)
        .uid(target.uid)
        .exec();

    HandoffError::Exec {
        command: target.program.clone(),
        source: error,
    }
}

/// Signals relayed to the child in supervise mode
const FORWARDED: [libc::c_int; 6] = [
    libc::SIGTERM,
    libc::SIGINT,
    libc::SIGHUP,
    libc::SIGQUIT,
    libc::SIGUSR1,
    libc::SIGUSR2,
];

/// Spawn the target, relay signals to it and return its exit status
pub async fn supervise(target: &Target) -> HandoffResult<i32> {
    let mut child = tokio::process::Command::new(&target.program)
        .args(&target.args)
        .envs(target.env())
        .gid(target.gid)
        .uid(target.uid)
        .spawn()
        .map_err(|e| HandoffError::Exec {
            command: target.program.clone(),
            source: e,
        })?;

    let pid = child.id();
    debug!("Supervising {} (pid {:?})", target.display(), pid);

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    for signo in FORWARDED {
        let mut stream = signal(SignalKind::from_raw(signo))
            .map_err(|e| HandoffError::io(format!("installing handler for signal {signo}"), e))?;
        let tx = tx.clone();
        tokio::spawn(async move {
            while stream.recv().await.is_some() {
                if tx.send(signo).is_err() {
                    break;
                }
            }
        });
    }
    drop(tx);

    loop {
        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(|e| HandoffError::io("waiting for child", e))?;
                return Ok(exit_code(status));
            }
            Some(signo) = rx.recv() => {
                if let Some(pid) = pid {
                    debug!("Forwarding signal {} to {}", signo, pid);
                    // SAFETY: kill has no memory-safety preconditions
                    if unsafe { libc::kill(pid as libc::pid_t, signo) } != 0 {
                        warn!(
                            "Failed to forward signal {}: {}",
                            signo,
                            std::io::Error::last_os_error()
                        );
                    }
                }
            }
        }
    }
}

/// Shell convention: the exit code, or 128 + signal number
pub fn exit_code(status: ExitStatus) -> i32 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signo)) => 128 + signo,
        (None, None) => 1,
    }
}
