//! Reserved account provisioning
//!
//! Existence is checked against the passwd/group files directly; creation
//! goes through whichever account tools the image ships.

mod db;
mod tools;

pub use db::{AccountDb, GroupEntry, PasswdEntry};
pub use tools::{find_program, BusyboxTools, ShadowTools};

use crate::error::{HandoffError, HandoffResult};
use async_trait::async_trait;
use tracing::{debug, warn};

/// A user to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub uid: u32,
    /// Primary group name
    pub group: String,
    pub shell: String,
}

/// Creates groups and users
#[async_trait]
pub trait AccountManager: Send + Sync {
    async fn create_group(&self, name: &str, gid: u32) -> HandoffResult<()>;

    async fn create_user(&self, user: &NewUser) -> HandoffResult<()>;

    /// Human-readable backend name for display
    fn backend_name(&self) -> &'static str;
}

/// Pick the account tools available on this system
pub fn detect_manager() -> HandoffResult<Box<dyn AccountManager>> {
    if ShadowTools::is_available() {
        Ok(Box::new(ShadowTools::new()))
    } else if BusyboxTools::is_available() {
        Ok(Box::new(BusyboxTools::new()))
    } else {
        Err(HandoffError::AccountToolsNotFound)
    }
}

/// Desired reserved account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSpec {
    /// Shared by the user and its group
    pub name: String,
    pub uid: u32,
    pub gid: u32,
    pub shell: String,
}

/// What provisioning did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Provisioned {
    pub group_created: bool,
    pub user_created: bool,
}

/// Create the group, then the user, each only if missing
///
/// Existing accounts are left untouched even when their IDs differ.
pub async fn provision(
    db: &AccountDb,
    manager: &dyn AccountManager,
    spec: &AccountSpec,
) -> HandoffResult<Provisioned> {
    let mut result = Provisioned::default();

    match db.group(&spec.name).await? {
        Some(group) => {
            debug!("Group {} exists ({})", group.name, group.gid);
            if group.gid != spec.gid {
                warn!(
                    "Group {} has GID {}, not {}; leaving it unchanged",
                    group.name, group.gid, spec.gid
                );
            }
        }
        None => {
            manager.create_group(&spec.name, spec.gid).await?;
            result.group_created = true;
        }
    }

    match db.user(&spec.name).await? {
        Some(user) => {
            debug!("User {} exists ({})", user.name, user.uid);
            if user.uid != spec.uid {
                warn!(
                    "User {} has UID {}, not {}; leaving it unchanged",
                    user.name, user.uid, spec.uid
                );
            }
        }
        None => {
            let user = NewUser {
                name: spec.name.clone(),
                uid: spec.uid,
                group: spec.name.clone(),
                shell: spec.shell.clone(),
            };
            manager.create_user(&user).await?;
            result.user_created = true;
        }
    }

    Ok(result)
}

#[cfg(test)]
pub(crate) mod testing {
    //! File-backed account manager for tests

    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Appends rows to passwd/group the way the real tools would
    pub struct FileAccounts {
        pub etc_dir: PathBuf,
        pub calls: Mutex<Vec<String>>,
    }

    impl FileAccounts {
        pub fn new(etc_dir: impl Into<PathBuf>) -> Self {
            Self {
                etc_dir: etc_dir.into(),
                calls: Mutex::new(vec![]),
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn append(&self, file: &str, line: &str) {
            let mut f = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.etc_dir.join(file))
                .unwrap();
            writeln!(f, "{line}").unwrap();
        }
    }

    #[async_trait]
    impl AccountManager for FileAccounts {
        async fn create_group(&self, name: &str, gid: u32) -> HandoffResult<()> {
            self.calls.lock().unwrap().push(format!("group {name} {gid}"));
            self.append("group", &format!("{name}:x:{gid}:"));
            Ok(())
        }

        async fn create_user(&self, user: &NewUser) -> HandoffResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("user {} {}", user.name, user.uid));
            let group = AccountDb::new(&self.etc_dir)
                .group(&user.group)
                .await?
                .ok_or_else(|| HandoffError::tool_failed("useradd", 6, "group does not exist"))?;
            self.append(
                "passwd",
                &format!(
                    "{}:x:{}:{}::/home/{}:{}",
                    user.name, user.uid, group.gid, user.name, user.shell
                ),
            );
            Ok(())
        }

        fn backend_name(&self) -> &'static str {
            "file"
        }
    }
}
