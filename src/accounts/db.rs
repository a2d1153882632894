//! Read-only access to the passwd and group databases

use crate::error::{HandoffError, HandoffResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// A row of `passwd`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswdEntry {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
    pub home: PathBuf,
    pub shell: String,
}

/// A row of `group`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    pub name: String,
    pub gid: u32,
    pub members: Vec<String>,
}

impl PasswdEntry {
    /// Parse `name:pw:uid:gid:gecos:home:shell`
    pub fn parse(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split(':').collect();
        if fields.len() != 7 {
            return None;
        }
        Some(Self {
            name: fields[0].to_string(),
            uid: fields[2].parse().ok()?,
            gid: fields[3].parse().ok()?,
            home: PathBuf::from(fields[5]),
            shell: fields[6].to_string(),
        })
    }
}

impl GroupEntry {
    /// Parse `name:pw:gid:member,member`
    pub fn parse(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split(':').collect();
        if fields.len() != 4 {
            return None;
        }
        Some(Self {
            name: fields[0].to_string(),
            gid: fields[2].parse().ok()?,
            members: fields[3]
                .split(',')
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }
}

/// The account databases under an `etc` directory
#[derive(Debug, Clone)]
pub struct AccountDb {
    etc_dir: PathBuf,
}

impl AccountDb {
    pub fn new(etc_dir: impl Into<PathBuf>) -> Self {
        Self {
            etc_dir: etc_dir.into(),
        }
    }

    pub fn passwd_path(&self) -> PathBuf {
        self.etc_dir.join("passwd")
    }

    pub fn group_path(&self) -> PathBuf {
        self.etc_dir.join("group")
    }

    /// Look up a user by name
    pub async fn user(&self, name: &str) -> HandoffResult<Option<PasswdEntry>> {
        let path = self.passwd_path();
        match find_line(&path, name).await? {
            Some(line) => PasswdEntry::parse(&line)
                .map(Some)
                .ok_or_else(|| HandoffError::AccountEntry {
                    file: path.display().to_string(),
                    line,
                }),
            None => Ok(None),
        }
    }

    /// Look up a group by name
    pub async fn group(&self, name: &str) -> HandoffResult<Option<GroupEntry>> {
        let path = self.group_path();
        match find_line(&path, name).await? {
            Some(line) => GroupEntry::parse(&line)
                .map(Some)
                .ok_or_else(|| HandoffError::AccountEntry {
                    file: path.display().to_string(),
                    line,
                }),
            None => Ok(None),
        }
    }
}

/// First line whose name field equals `name`. A missing file has no lines.
async fn find_line(path: &Path, name: &str) -> HandoffResult<Option<String>> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{} not found, treating as empty", path.display());
            return Ok(None);
        }
        Err(e) => return Err(HandoffError::io(format!("reading {}", path.display()), e)),
    };

    Ok(content
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .find(|l| l.split(':').next() == Some(name))
        .map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn etc_with(passwd: &str, group: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("passwd"), passwd).unwrap();
        std::fs::write(temp.path().join("group"), group).unwrap();
        temp
    }

    #[test]
    fn parse_passwd_entry() {
        let entry = PasswdEntry::parse("app:x:1000:1000::/home/app:/bin/sh").unwrap();
        assert_eq!(entry.name, "app");
        assert_eq!(entry.uid, 1000);
        assert_eq!(entry.gid, 1000);
        assert_eq!(entry.home, PathBuf::from("/home/app"));
        assert_eq!(entry.shell, "/bin/sh");
    }

    #[test]
    fn parse_group_entry() {
        let entry = GroupEntry::parse("app:x:1000:alice,bob").unwrap();
        assert_eq!(entry.gid, 1000);
        assert_eq!(entry.members, vec!["alice", "bob"]);

        let empty = GroupEntry::parse("app:x:1000:").unwrap();
        assert!(empty.members.is_empty());
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(PasswdEntry::parse("app:x:notanumber:1000::/:/bin/sh").is_none());
        assert!(GroupEntry::parse("app:x").is_none());
    }

    #[tokio::test]
    async fn lookup_by_exact_name() {
        let etc = etc_with(
            "root:x:0:0:root:/root:/bin/bash\napplication:x:1001:1001::/:/bin/sh\napp:x:911:911::/config:/bin/false\n",
            "# comment\nroot:x:0:\napp:x:911:\n",
        );
        let db = AccountDb::new(etc.path());

        let user = db.user("app").await.unwrap().unwrap();
        assert_eq!(user.uid, 911);
        assert_eq!(user.home, PathBuf::from("/config"));

        let group = db.group("app").await.unwrap().unwrap();
        assert_eq!(group.gid, 911);

        assert!(db.user("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_files_mean_no_accounts() {
        let temp = TempDir::new().unwrap();
        let db = AccountDb::new(temp.path());
        assert!(db.user("app").await.unwrap().is_none());
        assert!(db.group("app").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_matching_line_is_an_error() {
        let etc = etc_with("app:x:abc:1000::/:/bin/sh\n", "");
        let db = AccountDb::new(etc.path());
        assert!(matches!(
            db.user("app").await,
            Err(HandoffError::AccountEntry { .. })
        ));
    }
}
