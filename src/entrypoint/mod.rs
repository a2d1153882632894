//! Container entry point
//!
//! Runs once at container start, as root, before the workload:
//!
//! 1. Resolve UID/GID from `PUID`/`PGID`
//! 2. Create the reserved group if missing
//! 3. Create the reserved user if missing
//! 4. Chown the application directory
//! 5. Chown the configuration directory, if present
//! 6. Set the umask
//! 7. Print the startup line
//! 8. Hand the process over to the command, as the reserved user
//!
//! Every step is fatal on failure; nothing is retried.

pub mod banner;
pub mod handoff;
pub mod identity;
pub mod ownership;
pub mod umask;

pub use handoff::Target;
pub use identity::Identity;

use crate::accounts::{provision, AccountDb, AccountManager, AccountSpec, PasswdEntry, Provisioned};
use crate::config::{Config, HandoffMode};
use crate::error::{HandoffError, HandoffResult};
use std::io::Write;
use tracing::{debug, info};

/// Result of the setup steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    pub identity: Identity,
    /// In a dry run: what would be created
    pub provisioned: Provisioned,
    /// Entries re-owned under the application directory (None in a dry run)
    pub app_entries: Option<usize>,
    /// Entries re-owned under the configuration directory, if it exists
    pub config_entries: Option<usize>,
    pub config_present: bool,
    pub umask: u32,
    /// The account the command will run as (may be None in a dry run)
    pub account: Option<PasswdEntry>,
}

/// Entry-point runner
pub struct Entrypoint<'a> {
    config: &'a Config,
    db: AccountDb,
    manager: Box<dyn AccountManager>,
    dry_run: bool,
}

impl<'a> Entrypoint<'a> {
    pub fn new(config: &'a Config, manager: Box<dyn AccountManager>) -> Self {
        Self {
            config,
            db: AccountDb::new(&config.account.etc_dir),
            manager,
            dry_run: false,
        }
    }

    /// Check and report without changing anything
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn spec(&self, identity: Identity) -> AccountSpec {
        AccountSpec {
            name: self.config.account.name.clone(),
            uid: identity.uid,
            gid: identity.gid,
            shell: self.config.account.shell.clone(),
        }
    }

    /// Steps 2 to 6
    pub async fn prepare(&self, identity: Identity) -> HandoffResult<Prepared> {
        let mask = umask::parse_umask(&self.config.process.umask)?;
        let spec = self.spec(identity);
        let paths = &self.config.paths;
        let config_present = paths.config_dir.exists();

        if self.dry_run {
            let provisioned = Provisioned {
                group_created: self.db.group(&spec.name).await?.is_none(),
                user_created: self.db.user(&spec.name).await?.is_none(),
            };
            return Ok(Prepared {
                identity,
                provisioned,
                app_entries: None,
                config_entries: None,
                config_present,
                umask: mask,
                account: self.db.user(&spec.name).await?,
            });
        }

        debug!(
            "Provisioning {} with {} tools",
            spec.name,
            self.manager.backend_name()
        );
        let provisioned = provision(&self.db, self.manager.as_ref(), &spec).await?;

        let app_entries = ownership::chown_recursive(&paths.app_dir, identity)?;
        let config_entries = ownership::chown_if_present(&paths.config_dir, identity)?;
        info!(
            "Ownership set to {} on {}{}",
            identity,
            paths.app_dir.display(),
            if config_entries.is_some() {
                format!(" and {}", paths.config_dir.display())
            } else {
                String::new()
            }
        );

        umask::set_umask(mask);

        let account = self
            .db
            .user(&spec.name)
            .await?
            .ok_or_else(|| HandoffError::AccountNotFound(spec.name.clone()))?;

        Ok(Prepared {
            identity,
            provisioned,
            app_entries: Some(app_entries),
            config_entries,
            config_present,
            umask: mask,
            account: Some(account),
        })
    }

    /// All steps. In exec mode this only returns on failure; otherwise it
    /// returns the exit status the process should end with.
    pub async fn run(&self, identity: Identity, command: &[String]) -> HandoffResult<i32> {
        if command.is_empty() {
            return Err(HandoffError::NoCommand);
        }

        let prepared = self.prepare(identity).await?;

        let mut stdout = std::io::stdout();
        writeln!(
            stdout,
            "{}",
            banner::startup_line_now(&self.config.process.product_name, identity)
        )
        .and_then(|()| stdout.flush())
        .map_err(|e| HandoffError::io("writing startup line", e))?;

        if self.dry_run {
            print_plan(self.config, &prepared, command);
            return Ok(0);
        }

        let account = prepared
            .account
            .ok_or_else(|| HandoffError::AccountNotFound(self.config.account.name.clone()))?;
        let target = Target::new(command, &account)?;

        match self.config.process.mode {
            HandoffMode::Exec => Err(handoff::exec(&target)),
            HandoffMode::Supervise => handoff::supervise(&target).await,
        }
    }
}

fn print_plan(config: &Config, prepared: &Prepared, command: &[String]) {
    let name = &config.account.name;
    let verb = |create: bool| if create { "create" } else { "keep existing" };

    println!("Dry run, nothing changed:");
    println!(
        "  group {}: {} (GID {})",
        name,
        verb(prepared.provisioned.group_created),
        prepared.identity.gid
    );
    println!(
        "  user {}: {} (UID {})",
        name,
        verb(prepared.provisioned.user_created),
        prepared.identity.uid
    );
    println!(
        "  chown -R {} {}",
        prepared.identity,
        config.paths.app_dir.display()
    );
    if prepared.config_present {
        println!(
            "  chown -R {} {}",
            prepared.identity,
            config.paths.config_dir.display()
        );
    }
    println!("  umask {:04o}", prepared.umask);
    println!("  run as {}: {}", name, command.join(" "));
}
