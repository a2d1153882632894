//! Entrypoint command - provision the account and hand off

use crate::accounts::{detect_manager, AccountManager, ShadowTools};
use crate::cli::args::EntrypointArgs;
use crate::config::Config;
use crate::entrypoint::{Entrypoint, Identity};
use crate::error::{HandoffError, HandoffResult};
use tracing::debug;

/// Execute the entrypoint command, returning the exit status
pub async fn execute(args: EntrypointArgs, config: &Config) -> HandoffResult<i32> {
    if args.command.is_empty() {
        return Err(HandoffError::NoCommand);
    }

    let identity = Identity::from_env(config.account.default_uid, config.account.default_gid)?;
    debug!("Resolved identity {}", identity);

    // A dry run only reads; it should work even without account tools
    let manager: Box<dyn AccountManager> = match detect_manager() {
        Ok(manager) => manager,
        Err(e) if args.dry_run => {
            debug!("{}; dry run continues", e);
            Box::new(ShadowTools::new())
        }
        Err(e) => return Err(e),
    };

    Entrypoint::new(config, manager)
        .dry_run(args.dry_run)
        .run(identity, &args.command)
        .await
}
