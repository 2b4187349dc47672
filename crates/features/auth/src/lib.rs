//! Authentication module.
//!
//! Signing in marks the session and, when a remote store is attached, pulls the
//! user's data down. A remote failure does not undo the sign-in; it is reported
//! as a notification and local data stays as it was.

mod error;

pub use crate::error::{AuthError, AuthErrorExt};

use farm_kernel::domain::constants::AUTH;
use farm_kernel::prelude::*;
use farm_kernel::region::DEFAULT_ACTION;
use tracing::{info, warn};

const TEMPLATE: &str = r#"<section class="module auth"><h2>Sign in</h2><form id="sign-in"><input name="user" /></form></section>"#;

/// What [`sign_in`] did besides marking the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInSync {
    /// No remote store attached.
    LocalOnly,
    /// Remote records replaced the local collections.
    Pulled(usize),
    /// The pull failed; local data is unchanged.
    Failed,
}

#[must_use]
pub fn descriptor() -> ModuleDescriptor {
    ModuleDescriptor::builder(AUTH)
        .template(TEMPLATE)
        .auth(true)
        .initialize(|ctx| {
            if ctx.app().is_signed_in() {
                let user = ctx.app().current_user().unwrap_or_default();
                ctx.render(format!(
                    r#"<section class="module auth"><h2>Signed in</h2><p class="session">Signed in as <strong>{}</strong></p><button id="continue">Continue</button></section>"#,
                    escape(&user)
                ));
                ctx.region().attach("continue", DEFAULT_ACTION);
            }
            Ok(())
        })
        .build()
}

/// Signs `user` in.
///
/// When a user id is configured under `remote.user_id`, only that user may sign in.
pub async fn sign_in(app: &AppContext, user: &str, token: &CancellationToken) -> Result<SignInSync, AuthError> {
    let user = user.trim();
    if let Some(expected) = app.config().remote.user_id.as_deref()
        && expected != user
    {
        warn!(user, "Sign-in rejected for unknown user");
        return Err(AuthError::InvalidCredentials {
            message: "unknown user".into(),
            context: Some(user.to_owned().into()),
        });
    }
    app.sign_in(user).await?;

    let Some(sync) = app.remote_sync() else {
        return Ok(SignInSync::LocalOnly);
    };
    match sync.pull_all(token).await {
        Ok(pulled) => {
            info!(user, pulled, "Remote data loaded after sign-in");
            Ok(SignInSync::Pulled(pulled))
        },
        Err(error) => {
            warn!(user, %error, "Remote data could not be loaded");
            app.notify(
                NotificationLevel::Warning,
                format!("Signed in, but your synced data could not be loaded: {error}"),
                Some(AUTH),
            );
            Ok(SignInSync::Failed)
        },
    }
}

pub async fn sign_out(app: &AppContext) -> Result<(), AuthError> {
    app.sign_out().await.context("Signing out")
}
