//! Farm profile page.

mod error;

pub use crate::error::{ProfileError, ProfileErrorExt};

use farm_kernel::domain::constants::PROFILE;
use farm_kernel::prelude::*;
use std::fmt::Write as _;
use tracing::{info, warn};

const TEMPLATE: &str = r#"<section class="module profile"><h2>Farm Profile</h2><dl id="profile-details"></dl></section>"#;

#[must_use]
pub fn descriptor() -> ModuleDescriptor {
    ModuleDescriptor::builder(PROFILE)
        .template(TEMPLATE)
        .initialize(|ctx| {
            ctx.render(ctx.state().read(|data| render(&data.profile)));
            Ok(())
        })
        .build()
}

/// Validates and stores `profile`, replacing the previous one.
pub async fn save_profile(app: &AppContext, mut profile: FarmProfile) -> Result<FarmProfile, ProfileError> {
    profile.farm_name = profile.farm_name.trim().to_owned();
    profile.email = profile.email.trim().to_owned();
    if !profile.is_complete() {
        return Err(ProfileError::Validation { message: "farm name is required".into(), context: None });
    }
    if !profile.email.is_empty() && !is_plausible_email(&profile.email) {
        return Err(ProfileError::Validation {
            message: "email address looks invalid".into(),
            context: Some(profile.email.clone().into()),
        });
    }

    app.state().update(|data| data.profile = profile.clone());
    if app.state().persist().await == PersistOutcome::Failed {
        warn!(farm = %profile.farm_name, "Farm profile kept in memory only");
    }
    info!(farm = %profile.farm_name, "Farm profile saved");
    Ok(profile)
}

/// Uploads the current profile to the remote store for the current user.
///
/// Returns `Ok(false)` when no remote store or user is configured.
pub async fn publish_profile(app: &AppContext, token: &CancellationToken) -> Result<bool, ProfileError> {
    let (Some(remote), Some(user)) = (app.remote(), app.current_user()) else {
        return Ok(false);
    };
    let profile = app.state().read(|data| data.profile.clone());
    remote.set_profile(&user, &profile).or_cancel(token).await??;
    Ok(true)
}

fn is_plausible_email(email: &str) -> bool {
    email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    })
}

fn render(profile: &FarmProfile) -> String {
    if !profile.is_complete() {
        return String::from(
            r#"<section class="module profile"><h2>Farm Profile</h2><p class="empty">Complete your farm profile to get started.</p></section>"#,
        );
    }

    let mut out = String::from(r#"<section class="module profile"><h2>Farm Profile</h2><dl id="profile-details">"#);
    let established = profile.established.as_deref().unwrap_or_default();
    for (label, value) in [
        ("Farm", profile.farm_name.as_str()),
        ("Owner", profile.owner_name.as_str()),
        ("Location", profile.location.as_str()),
        ("Type", profile.farm_type.as_str()),
        ("Phone", profile.phone.as_str()),
        ("Email", profile.email.as_str()),
        ("Established", established),
    ] {
        if !value.is_empty() {
            let _ = write!(out, "<dt>{label}</dt><dd>{}</dd>", escape(value));
        }
    }
    out.push_str("</dl></section>");
    out
}
