//! Invite acceptance.

use std::convert::Infallible;

use crate::db::store::Store;
use crate::error::StoreError;
use crate::models::profile::Profile;
use crate::outcome::PageOutcome;

/// Where a profile lands after visiting `/invite/{invite_code}`.
///
/// Unauthenticated visitors and empty codes never reach the store. A profile that is
/// already a member goes straight to the server without any write; otherwise it joins as a
/// guest, at most once even under concurrent visits. An unknown code is
/// [`StoreError::NotFound`].
pub async fn accept_invite(
    store: &dyn Store,
    profile: Option<&Profile>,
    invite_code: &str,
) -> Result<PageOutcome<Infallible>, StoreError> {
    let Some(profile) = profile else {
        return Ok(PageOutcome::SignInRequired {
            return_to: format!("/invite/{invite_code}"),
        });
    };

    if invite_code.is_empty() {
        return Ok(PageOutcome::redirect("/"));
    }

    if let Some(server) = store.find_server_with_member(invite_code, &profile.id).await? {
        tracing::debug!(server_id = %server.id, profile_id = %profile.id, "already a member");
        return Ok(PageOutcome::redirect(server_path(&server.id)));
    }

    let joined = store.join_by_invite_code(invite_code, &profile.id).await?;
    if joined.created {
        tracing::info!(server_id = %joined.server.id, profile_id = %profile.id, "joined server");
    }

    Ok(PageOutcome::redirect(server_path(&joined.server.id)))
}

pub fn server_path(server_id: &str) -> String {
    format!("/servers/{server_id}")
}
