//! Location flow legs
//!
//! The handler only issues the fix leg after the permission leg has reported
//! back, so the two never overlap.

use std::time::Duration;

use lmap_core::prelude::*;

use super::ActionContext;
use crate::location::{fix_with_timeout, request_grant, LocationProvider};
use crate::message::Message;

pub(super) fn spawn_permission_request<P, L>(ctx: ActionContext<P, L>)
where
    P: Send + Sync + 'static,
    L: LocationProvider + Sync + 'static,
{
    tokio::spawn(async move {
        let message = match request_grant(ctx.location.as_ref()).await {
            Ok(()) => Message::LocationPermission { granted: true },
            Err(Error::LocationPermissionDenied) => {
                debug!("Location permission denied");
                Message::LocationPermission { granted: false }
            }
            Err(e) => failed(e),
        };
        let _ = ctx.msg_tx.send(message).await;
    });
}

pub(super) fn spawn_fix<P, L>(ctx: ActionContext<P, L>, timeout: Duration)
where
    P: Send + Sync + 'static,
    L: LocationProvider + Sync + 'static,
{
    tokio::spawn(async move {
        let message = match fix_with_timeout(ctx.location.as_ref(), timeout).await {
            Ok(location) => Message::LocationFixed { location },
            Err(e) => failed(e),
        };
        let _ = ctx.msg_tx.send(message).await;
    });
}

/// Location failures end the flow quietly; anything else is worth a warning
fn failed(e: Error) -> Message {
    if e.is_location_failure() {
        debug!("No location: {}", e);
    } else {
        warn!("Location flow failed: {}", e);
    }
    Message::LocationFailed {
        reason: e.to_string(),
    }
}
