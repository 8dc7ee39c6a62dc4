//! Place service requests
//!
//! Responses go back tagged with the request's sequence number; the handler
//! decides whether they are still current.

use lmap_core::prelude::*;
use lmap_core::AutocompleteSuggestion;
use lmap_places::{LocationBias, PlaceService};

use super::ActionContext;
use crate::message::Message;

pub(super) fn spawn_text_search<P, L>(
    ctx: ActionContext<P, L>,
    seq: u64,
    query: String,
    bias: Option<LocationBias>,
) where
    P: PlaceService + Sync + 'static,
    L: Send + Sync + 'static,
{
    tokio::spawn(async move {
        let result = ctx
            .places
            .text_search(&query, bias)
            .await
            .map_err(user_message);
        let _ = ctx
            .msg_tx
            .send(Message::SearchCompleted { seq, result })
            .await;
    });
}

pub(super) fn spawn_autocomplete<P, L>(
    ctx: ActionContext<P, L>,
    seq: u64,
    input: String,
    bias: Option<LocationBias>,
) where
    P: PlaceService + Sync + 'static,
    L: Send + Sync + 'static,
{
    tokio::spawn(async move {
        let result = ctx
            .places
            .autocomplete(&input, bias)
            .await
            .map_err(user_message);
        let _ = ctx
            .msg_tx
            .send(Message::AutocompleteCompleted { seq, result })
            .await;
    });
}

pub(super) fn spawn_resolve<P, L>(
    ctx: ActionContext<P, L>,
    seq: u64,
    suggestion: AutocompleteSuggestion,
) where
    P: PlaceService + Sync + 'static,
    L: Send + Sync + 'static,
{
    tokio::spawn(async move {
        let result = ctx
            .places
            .resolve(&suggestion)
            .await
            .map_err(user_message);
        let _ = ctx
            .msg_tx
            .send(Message::SuggestionResolved { seq, result })
            .await;
    });
}

/// Text shown to the user for a failed request
fn user_message(e: Error) -> String {
    match e {
        Error::Places { message } => message,
        other => other.to_string(),
    }
}
