//! Action handlers: UpdateAction dispatch and background task spawning
//!
//! Every action runs on its own task and reports back through the message
//! channel. Store writes are the exception: they queue on a single writer
//! task so they land in order. Nothing here touches `AppState`.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use lmap_bridge::CommandSender;
use lmap_core::prelude::*;

use crate::handler::{PreferenceUpdate, UpdateAction};
use crate::location::LocationProvider;
use crate::message::Message;
use crate::store::PreferenceStore;
use lmap_places::PlaceService;

mod location;
mod persist;
mod search;

use persist::StoreWriter;

/// Handles shared by every spawned action
pub struct ActionContext<P, L> {
    pub msg_tx: mpsc::Sender<Message>,
    pub commands: CommandSender,
    pub places: Arc<P>,
    pub location: Arc<L>,
    pub prefs: PreferenceStore,
    store: StoreWriter,
    /// The single pending debounce timer
    debounce: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl<P, L> Clone for ActionContext<P, L> {
    fn clone(&self) -> Self {
        Self {
            msg_tx: self.msg_tx.clone(),
            commands: self.commands.clone(),
            places: Arc::clone(&self.places),
            location: Arc::clone(&self.location),
            prefs: self.prefs.clone(),
            store: self.store.clone(),
            debounce: Arc::clone(&self.debounce),
        }
    }
}

impl<P, L> ActionContext<P, L> {
    pub fn new(
        msg_tx: mpsc::Sender<Message>,
        commands: CommandSender,
        places: Arc<P>,
        location: Arc<L>,
        prefs: PreferenceStore,
    ) -> Self {
        Self {
            msg_tx,
            commands,
            places,
            location,
            store: StoreWriter::spawn(prefs.clone()),
            prefs,
            debounce: Arc::new(Mutex::new(None)),
        }
    }

    /// Wait for queued store writes to finish
    pub async fn flush_store(&self) {
        self.store.flush().await;
    }

    /// Abort the pending debounce timer, if any
    pub fn cancel_debounce(&self) {
        self.replace_debounce(None);
    }

    /// Replace the pending debounce timer, aborting the old one
    fn replace_debounce(&self, handle: Option<JoinHandle<()>>) {
        match self.debounce.lock() {
            Ok(mut slot) => {
                if let Some(previous) = slot.take() {
                    previous.abort();
                }
                *slot = handle;
            }
            Err(_) => error!("debounce slot poisoned"),
        }
    }
}

/// Execute an action by spawning a background task
pub fn handle_action<P, L>(action: UpdateAction, ctx: &ActionContext<P, L>)
where
    P: PlaceService + Sync + 'static,
    L: LocationProvider + Sync + 'static,
{
    match action {
        UpdateAction::SendCommands(commands) => {
            let sender = ctx.commands.clone();
            tokio::spawn(async move {
                if let Err(e) = sender.send_all(commands).await {
                    warn!("Map command not delivered: {}", e);
                }
            });
        }

        UpdateAction::RequestLocationPermission => {
            location::spawn_permission_request(ctx.clone());
        }

        UpdateAction::FetchLocation { timeout } => {
            location::spawn_fix(ctx.clone(), timeout);
        }

        UpdateAction::ScheduleAutocomplete { generation, delay } => {
            let tx = ctx.msg_tx.clone();
            let handle = tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(Message::DebounceElapsed { generation }).await;
            });
            ctx.replace_debounce(Some(handle));
        }

        UpdateAction::CancelDebounce => {
            ctx.cancel_debounce();
        }

        UpdateAction::Autocomplete { seq, input, bias } => {
            search::spawn_autocomplete(ctx.clone(), seq, input, bias);
        }

        UpdateAction::TextSearch { seq, query, bias } => {
            ctx.cancel_debounce();
            search::spawn_text_search(ctx.clone(), seq, query, bias);
        }

        UpdateAction::ResolveSuggestion { seq, suggestion } => {
            search::spawn_resolve(ctx.clone(), seq, suggestion);
        }

        UpdateAction::PersistSavedPlaces(places) => {
            ctx.store.write("saved places", move |prefs| {
                prefs.set_saved_places(&places)
            });
        }

        UpdateAction::PersistHistory(history) => {
            ctx.store.write("search history", move |prefs| {
                prefs.set_history(&history)
            });
        }

        UpdateAction::PersistPreference(update) => {
            ctx.store.write("preference", move |prefs| match update {
                PreferenceUpdate::ApiKey(key) => prefs.set_api_key(key.as_deref()),
                PreferenceUpdate::MapId(map_id) => prefs.set_map_id(map_id.as_deref()),
                PreferenceUpdate::LocationEnabled(enabled) => prefs.set_location_enabled(enabled),
            });
        }
    }
}
