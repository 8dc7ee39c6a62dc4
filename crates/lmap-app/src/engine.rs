//! Host engine
//!
//! Owns `AppState` and the message channel, runs every message through the
//! TEA update loop and broadcasts [`EngineEvent`]s describing what changed.
//! Services are constructed once by the caller and handed in.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use lmap_bridge::{BridgeTransport, CommandSender, HostEnd};
use lmap_core::prelude::*;
use lmap_core::{BridgeEvent, BridgeMessage};
use lmap_places::PlaceService;

use crate::actions::ActionContext;
use crate::config::Settings;
use crate::engine_event::{EngineEvent, StateSnapshot};
use crate::location::LocationProvider;
use crate::message::Message;
use crate::process::process_message;
use crate::state::AppState;
use crate::store::PreferenceStore;

/// Capacity of the host message channel
const MESSAGE_CHANNEL_CAPACITY: usize = 256;

/// Capacity of the engine event broadcast
const EVENT_CHANNEL_CAPACITY: usize = 256;

pub struct Engine<P, L> {
    pub state: AppState,
    msg_tx: mpsc::Sender<Message>,
    msg_rx: mpsc::Receiver<Message>,
    ctx: ActionContext<P, L>,
    event_tx: broadcast::Sender<EngineEvent>,
    bridge: Option<BridgeTransport>,
    forwarder: Option<JoinHandle<()>>,
}

impl<P, L> Engine<P, L>
where
    P: PlaceService + Sync + 'static,
    L: LocationProvider + Sync + 'static,
{
    /// Create an engine that injects commands through `commands`.
    ///
    /// Stored preferences, saved places and history are loaded from `prefs`.
    pub fn new(
        settings: Settings,
        prefs: PreferenceStore,
        places: P,
        location: L,
        commands: CommandSender,
    ) -> Self {
        let mut state = AppState::with_settings(settings);
        state.restore(prefs.load());

        let (msg_tx, msg_rx) = mpsc::channel(MESSAGE_CHANNEL_CAPACITY);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let ctx = ActionContext::new(
            msg_tx.clone(),
            commands,
            Arc::new(places),
            Arc::new(location),
            prefs,
        );

        Self {
            state,
            msg_tx,
            msg_rx,
            ctx,
            event_tx,
            bridge: None,
            forwarder: None,
        }
    }

    /// Create an engine attached to the host end of a bridge wire.
    ///
    /// Bridge events are forwarded into the message channel as
    /// [`Message::Bridge`].
    pub fn attach(
        settings: Settings,
        prefs: PreferenceStore,
        places: P,
        location: L,
        host: HostEnd,
    ) -> Self {
        let (bridge_tx, mut bridge_rx) =
            mpsc::channel::<BridgeEvent>(settings.bridge.channel_capacity.max(1));
        let transport = BridgeTransport::attach(host, bridge_tx);

        let mut engine = Self::new(settings, prefs, places, location, transport.command_sender());

        let msg_tx = engine.msg_tx.clone();
        engine.forwarder = Some(tokio::spawn(async move {
            while let Some(event) = bridge_rx.recv().await {
                if msg_tx.send(Message::Bridge(event)).await.is_err() {
                    break;
                }
            }
            debug!("bridge forwarder finished");
        }));
        engine.bridge = Some(transport);
        engine
    }

    /// Sender for injecting messages (user input, tests)
    pub fn msg_sender(&self) -> mpsc::Sender<Message> {
        self.msg_tx.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    pub fn is_bridge_connected(&self) -> bool {
        self.bridge.as_ref().is_some_and(BridgeTransport::is_connected)
    }

    /// Process one message and broadcast the resulting events
    pub fn process_message(&mut self, message: Message) {
        if let Message::Bridge(BridgeEvent::Message(BridgeMessage::Error(e))) = &message {
            self.emit(EngineEvent::RuntimeError {
                message: e.error.clone(),
            });
        }

        let before = StateSnapshot::capture(&self.state);
        process_message(&mut self.state, message, &self.ctx);
        let after = StateSnapshot::capture(&self.state);

        for event in before.diff(&after) {
            self.emit(event);
        }
    }

    /// Wait for the next queued message
    pub async fn next_message(&mut self) -> Option<Message> {
        self.msg_rx.recv().await
    }

    /// Process every message already queued, returning how many ran
    pub fn drain_pending_messages(&mut self) -> usize {
        let mut count = 0;
        while let Ok(message) = self.msg_rx.try_recv() {
            self.process_message(message);
            count += 1;
        }
        count
    }

    /// Process messages until a quit message is handled
    pub async fn run(&mut self) {
        while !self.state.should_quit() {
            match self.msg_rx.recv().await {
                Some(message) => self.process_message(message),
                None => break,
            }
        }
    }

    /// Wait for queued store writes to reach the store
    pub async fn flush_store(&self) {
        self.ctx.flush_store().await;
    }

    /// Stop background work and announce shutdown
    pub fn shutdown(&mut self) {
        info!("Engine shutting down");
        self.ctx.cancel_debounce();
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
        if let Some(bridge) = self.bridge.take() {
            bridge.shutdown();
        }
        self.emit(EngineEvent::Shutdown);
    }

    fn emit(&self, event: EngineEvent) {
        trace!("engine event: {}", event.event_type());
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use lmap_bridge::test_utils::recording_sender;
    use lmap_bridge::MapCommand;
    use lmap_core::{AutocompleteSuggestion, MapLocation, SearchResult};
    use lmap_places::LocationBias;

    use crate::location::{LocationPhase, StaticLocationProvider};

    #[derive(Default)]
    struct FakePlaces {
        autocomplete_inputs: Mutex<Vec<String>>,
        searches: AtomicUsize,
    }

    impl PlaceService for FakePlaces {
        async fn text_search(
            &self,
            query: &str,
            _bias: Option<LocationBias>,
        ) -> lmap_core::Result<Vec<SearchResult>> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            Ok(vec![SearchResult {
                place_id: query.to_string(),
                name: query.to_string(),
                address: format!("{query}, Paris"),
                location: MapLocation::new(48.86, 2.34),
            }])
        }

        async fn autocomplete(
            &self,
            input: &str,
            _bias: Option<LocationBias>,
        ) -> lmap_core::Result<Vec<AutocompleteSuggestion>> {
            self.autocomplete_inputs
                .lock()
                .unwrap()
                .push(input.to_string());
            Ok(vec![AutocompleteSuggestion {
                place_id: format!("{input}-1"),
                name: input.to_string(),
                address: "Paris".to_string(),
            }])
        }

        async fn resolve(
            &self,
            suggestion: &AutocompleteSuggestion,
        ) -> lmap_core::Result<SearchResult> {
            Ok(SearchResult {
                place_id: suggestion.place_id.clone(),
                name: suggestion.name.clone(),
                address: suggestion.address.clone(),
                location: MapLocation::new(48.86, 2.34),
            })
        }
    }

    /// Counts calls; grants permission and answers with a fixed position
    #[derive(Default)]
    struct CountingLocation {
        permission_calls: AtomicUsize,
        fix_calls: AtomicUsize,
    }

    impl LocationProvider for CountingLocation {
        async fn request_permission(&self) -> lmap_core::Result<bool> {
            self.permission_calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }

        async fn current_position(&self) -> lmap_core::Result<MapLocation> {
            self.fix_calls.fetch_add(1, Ordering::SeqCst);
            Ok(MapLocation::new(45.764, 4.8357))
        }
    }

    fn permission_settings() -> Settings {
        let mut settings = Settings::default();
        settings.location.requires_runtime_permission = true;
        settings
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_keystrokes_issue_one_autocomplete() {
        let (commands, _rx) = recording_sender(8);
        let mut engine = Engine::new(
            Settings::default(),
            PreferenceStore::in_memory(),
            FakePlaces::default(),
            StaticLocationProvider::new(None),
            commands,
        );

        for text in ["lo", "lou", "louv", "louvr", "louvre"] {
            engine.process_message(Message::SearchInput {
                text: text.to_string(),
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        // Debounce fires, then the autocomplete response arrives
        for _ in 0..2 {
            let message = engine.next_message().await.unwrap();
            engine.process_message(message);
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(engine.drain_pending_messages(), 0);

        let inputs = engine.ctx.places.autocomplete_inputs.lock().unwrap().clone();
        assert_eq!(inputs, ["louvre"]);
        assert_eq!(engine.state.search.suggestions[0].place_id, "louvre-1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_autocomplete_per_quiet_period() {
        let (commands, _rx) = recording_sender(8);
        let mut engine = Engine::new(
            Settings::default(),
            PreferenceStore::in_memory(),
            FakePlaces::default(),
            StaticLocationProvider::new(None),
            commands,
        );

        for burst in [["pa", "par"], ["pari", "paris"]] {
            for text in burst {
                engine.process_message(Message::SearchInput {
                    text: text.to_string(),
                });
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            for _ in 0..2 {
                let message = engine.next_message().await.unwrap();
                engine.process_message(message);
            }
        }

        let inputs = engine.ctx.places.autocomplete_inputs.lock().unwrap().clone();
        assert_eq!(inputs, ["par", "paris"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_cancels_pending_autocomplete() {
        let (commands, _rx) = recording_sender(8);
        let mut engine = Engine::new(
            Settings::default(),
            PreferenceStore::in_memory(),
            FakePlaces::default(),
            StaticLocationProvider::new(None),
            commands,
        );

        engine.process_message(Message::SearchInput {
            text: "louvre".to_string(),
        });
        engine.process_message(Message::SearchSubmit);

        let message = engine.next_message().await.unwrap();
        assert!(matches!(message, Message::SearchCompleted { .. }));
        engine.process_message(message);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(engine.drain_pending_messages(), 0);
        assert!(engine.ctx.places.autocomplete_inputs.lock().unwrap().is_empty());
        assert_eq!(engine.ctx.places.searches.load(Ordering::SeqCst), 1);
        assert_eq!(engine.state.search.results.len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_location_makes_no_provider_calls() {
        let prefs = PreferenceStore::in_memory();
        prefs.set_location_enabled(false).unwrap();
        let (commands, mut rx) = recording_sender(8);
        let mut engine = Engine::new(
            permission_settings(),
            prefs,
            FakePlaces::default(),
            CountingLocation::default(),
            commands,
        );

        engine.process_message(Message::Bridge(BridgeEvent::Message(BridgeMessage::MapReady)));
        engine.process_message(Message::LocateRequested);
        tokio::task::yield_now().await;

        assert_eq!(engine.drain_pending_messages(), 0);
        assert_eq!(engine.ctx.location.permission_calls.load(Ordering::SeqCst), 0);
        assert_eq!(engine.ctx.location.fix_calls.load(Ordering::SeqCst), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_location_flow_runs_legs_in_order() {
        let (commands, mut rx) = recording_sender(8);
        let mut engine = Engine::new(
            permission_settings(),
            PreferenceStore::in_memory(),
            FakePlaces::default(),
            CountingLocation::default(),
            commands,
        );

        engine.process_message(Message::LocateRequested);
        assert_eq!(
            engine.state.location.phase,
            LocationPhase::RequestingPermission
        );

        let message = engine.next_message().await.unwrap();
        assert!(matches!(message, Message::LocationPermission { granted: true }));
        assert_eq!(engine.ctx.location.fix_calls.load(Ordering::SeqCst), 0);
        engine.process_message(message);

        let message = engine.next_message().await.unwrap();
        assert!(matches!(message, Message::LocationFixed { .. }));
        engine.process_message(message);

        let here = MapLocation::new(45.764, 4.8357);
        assert_eq!(engine.state.location.user_location, Some(here));
        assert_eq!(engine.state.location.phase, LocationPhase::Idle);

        let first = MapCommand::parse(&rx.recv().await.unwrap()).unwrap();
        let second = MapCommand::parse(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(
            first,
            MapCommand::SetCenter {
                location: here,
                zoom: Some(15.0)
            }
        );
        assert_eq!(second, MapCommand::SetUserLocation { location: here });
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fix_times_out_quietly() {
        let (commands, mut rx) = recording_sender(8);
        let location = StaticLocationProvider::new(Some(MapLocation::new(1.0, 2.0)))
            .with_delay(Duration::from_secs(300));
        let mut engine = Engine::new(
            Settings::default(),
            PreferenceStore::in_memory(),
            FakePlaces::default(),
            location,
            commands,
        );

        engine.process_message(Message::LocateRequested);
        let message = engine.next_message().await.unwrap();
        assert!(matches!(message, Message::LocationFailed { .. }));
        engine.process_message(message);

        assert_eq!(engine.state.location.phase, LocationPhase::Idle);
        assert!(engine.state.location.user_location.is_none());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_events_follow_state_changes() {
        let (commands, _rx) = recording_sender(8);
        let mut engine = Engine::new(
            Settings::default(),
            PreferenceStore::in_memory(),
            FakePlaces::default(),
            StaticLocationProvider::new(None),
            commands,
        );
        let mut events = engine.subscribe();

        engine.process_message(Message::Bridge(BridgeEvent::Message(BridgeMessage::MapReady)));

        assert_eq!(
            events.recv().await.unwrap(),
            EngineEvent::MapReadyChanged { ready: true }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            EngineEvent::LocationPhaseChanged {
                phase: LocationPhase::Fetching
            }
        );
    }

    #[tokio::test]
    async fn test_runtime_error_is_reported_without_state_change() {
        let (commands, _rx) = recording_sender(8);
        let mut engine = Engine::new(
            Settings::default(),
            PreferenceStore::in_memory(),
            FakePlaces::default(),
            StaticLocationProvider::new(None),
            commands,
        );
        let mut events = engine.subscribe();

        engine.process_message(Message::Bridge(BridgeEvent::Message(BridgeMessage::Error(
            lmap_core::BridgeError {
                error: "SDK fault".to_string(),
            },
        ))));

        assert_eq!(
            events.recv().await.unwrap(),
            EngineEvent::RuntimeError {
                message: "SDK fault".to_string()
            }
        );
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_selected_result_is_written_through() {
        let prefs = PreferenceStore::in_memory();
        let (commands, mut rx) = recording_sender(8);
        let mut engine = Engine::new(
            Settings::default(),
            prefs.clone(),
            FakePlaces::default(),
            StaticLocationProvider::new(None),
            commands,
        );

        engine.process_message(Message::SearchInput {
            text: "orsay".to_string(),
        });
        engine.process_message(Message::SearchSubmit);
        let message = engine.next_message().await.unwrap();
        engine.process_message(message);
        engine.process_message(Message::SelectResult { index: 0 });

        let script = rx.recv().await.unwrap();
        assert!(matches!(
            MapCommand::parse(&script).unwrap(),
            MapCommand::GoToPlace { .. }
        ));

        engine.flush_store().await;
        assert_eq!(prefs.history().unwrap()[0].place_id, "orsay");
    }

    #[tokio::test]
    async fn test_engine_restores_stored_state() {
        let prefs = PreferenceStore::in_memory();
        prefs.set_map_id(Some("map-1")).unwrap();
        prefs.set_location_enabled(false).unwrap();

        let (commands, _rx) = recording_sender(8);
        let engine = Engine::new(
            Settings::default(),
            prefs,
            FakePlaces::default(),
            StaticLocationProvider::new(None),
            commands,
        );

        assert!(engine.state.prefs.supports_rotation());
        assert!(!engine.state.prefs.location_enabled);
        assert!(!engine.is_bridge_connected());
    }
}
