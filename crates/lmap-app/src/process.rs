//! Message processing
//!
//! Runs one message and every follow-up it produces through the TEA update
//! function, dispatching each resulting action.

use crate::actions::{handle_action, ActionContext};
use crate::handler;
use crate::location::LocationProvider;
use crate::message::Message;
use crate::state::AppState;
use lmap_places::PlaceService;

/// Process a message through the TEA update function
pub fn process_message<P, L>(state: &mut AppState, message: Message, ctx: &ActionContext<P, L>)
where
    P: PlaceService + Sync + 'static,
    L: LocationProvider + Sync + 'static,
{
    let mut msg = Some(message);
    while let Some(m) = msg {
        let result = handler::update(state, m);

        if let Some(action) = result.action {
            handle_action(action, ctx);
        }

        // Continue with follow-up message
        msg = result.message;
    }
}
