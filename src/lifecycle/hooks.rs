//! Host lifecycle hooks.
//!
//! The embedding host calls these at its own lifecycle points: a save
//! loaded (session started), every simulation tick, and a return to the
//! title screen (session ended). All three run on the host's thread.

use crate::session::ConnectionManager;

pub trait HostLifecycle {
    fn on_session_started(&mut self);
    fn on_tick(&mut self);
    fn on_session_ended(&mut self);
}

impl HostLifecycle for ConnectionManager {
    fn on_session_started(&mut self) {
        // Bind failure is an environment problem; report it and stay idle.
        if let Err(e) = self.start_listening() {
            tracing::error!(error = %e, "Failed to start heartbeat listener");
        }
    }

    fn on_tick(&mut self) {
        self.tick();
    }

    fn on_session_ended(&mut self) {
        self.stop_listening();
    }
}
