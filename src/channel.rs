//! Event channel from the host page into the embed app

use bevy::ecs::resource::Resource;
use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::input::HostEvent;

/// Resource queuing host events until the next app update
///
/// Host callbacks hold a cloned sender and may fire at any time; the plugin
/// drains the queue into Bevy messages in `PreUpdate`.
#[derive(Resource)]
pub struct HostChannel {
    sender: Sender<HostEvent>,
    receiver: Receiver<HostEvent>,
}

impl Default for HostChannel {
    fn default() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }
}

impl HostChannel {
    /// Creates a host channel with the given sender and receiver
    pub fn new(sender: Sender<HostEvent>, receiver: Receiver<HostEvent>) -> Self {
        Self { sender, receiver }
    }

    /// Queue an event from the host
    pub fn send(&self, event: HostEvent) {
        let _ = self.sender.send(event);
    }

    /// Take every queued event
    pub fn drain(&self) -> impl Iterator<Item = HostEvent> + '_ {
        self.receiver.try_iter()
    }

    /// Get a clone of the sender for host callbacks
    pub fn get_sender(&self) -> Sender<HostEvent> {
        self.sender.clone()
    }
}
