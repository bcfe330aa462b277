use holders_channel::ShareEvent;
use holders_types::Share;

/// Domain event emitted by the write path once a share is committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareCreated {
    pub share: Share,
}

impl ShareCreated {
    pub fn new(share: Share) -> Self {
        Self { share }
    }

    /// The wire form sent over the channel: just the share id.
    pub fn to_wire(&self) -> ShareEvent {
        ShareEvent::new(self.share.id)
    }
}
