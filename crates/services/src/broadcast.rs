use log::debug;
use tokio::sync::broadcast;

use care_core::model::Post;

/// Default number of posts a slow subscriber may fall behind before lagging.
pub const DEFAULT_CAPACITY: usize = 64;

/// Real-time channel announcing newly created posts to open feeds.
pub trait PostBroadcast: Send + Sync {
    fn publish(&self, post: &Post);

    fn subscribe(&self) -> broadcast::Receiver<Post>;
}

/// In-process broadcast over `tokio::sync::broadcast`.
#[derive(Clone)]
pub struct LocalBroadcast {
    sender: broadcast::Sender<Post>,
}

impl LocalBroadcast {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }
}

impl Default for LocalBroadcast {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl PostBroadcast for LocalBroadcast {
    fn publish(&self, post: &Post) {
        // No subscribers is not an error: nobody has a feed open.
        match self.sender.send(post.clone()) {
            Ok(receivers) => debug!("broadcast post {} to {receivers} feed(s)", post.id),
            Err(_) => debug!("broadcast post {} with no open feeds", post.id),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<Post> {
        self.sender.subscribe()
    }
}
