use tokio::sync::watch;

/// Cancellation signal shared by the engine loop and its data source.
///
/// Once triggered it stays triggered. A dropped trigger also counts as
/// shutdown so orphaned tasks wind down.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    /// New untriggered signal and the sender that triggers it.
    pub fn channel() -> (watch::Sender<bool>, Shutdown) {
        let (tx, rx) = watch::channel(false);
        (tx, Shutdown { rx })
    }

    pub fn from_receiver(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    /// Resolve once shutdown is requested. Cancel safe.
    pub async fn wait(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}
