//! Infinite scroll: a sentinel near the end of the list reports its
//! visibility, and while it stays visible the next page is requested.

use std::sync::{Arc, Weak};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::client::PageSource;
use crate::controller::{ListController, LoadOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Observer attached to one controller. Dropping it detaches the observer.
pub struct ScrollTrigger {
    events: mpsc::UnboundedSender<Visibility>,
    task: JoinHandle<()>,
}

impl ScrollTrigger {
    pub fn attach<S: PageSource + 'static>(controller: &Arc<ListController<S>>) -> Self {
        let (events, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(observe(Arc::downgrade(controller), controller.settled(), rx));
        Self { events, task }
    }

    /// Report a sentinel visibility change. Returns false once the observer
    /// has stopped.
    pub fn notify(&self, visibility: Visibility) -> bool {
        self.events.send(visibility).is_ok()
    }

    pub fn is_active(&self) -> bool { !self.task.is_finished() }

    pub fn detach(self) {}
}

impl Drop for ScrollTrigger {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Loads while the sentinel is visible. Wakes on visibility changes and on
/// every finished load, so a sentinel that stayed on screen through someone
/// else's load is checked again.
async fn observe<S: PageSource>(
    controller: Weak<ListController<S>>,
    mut settled: watch::Receiver<u64>,
    mut rx: mpsc::UnboundedReceiver<Visibility>,
) {
    let mut visible = false;
    loop {
        if visible {
            let Some(ctl) = controller.upgrade() else {
                tracing::debug!("controller gone; scroll observer stopping");
                return;
            };
            if let Some(outcome) = ctl.load_more().await {
                match outcome {
                    LoadOutcome::Applied { received } => tracing::debug!(received, offset = ctl.offset(), "sentinel page loaded"),
                    other => tracing::debug!(?other, "sentinel load did not apply"),
                }
                drop(ctl);
                settled.borrow_and_update();
                // Pick up any visibility change that arrived during the load.
                while let Ok(event) = rx.try_recv() {
                    visible = event == Visibility::Visible;
                }
                continue;
            }
        }
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => visible = event == Visibility::Visible,
                None => return,
            },
            changed = settled.changed() => {
                if changed.is_err() {
                    tracing::debug!("controller gone; scroll observer stopping");
                    return;
                }
            }
        }
    }
}
