use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::client::PageSource;
use crate::controller::ListController;

/// Runs a search once the input has been quiet for `delay`.
///
/// Each settled term is searched on its own task, so searches may overlap;
/// the controller's generation check keeps only the newest result.
pub struct SearchDebouncer<S> {
    controller: Weak<ListController<S>>,
    input: mpsc::UnboundedSender<String>,
    task: JoinHandle<()>,
}

impl<S: PageSource + 'static> SearchDebouncer<S> {
    pub fn spawn(controller: &Arc<ListController<S>>, delay: Duration) -> Self {
        let (input, rx) = mpsc::unbounded_channel();
        let weak = Arc::downgrade(controller);
        let task = tokio::spawn(run(weak.clone(), rx, delay));
        Self { controller: weak, input, task }
    }

    /// A keystroke: record the term now, search once the input settles.
    pub fn input(&self, term: &str) {
        if let Some(ctl) = self.controller.upgrade() {
            ctl.set_search_term(term);
        }
        let _ = self.input.send(term.to_string());
    }
}

impl<S> Drop for SearchDebouncer<S> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<S: PageSource + 'static>(controller: Weak<ListController<S>>, mut rx: mpsc::UnboundedReceiver<String>, delay: Duration) {
    let mut pending: Option<String> = None;
    loop {
        let Some(term) = pending.take() else {
            match rx.recv().await {
                Some(term) => pending = Some(term),
                None => return,
            }
            continue;
        };
        tokio::select! {
            next = rx.recv() => match next {
                Some(next) => pending = Some(next),
                None => return,
            },
            _ = tokio::time::sleep(delay) => {
                let Some(ctl) = controller.upgrade() else { return };
                tracing::debug!(term = %term, "search input settled");
                tokio::spawn(async move {
                    ctl.search(&term).await;
                });
            }
        }
    }
}
