//! Handle for a live `GamePlayed` event stream.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::traits::SubmissionError;
use crate::types::GamePlayedEvent;

pub type EventResult = Result<GamePlayedEvent, SubmissionError>;

/// Receiving end of a `GamePlayed` subscription.
///
/// Dropping the handle stops the background task feeding it, so an abandoned
/// round leaves no listener behind.
pub struct OutcomeSubscription {
    receiver: mpsc::Receiver<EventResult>,
    task: Option<JoinHandle<()>>,
}

impl OutcomeSubscription {
    pub fn new(receiver: mpsc::Receiver<EventResult>, task: JoinHandle<()>) -> Self {
        Self {
            receiver,
            task: Some(task),
        }
    }

    /// A subscription fed directly by the caller, without a background task.
    pub fn from_receiver(receiver: mpsc::Receiver<EventResult>) -> Self {
        Self {
            receiver,
            task: None,
        }
    }

    /// Next decoded event. `None` once the stream has ended.
    pub async fn next(&mut self) -> Option<EventResult> {
        self.receiver.recv().await
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for OutcomeSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for OutcomeSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeSubscription")
            .field("finished", &self.is_finished())
            .finish()
    }
}
