//! Single-shot countdown driving the choice deadline.

use std::time::Duration;

use game_core::Generation;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

const TICK: Duration = Duration::from_secs(1);

/// Messages a running countdown delivers to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMessage {
    /// One second elapsed; `remaining` seconds are left.
    Tick {
        generation: Generation,
        remaining: u32,
    },
    /// The deadline was reached. Sent exactly once, after the final tick.
    Expired { generation: Generation },
}

impl TimerMessage {
    pub fn generation(&self) -> Generation {
        match self {
            TimerMessage::Tick { generation, .. } | TimerMessage::Expired { generation } => {
                *generation
            }
        }
    }
}

/// A running countdown. Dropping or cancelling it stops all further ticks.
///
/// Ticks are scheduled against the start instant, so a slow receiver does
/// not stretch the deadline.
#[derive(Debug)]
pub struct CountdownTimer {
    generation: Generation,
    task: JoinHandle<()>,
}

impl CountdownTimer {
    pub fn start(generation: Generation, seconds: u32, tx: mpsc::Sender<TimerMessage>) -> Self {
        let task = tokio::spawn(async move {
            let start = Instant::now();
            for elapsed in 1..=seconds {
                tokio::time::sleep_until(start + TICK * elapsed).await;
                let tick = TimerMessage::Tick {
                    generation,
                    remaining: seconds - elapsed,
                };
                if tx.send(tick).await.is_err() {
                    return;
                }
            }
            if tx.send(TimerMessage::Expired { generation }).await.is_err() {
                tracing::trace!(%generation, "countdown owner gone before expiry");
            }
        });

        Self { generation, task }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut mpsc::Receiver<TimerMessage>) -> Vec<TimerMessage> {
        let mut out = Vec::new();
        while let Ok(message) = rx.try_recv() {
            out.push(message);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn expires_once_after_five_ticks() {
        let (tx, mut rx) = mpsc::channel(16);
        let generation = Generation(3);
        let timer = CountdownTimer::start(generation, 5, tx);

        let mut ticks = Vec::new();
        loop {
            match rx.recv().await.unwrap() {
                TimerMessage::Tick { remaining, .. } => ticks.push(remaining),
                TimerMessage::Expired { generation: g } => {
                    assert_eq!(g, generation);
                    break;
                }
            }
        }
        assert_eq!(ticks, vec![4, 3, 2, 1, 0]);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(drain(&mut rx).is_empty());
        assert!(timer.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_arrive_one_second_apart() {
        let (tx, mut rx) = mpsc::channel(16);
        let start = Instant::now();
        let _timer = CountdownTimer::start(Generation(1), 2, tx);

        rx.recv().await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(1));
        rx.recv().await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(2));
        assert_eq!(
            rx.recv().await.unwrap(),
            TimerMessage::Expired {
                generation: Generation(1)
            }
        );
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_is_silent() {
        let (tx, mut rx) = mpsc::channel(16);
        let timer = CountdownTimer::start(Generation(1), 5, tx);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let before = drain(&mut rx);
        assert_eq!(before.len(), 2);

        timer.cancel();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(drain(&mut rx).is_empty());
    }
}
