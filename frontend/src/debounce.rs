use std::time::Duration;

use log::debug;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Holds back rapidly changing input (a search field) until it has been
/// still for `delay`. A settled value equal to the last one emitted is
/// swallowed, so re-typing the same term does not restart pagination.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
    emitted: Option<T>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: None,
            emitted: None,
        }
    }

    pub fn update(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// When the pending value will have settled, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, since)| *since + self.delay)
    }

    pub fn settled(&mut self, now: Instant) -> Option<T> {
        let deadline = self.deadline()?;
        if now < deadline {
            return None;
        }
        let (value, _) = self.pending.take()?;
        if self.emitted.as_ref() == Some(&value) {
            return None;
        }
        self.emitted = Some(value.clone());
        Some(value)
    }
}

/// Forwards settled values from `input` to `output` until either side
/// closes.
pub async fn debounce_channel<T>(
    mut input: mpsc::Receiver<T>,
    output: mpsc::Sender<T>,
    delay: Duration,
) where
    T: Clone + PartialEq,
{
    let mut debouncer = Debouncer::new(delay);

    loop {
        let deadline = debouncer.deadline();
        tokio::select! {
            value = input.recv() => match value {
                Some(value) => debouncer.update(value, Instant::now()),
                None => break,
            },
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some(value) = debouncer.settled(Instant::now()) {
                    if output.send(value).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
    debug!("debounce input closed");
}
