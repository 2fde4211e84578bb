/*!
 * Rate-limited lookup queue.
 *
 * A single consumer task resolves words strictly one at a time, waits on a
 * [`RateLimitPolicy`] between consecutive lookups and streams events back
 * over a channel.
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::Stream;
use log::debug;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

use super::cache::DictionaryCache;
use crate::app_config::DictionaryConfig;

/// Pacing between remote lookups
#[async_trait]
pub trait RateLimitPolicy: Send {
    /// Wait until the next lookup may run
    async fn wait(&mut self);
}

/// Constant pause between lookups
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl RateLimitPolicy for FixedDelay {
    async fn wait(&mut self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}

/// Token bucket allowing short bursts, refilled one token per interval
pub struct TokenBucket {
    capacity: f64,
    tokens: f64,
    refill_interval: Duration,
    last_refill: Instant,
}

impl TokenBucket {
    /// Starts full
    pub fn new(capacity: u32, refill_interval: Duration) -> Self {
        let capacity = f64::from(capacity.max(1));
        Self {
            capacity,
            tokens: capacity,
            refill_interval,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        if self.refill_interval.is_zero() {
            self.tokens = self.capacity;
        } else {
            let elapsed = now.duration_since(self.last_refill).as_secs_f64();
            let earned = elapsed / self.refill_interval.as_secs_f64();
            self.tokens = (self.tokens + earned).min(self.capacity);
        }
        self.last_refill = now;
    }
}

#[async_trait]
impl RateLimitPolicy for TokenBucket {
    async fn wait(&mut self) {
        self.refill();

        if self.tokens < 1.0 {
            let missing = 1.0 - self.tokens;
            sleep(self.refill_interval.mul_f64(missing)).await;
            self.refill();
        }

        self.tokens = (self.tokens - 1.0).max(0.0);
    }
}

/// Which policy a job gets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimit {
    Fixed(Duration),
    Bucket { capacity: u32, refill_interval: Duration },
}

impl RateLimit {
    pub fn from_config(config: &DictionaryConfig) -> Self {
        match config.burst_capacity {
            Some(capacity) => RateLimit::Bucket {
                capacity,
                refill_interval: config.rate_limit_delay(),
            },
            None => RateLimit::Fixed(config.rate_limit_delay()),
        }
    }

    /// A fresh policy instance
    pub fn policy(&self) -> Box<dyn RateLimitPolicy> {
        match *self {
            RateLimit::Fixed(delay) => Box::new(FixedDelay::new(delay)),
            RateLimit::Bucket { capacity, refill_interval } => {
                Box::new(TokenBucket::new(capacity, refill_interval))
            }
        }
    }
}

/// Result of resolving one queued word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupOutcome {
    pub index: usize,
    pub word: String,
    pub meaning: Option<String>,
}

/// Events emitted by the consumer task, in task order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupEvent {
    Started { index: usize, word: String },
    Finished(LookupOutcome),
}

pub struct LookupQueue {
    receiver: mpsc::Receiver<LookupEvent>,
    consumer: JoinHandle<()>,
}

impl LookupQueue {
    /// Spawn the consumer over an ordered word list.
    ///
    /// Dropping the queue stops the consumer after its current lookup.
    pub fn spawn(cache: Arc<DictionaryCache>, words: Vec<String>, mut policy: Box<dyn RateLimitPolicy>) -> Self {
        let (sender, receiver) = mpsc::channel(16);

        let consumer = tokio::spawn(async move {
            let total = words.len();

            for (index, word) in words.into_iter().enumerate() {
                if index > 0 {
                    policy.wait().await;
                }

                let started = LookupEvent::Started { index, word: word.clone() };
                if sender.send(started).await.is_err() {
                    debug!("Lookup queue receiver dropped, stopping at {}/{}", index, total);
                    return;
                }

                let meaning = cache.lookup(&word).await;
                let finished = LookupEvent::Finished(LookupOutcome { index, word, meaning });
                if sender.send(finished).await.is_err() {
                    debug!("Lookup queue receiver dropped, stopping at {}/{}", index + 1, total);
                    return;
                }
            }
        });

        Self { receiver, consumer }
    }

    pub async fn next(&mut self) -> Option<LookupEvent> {
        self.receiver.recv().await
    }

    /// Event stream borrowing the queue, so [`LookupQueue::finish`] can run once it ends
    pub fn events(&mut self) -> impl Stream<Item = LookupEvent> + '_ {
        futures::stream::unfold(&mut self.receiver, |receiver| async move {
            receiver.recv().await.map(|event| (event, receiver))
        })
    }

    /// Wait for the consumer task to exit.
    ///
    /// A consumer that panicked mid-list is an error, since the events seen so
    /// far do not cover every word.
    pub async fn finish(self) -> Result<()> {
        drop(self.receiver);
        self.consumer.await.map_err(|e| {
            if e.is_panic() {
                anyhow!("Dictionary lookup task panicked")
            } else {
                anyhow!("Dictionary lookup task was cancelled")
            }
        })
    }
}
