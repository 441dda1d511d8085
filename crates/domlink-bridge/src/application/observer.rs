//! Observer ports: where the handler reports the traffic it sees.
//!
//! The handler has two output ports:
//!
//! - `on_receive(channel, value)`: an inbound update was applied.
//! - `on_transmit(channel, value)`: the handler produced a value destined for
//!   an external sender (an echo or acknowledgement).
//!
//! Both are expressed as one trait, [`UpdateObserver`], with three stock
//! implementations:
//!
//! | Type               | Delivery                                        |
//! |--------------------|-------------------------------------------------|
//! | [`CallbackObserver`] | direct call to two closures                   |
//! | [`QueueObserver`]    | message on a bounded tokio mpsc queue         |
//! | [`NoopObserver`]     | discarded                                     |

use std::cell::Cell;

use tokio::sync::mpsc::error::{SendError, TrySendError};
use tokio::sync::mpsc::Sender;
use tracing::warn;

use crate::domain::ObservedUpdate;

/// Receives the handler's rx/tx notifications.
#[cfg_attr(test, mockall::automock)]
pub trait UpdateObserver {
    /// Called exactly once for every inbound update that was applied.
    fn on_receive(&self, channel: &str, value: &str);

    /// Called exactly once for every value the handler originates.
    fn on_transmit(&self, channel: &str, value: &str);
}

/// Forwards notifications to two closures.
///
/// The constructor takes the transmit callback first, matching the order of
/// the handler's construction contract `(debug, on_transmit, on_receive)`.
///
/// # Example
///
/// ```rust
/// use std::cell::RefCell;
/// use domlink_bridge::application::{CallbackObserver, UpdateObserver};
///
/// let seen = RefCell::new(Vec::new());
/// let observer = CallbackObserver::new(
///     |_ch: &str, _v: &str| {},
///     |ch: &str, v: &str| seen.borrow_mut().push(format!("{ch}={v}")),
/// );
/// observer.on_receive("lights.info", "50%");
/// assert_eq!(seen.borrow().as_slice(), ["lights.info=50%"]);
/// ```
pub struct CallbackObserver<T, R> {
    on_transmit: T,
    on_receive: R,
}

impl<T, R> CallbackObserver<T, R>
where
    T: Fn(&str, &str),
    R: Fn(&str, &str),
{
    pub fn new(on_transmit: T, on_receive: R) -> Self {
        Self {
            on_transmit,
            on_receive,
        }
    }
}

impl<T, R> UpdateObserver for CallbackObserver<T, R>
where
    T: Fn(&str, &str),
    R: Fn(&str, &str),
{
    fn on_receive(&self, channel: &str, value: &str) {
        (self.on_receive)(channel, value);
    }

    fn on_transmit(&self, channel: &str, value: &str) {
        (self.on_transmit)(channel, value);
    }
}

/// Sends each notification as an [`ObservedUpdate`] on a bounded queue.
///
/// The handler is synchronous and must never block, so delivery itself uses
/// `try_send`.  An async caller keeps delivery lossless by awaiting
/// [`QueueObserver::ready`] before each update: every update or echo emits at
/// most one notification, so one free slot is always enough.
///
/// A caller that skips `ready` can outrun the consumer.  When the queue is
/// full or closed the notification is dropped, counted in
/// [`QueueObserver::dropped`], and logged at `warn`.
pub struct QueueObserver {
    tx: Sender<ObservedUpdate>,
    dropped: Cell<u64>,
}

impl QueueObserver {
    pub fn new(tx: Sender<ObservedUpdate>) -> Self {
        Self {
            tx,
            dropped: Cell::new(0),
        }
    }

    /// Waits until the queue has room for one more notification.
    ///
    /// The reserved slot is released straight away; on a single-threaded
    /// runtime nothing else can take it before the next synchronous update.
    ///
    /// # Errors
    ///
    /// Returns [`SendError`] when the consumer has hung up.
    pub async fn ready(&self) -> Result<(), SendError<()>> {
        self.tx.reserve().await.map(drop)
    }

    /// Number of notifications that could not be queued.
    pub fn dropped(&self) -> u64 {
        self.dropped.get()
    }

    fn send(&self, update: ObservedUpdate) {
        if let Err(err) = self.tx.try_send(update) {
            self.dropped.set(self.dropped.get() + 1);
            let (reason, update) = match err {
                TrySendError::Full(u) => ("queue full", u),
                TrySendError::Closed(u) => ("queue closed", u),
            };
            warn!(
                channel = %update.channel,
                direction = ?update.direction,
                reason,
                "observer notification dropped"
            );
        }
    }
}

impl UpdateObserver for QueueObserver {
    fn on_receive(&self, channel: &str, value: &str) {
        self.send(ObservedUpdate::received(channel, value));
    }

    fn on_transmit(&self, channel: &str, value: &str) {
        self.send(ObservedUpdate::transmitted(channel, value));
    }
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl UpdateObserver for NoopObserver {
    fn on_receive(&self, _channel: &str, _value: &str) {}

    fn on_transmit(&self, _channel: &str, _value: &str) {}
}

// ── Tests ─────────────────────────────────────────────────────────────────────
