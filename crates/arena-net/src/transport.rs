//! Message channel port and in-process implementations.
//!
//! - `LoopbackTransport`: a connected pair over bounded crossbeam channels
//! - `LatencyLink`: wraps any transport with fixed delay and random loss

use std::collections::VecDeque;

use arena_common::TransportError;
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use tracing::{debug, trace};

use crate::config::LinkConfig;

/// Bidirectional byte channel to one peer. Never blocks.
pub trait Transport {
    /// Queue bytes for the peer.
    fn send(&mut self, bytes: Vec<u8>) -> Result<(), TransportError>;

    /// Take the next inbound payload, if any.
    fn try_recv(&mut self) -> Result<Option<Vec<u8>>, TransportError>;

    /// Whether this end has been closed.
    fn is_closed(&self) -> bool;

    /// Close this end. The peer sees the channel as closed once it has
    /// drained what was already sent.
    fn close(&mut self);
}

/// One end of an in-process channel pair.
#[derive(Debug)]
pub struct LoopbackTransport {
    tx: Option<Sender<Vec<u8>>>,
    rx: Option<Receiver<Vec<u8>>>,
}

impl LoopbackTransport {
    /// Create two connected ends.
    #[must_use]
    pub fn pair(capacity: usize) -> (Self, Self) {
        let (tx_a, rx_a) = bounded(capacity.max(1));
        let (tx_b, rx_b) = bounded(capacity.max(1));
        let a = Self {
            tx: Some(tx_a),
            rx: Some(rx_b),
        };
        let b = Self {
            tx: Some(tx_b),
            rx: Some(rx_a),
        };
        (a, b)
    }

    /// Messages waiting to be received.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.rx.as_ref().map_or(0, Receiver::len)
    }
}

impl Transport for LoopbackTransport {
    fn send(&mut self, bytes: Vec<u8>) -> Result<(), TransportError> {
        let tx = self.tx.as_ref().ok_or(TransportError::Closed)?;
        tx.try_send(bytes).map_err(|e| match e {
            TrySendError::Full(_) => TransportError::Full,
            TrySendError::Disconnected(_) => TransportError::Closed,
        })
    }

    fn try_recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let rx = self.rx.as_ref().ok_or(TransportError::Closed)?;
        match rx.try_recv() {
            Ok(bytes) => Ok(Some(bytes)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(TransportError::Closed),
        }
    }

    fn is_closed(&self) -> bool {
        self.tx.is_none()
    }

    fn close(&mut self) {
        self.tx = None;
        self.rx = None;
    }
}

/// Transport wrapper that delays outbound messages and drops some of them.
#[derive(Debug)]
pub struct LatencyLink<T: Transport> {
    inner: T,
    config: LinkConfig,
    rng: fastrand::Rng,
    /// Outbound messages with their release time
    in_flight: VecDeque<(f64, Vec<u8>)>,
    now_ms: f64,
    dropped: u64,
}

impl<T: Transport> LatencyLink<T> {
    /// Wrap `inner`.
    #[must_use]
    pub fn new(inner: T, config: LinkConfig) -> Self {
        Self {
            inner,
            rng: fastrand::Rng::with_seed(config.seed),
            config,
            in_flight: VecDeque::new(),
            now_ms: 0.0,
            dropped: 0,
        }
    }

    /// Let time pass and release messages whose delay has elapsed.
    pub fn advance(&mut self, dt_ms: f32) -> Result<(), TransportError> {
        self.now_ms += f64::from(dt_ms.max(0.0));
        while self
            .in_flight
            .front()
            .is_some_and(|(due, _)| *due <= self.now_ms)
        {
            let Some((_, bytes)) = self.in_flight.pop_front() else {
                break;
            };
            match self.inner.send(bytes) {
                Ok(()) => {},
                Err(TransportError::Full) => {
                    self.dropped += 1;
                    debug!("Link queue full, message dropped");
                },
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Messages dropped so far.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Messages sent but not yet released.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// The wrapped transport.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<T: Transport> Transport for LatencyLink<T> {
    fn send(&mut self, bytes: Vec<u8>) -> Result<(), TransportError> {
        if self.inner.is_closed() {
            return Err(TransportError::Closed);
        }
        if self.rng.f32() < self.config.drop_rate {
            self.dropped += 1;
            trace!("Link dropped outbound message");
            return Ok(());
        }
        let due = self.now_ms + f64::from(self.config.latency_ms);
        self.in_flight.push_back((due, bytes));
        Ok(())
    }

    fn try_recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        self.inner.try_recv()
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    fn close(&mut self) {
        self.in_flight.clear();
        self.inner.close();
    }
}
