//! Background collision worker
//!
//! Runs `find_colliding_pairs` on its own thread. The simulation submits a
//! snapshot and picks the result up on a later tick, so at most one pass is
//! ever in flight; results therefore describe positions one tick old.
//!
//! Targets without threads (wasm32 in the browser) fail to spawn the worker
//! and the manager falls back to in-process collision.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::collision::{CollisionRequest, CollisionResponse, find_colliding_pairs};
use super::element::ElementId;
use crate::error::{SimError, SimResult};

pub struct CollisionWorker {
    requests: Option<Sender<CollisionRequest>>,
    responses: Receiver<CollisionResponse>,
    handle: Option<JoinHandle<()>>,
    in_flight: bool,
}

impl CollisionWorker {
    pub fn spawn() -> SimResult<Self> {
        let (request_tx, request_rx) = mpsc::channel::<CollisionRequest>();
        let (response_tx, response_rx) = mpsc::channel::<CollisionResponse>();

        let handle = thread::Builder::new()
            .name("collision-worker".into())
            .spawn(move || {
                for request in request_rx {
                    let pairs = find_colliding_pairs(&request);
                    if response_tx.send(CollisionResponse(pairs)).is_err() {
                        break;
                    }
                }
                log::debug!("collision worker exiting");
            })
            .map_err(|e| SimError::WorkerUnavailable(e.to_string()))?;

        Ok(Self {
            requests: Some(request_tx),
            responses: response_rx,
            handle: Some(handle),
            in_flight: false,
        })
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Hand a snapshot to the worker. Returns `Ok(false)` without sending
    /// when the previous pass hasn't been collected yet.
    pub fn submit(&mut self, request: CollisionRequest) -> SimResult<bool> {
        if self.in_flight {
            return Ok(false);
        }
        let sender = self.requests.as_ref().ok_or(SimError::WorkerDisconnected)?;
        sender.send(request).map_err(|_| SimError::WorkerDisconnected)?;
        self.in_flight = true;
        Ok(true)
    }

    /// Collect a finished pass, if there is one
    pub fn poll(&mut self) -> SimResult<Option<Vec<[ElementId; 2]>>> {
        if !self.in_flight {
            return Ok(None);
        }
        match self.responses.try_recv() {
            Ok(CollisionResponse(pairs)) => {
                self.in_flight = false;
                Ok(Some(pairs))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(SimError::WorkerDisconnected),
        }
    }

    /// Block until the pass in flight finishes or `timeout` elapses
    pub fn wait(&mut self, timeout: Duration) -> SimResult<Option<Vec<[ElementId; 2]>>> {
        if !self.in_flight {
            return Ok(None);
        }
        match self.responses.recv_timeout(timeout) {
            Ok(CollisionResponse(pairs)) => {
                self.in_flight = false;
                Ok(Some(pairs))
            }
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(SimError::WorkerDisconnected),
        }
    }
}

impl Drop for CollisionWorker {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("collision worker panicked");
            }
        }
    }
}

impl std::fmt::Debug for CollisionWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionWorker")
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}
