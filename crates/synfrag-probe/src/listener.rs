//! Capture listener
//!
//! A separate thread that arms the BPF filter before anything is
//! transmitted, signals readiness, and races one captured frame against
//! the deadline. The readiness signal is the only ordering guarantee: the
//! orchestrator must not inject until it has been received. The residual
//! race between "about to wait" and "waiting" is accepted; a listener
//! that misses an immediate reply reports the timeout truthfully.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, Receiver};
use synfrag_core::{Error, Result};
use synfrag_net::{LinkIo, MAX_FRAME};

/// Handle to the spawned listener thread.
pub struct Listener {
    ready_rx: Receiver<Result<()>>,
    result_rx: Receiver<Result<Option<Vec<u8>>>>,
    handle: Option<JoinHandle<()>>,
}

impl Listener {
    /// Spawn the listener. It owns `link` for the duration of the run;
    /// the orchestrator keeps its own injection handle.
    pub fn spawn(mut link: Box<dyn LinkIo>, filter: String, deadline: Duration) -> Self {
        let (ready_tx, ready_rx) = bounded(1);
        let (result_tx, result_rx) = bounded(1);

        let handle = thread::spawn(move || {
            // Idle -> Armed: compile and install the filter.
            if let Err(e) = link.set_filter(&filter) {
                let _ = ready_tx.try_send(Err(e));
                return;
            }
            tracing::debug!("listener armed");

            // Armed -> Reading. The send is non-blocking by construction;
            // if the orchestrator is gone there is nothing left to do.
            if ready_tx.try_send(Ok(())).is_err() {
                return;
            }

            // Reading -> Done | Timeout.
            let outcome = link.next_frame(deadline);
            let _ = result_tx.send(outcome);
        });

        Self {
            ready_rx,
            result_rx,
            handle: Some(handle),
        }
    }

    /// Block until the listener reports that the filter is installed and
    /// it is about to wait on the capture descriptor.
    pub fn wait_ready(&self) -> Result<()> {
        match self.ready_rx.recv() {
            Ok(armed) => armed,
            Err(_) => Err(Error::ChildComm(
                "listener exited before signalling readiness".to_string(),
            )),
        }
    }

    /// Harvest the run result. `None` means the deadline expired.
    pub fn harvest(mut self) -> Result<Option<Vec<u8>>> {
        let outcome = self.result_rx.recv().map_err(|_| {
            Error::ChildComm("listener exited without reporting a result".to_string())
        })?;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }

        let frame = outcome?;
        if let Some(ref f) = frame {
            if f.is_empty() || f.len() > MAX_FRAME {
                return Err(Error::ChildComm(format!(
                    "reply length {} out of range [1, {}]",
                    f.len(),
                    MAX_FRAME
                )));
            }
        }
        Ok(frame)
    }
}
