//! Pausable cancellation shared by the generator, the workers and the
//! interrupt controller.
//!
//! Long-running loops call [`CancelToken::checkpoint`] at safe points. While
//! the token is paused the call blocks, so nothing makes progress during the
//! interrupt prompt; once cancelled it returns [`Error::Aborted`].

use crate::error::{Error, Result};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Running,
    Paused,
    Cancelled,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<RunState>,
    changed: Condvar,
}

/// Cloneable handle to one run's cancellation state
#[derive(Debug, Clone)]
pub struct CancelToken {
    shared: Arc<Shared>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(RunState::Running),
                changed: Condvar::new(),
            }),
        }
    }

    // State is a plain enum, so a poisoned lock still holds a valid value.
    fn state(&self) -> MutexGuard<'_, RunState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, next: RunState) -> bool {
        let mut state = self.state();
        if *state == RunState::Cancelled {
            return false;
        }
        *state = next;
        self.shared.changed.notify_all();
        true
    }

    /// Hold every checkpoint until [`resume`](Self::resume) or
    /// [`cancel`](Self::cancel). Returns `false` if already cancelled.
    pub fn pause(&self) -> bool {
        self.transition(RunState::Paused)
    }

    /// Release paused checkpoints. Has no effect once cancelled.
    pub fn resume(&self) -> bool {
        self.transition(RunState::Running)
    }

    /// Cancel the run; every current and future checkpoint fails.
    pub fn cancel(&self) {
        let mut state = self.state();
        *state = RunState::Cancelled;
        self.shared.changed.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.state() == RunState::Cancelled
    }

    /// Safe point: blocks while paused, fails once cancelled
    pub fn checkpoint(&self) -> Result<()> {
        let state = self
            .shared
            .changed
            .wait_while(self.state(), |state| *state == RunState::Paused)
            .unwrap_or_else(PoisonError::into_inner);
        match *state {
            RunState::Cancelled => Err(Error::Aborted),
            _ => Ok(()),
        }
    }

    /// Sleep for `duration`, honouring pause and cancellation
    ///
    /// Time spent paused does not count towards the duration.
    pub fn sleep(&self, duration: Duration) -> Result<()> {
        let mut remaining = duration;
        loop {
            self.checkpoint()?;
            if remaining.is_zero() {
                return Ok(());
            }
            let started = Instant::now();
            let (state, _) = self
                .shared
                .changed
                .wait_timeout_while(self.state(), remaining, |state| *state == RunState::Running)
                .unwrap_or_else(PoisonError::into_inner);
            let running = *state == RunState::Running;
            drop(state);
            remaining = remaining.saturating_sub(started.elapsed());
            if running {
                // Timed out without a state change.
                remaining = Duration::ZERO;
            }
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
