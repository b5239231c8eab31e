//! Interrupt handling: SIGINT/SIGTERM confirmation prompt
//!
//! The signal handler only forwards a [`ControlEvent`] over a channel. A
//! dedicated control thread owns the terminal prompt: it pauses the run's
//! [`CancelToken`], asks whether to exit, and then either resumes or cancels.
//! Unreadable answers (EOF, I/O errors, non-numeric input) count as "exit".

use crate::cancel::CancelToken;
use crate::error::Result;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

/// Events delivered to the control thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// SIGINT or SIGTERM arrived
    Signal,
    /// The run finished; the control thread should exit
    Shutdown,
}

/// Answer to the exit prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Exit,
    Resume,
}

/// How the control thread ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// Shut down normally after the run
    Completed,
    /// The user (or the fail-safe) chose to abort
    Aborted,
}

/// Install the process-wide SIGINT/SIGTERM handler
///
/// Must be called once, before any dataset resource is opened.
pub fn install_signal_handler(events: Sender<ControlEvent>) -> Result<()> {
    ctrlc::set_handler(move || {
        let _ = events.send(ControlEvent::Signal);
    })?;
    Ok(())
}

/// Ask on `output` whether to exit and read the answer from `input`
///
/// Accepts a single integer token: `1` exits, `0` resumes, any other integer
/// repeats the question. EOF, read errors and non-numeric tokens exit.
pub fn confirm_exit<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Decision {
    let _ = write!(
        output,
        "Signal caught. Do you want to exit the program? [1: Yes, 0: No]: "
    );
    let _ = output.flush();

    let mut line = String::new();
    loop {
        line.clear();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => return unreadable(output),
            Ok(_) => {}
        }

        let Some(token) = line.split_whitespace().next() else {
            // Blank line; keep waiting for a token.
            continue;
        };
        match token.parse::<i64>() {
            Ok(1) => return Decision::Exit,
            Ok(0) => return Decision::Resume,
            Ok(_) => {
                let _ = write!(output, "[1: Yes, 0: No]: ");
                let _ = output.flush();
            }
            Err(_) => return unreadable(output),
        }
    }
}

fn unreadable<W: Write>(output: &mut W) -> Decision {
    let _ = writeln!(output, "\nError reading the answer. Exiting the program...");
    let _ = output.flush();
    Decision::Exit
}

/// Owner of the confirmation prompt
pub struct InterruptController<R, W> {
    events: Receiver<ControlEvent>,
    token: CancelToken,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> InterruptController<R, W> {
    pub fn new(events: Receiver<ControlEvent>, token: CancelToken, input: R, output: W) -> Self {
        Self {
            events,
            token,
            input,
            output,
        }
    }

    /// Serve signals until shutdown, an abort, or every sender is dropped
    pub fn run(mut self) -> ControlOutcome {
        while let Ok(event) = self.events.recv() {
            match event {
                ControlEvent::Shutdown => break,
                ControlEvent::Signal => {
                    if !self.token.pause() {
                        return ControlOutcome::Aborted;
                    }
                    warn!("interrupt received, awaiting confirmation");
                    match confirm_exit(&mut self.input, &mut self.output) {
                        Decision::Exit => {
                            info!("exit confirmed, cancelling run");
                            self.token.cancel();
                            return ControlOutcome::Aborted;
                        }
                        Decision::Resume => {
                            info!("resuming run");
                            self.token.resume();
                        }
                    }
                }
            }
        }
        ControlOutcome::Completed
    }
}

impl<R, W> InterruptController<R, W>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    /// Run the controller on its own thread
    pub fn spawn(self) -> io::Result<JoinHandle<ControlOutcome>> {
        thread::Builder::new()
            .name("interrupt".into())
            .spawn(move || self.run())
    }
}
