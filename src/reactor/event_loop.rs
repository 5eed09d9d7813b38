use std::os::unix::io::BorrowedFd;
use std::time::{Duration, Instant};

use anyhow::Context;
use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};

use crate::reactor::pollable::{PollError, Pollable};

/// Tuning for the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactorConfig {
    /// Upper bound on a single `poll(2)` wait, so deadlines are checked even
    /// when no socket is active.
    pub tick: Duration,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
        }
    }
}

/// Single-threaded readiness loop over a set of [`Pollable`]s.
///
/// Each call to [`turn`](Reactor::turn) polls every live pollable once,
/// resumes the ready ones, drops the expired ones and registers whatever the
/// resumed continuations scheduled.
pub struct Reactor {
    config: ReactorConfig,
    pollables: Vec<Box<dyn Pollable>>,
}

impl Reactor {
    pub fn new(config: ReactorConfig) -> Self {
        Self {
            config,
            pollables: Vec::new(),
        }
    }

    pub fn register(&mut self, pollable: Box<dyn Pollable>) {
        self.pollables.push(pollable);
    }

    pub fn len(&self) -> usize {
        self.pollables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pollables.is_empty()
    }

    /// Descriptors of the currently live pollables, in registration order.
    pub fn descriptors(&self) -> Vec<i32> {
        self.pollables.iter().map(|p| p.descriptor()).collect()
    }

    /// Runs until nothing is left to wait on.
    ///
    /// A server never empties its live set because the listener stays
    /// registered, so this only returns on a fatal error.
    pub fn run(&mut self) -> anyhow::Result<()> {
        while !self.is_empty() {
            self.turn()?;
        }
        Ok(())
    }

    /// One tick of the loop.
    pub fn turn(&mut self) -> anyhow::Result<()> {
        let current = std::mem::take(&mut self.pollables);
        let ready = self.wait(&current)?;

        let mut skipped = Vec::with_capacity(current.len());
        let now = Instant::now();

        for (mut pollable, revents) in current.into_iter().zip(ready) {
            if revents.is_empty() {
                if pollable.past_deadline(now) {
                    tracing::debug!(fd = pollable.descriptor(), "Dropping pollable past its deadline");
                } else {
                    skipped.push(pollable);
                }
                continue;
            }

            match pollable.resume(revents) {
                Ok(next) => {
                    if !pollable.is_done() {
                        self.register(pollable);
                    }
                    if let Some(next) = next {
                        self.register(next);
                    }
                }
                Err(PollError::Listener(err)) => {
                    tracing::error!(fd = pollable.descriptor(), error = %err, "Listener failed");
                    return Err(PollError::Listener(err)).context("accepting connections failed");
                }
                Err(PollError::Closed) => {
                    tracing::debug!(fd = pollable.descriptor(), "Peer closed connection");
                }
                Err(err) => {
                    tracing::warn!(fd = pollable.descriptor(), error = %err, "Abandoning pollable");
                }
            }
        }

        // Previously skipped pollables go first so they are not starved.
        skipped.append(&mut self.pollables);
        self.pollables = skipped;
        Ok(())
    }

    fn wait(&self, pollables: &[Box<dyn Pollable>]) -> anyhow::Result<Vec<PollFlags>> {
        let mut fds: Vec<PollFd<'_>> = pollables
            .iter()
            .map(|p| {
                // SAFETY: each pollable keeps its socket open for as long as it
                // is alive, and `pollables` outlives `fds`.
                let fd = unsafe { BorrowedFd::borrow_raw(p.descriptor()) };
                PollFd::new(fd, p.interest())
            })
            .collect();

        let timeout = PollTimeout::from(u16::try_from(self.config.tick.as_millis()).unwrap_or(u16::MAX));

        match poll(&mut fds, timeout) {
            Ok(_) => {}
            Err(Errno::EINTR) => return Ok(vec![PollFlags::empty(); pollables.len()]),
            Err(errno) => return Err(errno).context("poll() failed"),
        }

        Ok(fds
            .iter()
            .map(|fd| fd.revents().unwrap_or_else(PollFlags::empty))
            .collect())
    }
}
