#![forbid(unsafe_code)]

//! Deterministic program simulator for testing.
//!
//! `ProgramSimulator` runs a [`Model`] without threads or wall-clock time.
//! Tasks execute inline the moment they are returned. Delayed messages are
//! parked on a virtual clock and only fire when the test calls
//! [`advance`](ProgramSimulator::advance).
//!
//! # Example
//!
//! ```ignore
//! use arbor_runtime::simulator::ProgramSimulator;
//!
//! let mut sim = ProgramSimulator::new(store);
//! sim.send(TreeMsg::FetchLeaf("n1".into()));
//! sim.advance(Duration::from_secs(3));
//! assert!(sim.model().leaf_error().is_none());
//! ```

use crate::program::{Cmd, Model};
use std::time::Duration;

/// Record of a command that was executed during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    None,
    /// Message fed back into the model (not stored, just noted).
    Msg,
    Batch(usize),
    Sequence(usize),
    /// Background task executed synchronously.
    Task(Option<String>),
    /// Delayed message scheduled.
    After(Duration),
    /// Delayed message delivered by [`ProgramSimulator::advance`].
    Fired,
}

struct Timer<M> {
    due: Duration,
    seq: u64,
    msg: M,
}

/// Deterministic simulator for [`Model`] testing.
pub struct ProgramSimulator<M: Model> {
    model: M,
    command_log: Vec<CmdRecord>,
    now: Duration,
    timers: Vec<Timer<M::Message>>,
    timer_seq: u64,
}

impl<M: Model> ProgramSimulator<M> {
    /// Create a simulator. The model is not initialized until
    /// [`init`](Self::init) is called.
    pub fn new(model: M) -> Self {
        Self {
            model,
            command_log: Vec::new(),
            now: Duration::ZERO,
            timers: Vec::new(),
            timer_seq: 0,
        }
    }

    /// Call [`Model::init`] and execute the returned commands.
    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.execute_cmd(cmd);
    }

    /// Dispatch `msg` through `update` and execute what it returns.
    pub fn send(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.execute_cmd(cmd);
    }

    /// Send several messages in order.
    pub fn send_all(&mut self, msgs: impl IntoIterator<Item = M::Message>) {
        for msg in msgs {
            self.send(msg);
        }
    }

    /// Move the virtual clock forward by `by`, delivering every delayed
    /// message that falls due on the way, earliest first. Messages
    /// scheduled while advancing fire in the same call if they fall due
    /// before the new time.
    pub fn advance(&mut self, by: Duration) {
        let target = self.now + by;
        while let Some(index) = self.next_due(target) {
            let timer = self.timers.swap_remove(index);
            self.now = timer.due;
            self.command_log.push(CmdRecord::Fired);
            self.send(timer.msg);
        }
        self.now = target;
    }

    /// Current virtual time since the simulator was created.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Delayed messages not yet delivered.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    pub fn clear_command_log(&mut self) {
        self.command_log.clear();
    }

    /// Number of tasks executed so far.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.command_log
            .iter()
            .filter(|r| matches!(r, CmdRecord::Task(_)))
            .count()
    }

    fn next_due(&self, target: Duration) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= target)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {
                self.command_log.push(CmdRecord::None);
            }
            Cmd::Msg(m) => {
                self.command_log.push(CmdRecord::Msg);
                self.send(m);
            }
            Cmd::Batch(cmds) => {
                self.command_log.push(CmdRecord::Batch(cmds.len()));
                for c in cmds {
                    self.execute_cmd(c);
                }
            }
            Cmd::Sequence(cmds) => {
                self.command_log.push(CmdRecord::Sequence(cmds.len()));
                for c in cmds {
                    self.execute_cmd(c);
                }
            }
            Cmd::Task(spec, f) => {
                self.command_log.push(CmdRecord::Task(spec.name));
                let msg = f();
                self.send(msg);
            }
            Cmd::After(delay, msg) => {
                self.command_log.push(CmdRecord::After(delay));
                self.timer_seq += 1;
                self.timers.push(Timer {
                    due: self.now + delay,
                    seq: self.timer_seq,
                    msg,
                });
            }
        }
    }
}

impl<M: Model + std::fmt::Debug> std::fmt::Debug for ProgramSimulator<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramSimulator")
            .field("model", &self.model)
            .field("now", &self.now)
            .field("pending_timers", &self.timers.len())
            .finish()
    }
}
