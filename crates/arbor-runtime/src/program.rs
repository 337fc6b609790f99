#![forbid(unsafe_code)]

//! Elm-style model/update runtime.
//!
//! A [`Model`] owns state and turns messages into new state plus a [`Cmd`]
//! describing side effects. [`Program`] runs one model on the calling thread:
//!
//! ```text
//!   send(msg) ──► update ──► Cmd ──┬─ Msg ────────► update (inline)
//!                                  ├─ Task ───────► worker thread ─┐
//!                                  └─ After(d) ───► timer thread ──┤
//!                                                                  │
//!   pump() / run_until_idle() ◄──────── mpsc channel ◄─────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. `update` is only ever called on the thread that owns the `Program`.
//!    State changes happen in the order messages are taken off the channel.
//! 2. A task or timer result is applied exactly once.
//! 3. [`Program::pending`] counts spawned tasks and timers whose result has
//!    not been applied yet; a panicked task is reaped and no longer counted.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Task panics | Logged at `error`, dropped from `pending` |
//! | `run_until_idle` deadline passes | Returns `false`, remaining work keeps running |

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Application state plus its transition function.
pub trait Model: Sized {
    /// Messages this model reacts to.
    type Message: Send + 'static;

    /// Startup commands. Called once before any message.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Apply `msg` and return follow-up effects.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;
}

/// Metadata attached to a background task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSpec {
    /// Optional task name for logging.
    pub name: Option<String>,
}

impl TaskSpec {
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Side effects returned from [`Model::init`] and [`Model::update`].
#[derive(Default)]
pub enum Cmd<M> {
    /// No operation.
    #[default]
    None,
    /// Execute commands in order.
    Batch(Vec<Cmd<M>>),
    /// Execute commands in order.
    Sequence(Vec<Cmd<M>>),
    /// Feed a message straight back into `update`.
    Msg(M),
    /// Run a blocking closure off the model thread; its return value is
    /// delivered as a message.
    Task(TaskSpec, Box<dyn FnOnce() -> M + Send>),
    /// Deliver a message after a delay.
    After(Duration, M),
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Sequence(cmds) => f.debug_tuple("Sequence").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Task(spec, _) => f.debug_struct("Task").field("spec", spec).finish(),
            Self::After(d, m) => f.debug_tuple("After").field(d).field(m).finish(),
        }
    }
}

impl<M> Cmd<M> {
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    /// Combine commands. Empty collapses to `None`, a single command is
    /// returned as is.
    pub fn batch(mut cmds: Vec<Self>) -> Self {
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => Self::Batch(cmds),
        }
    }

    /// Like [`batch`](Self::batch), for commands whose order matters.
    pub fn sequence(mut cmds: Vec<Self>) -> Self {
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => Self::Sequence(cmds),
        }
    }

    /// Run `f` in the background and deliver its result.
    pub fn task<F>(f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(TaskSpec::default(), Box::new(f))
    }

    /// Like [`task`](Self::task), with a name for logging.
    pub fn task_named<F>(name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(TaskSpec::default().with_name(name), Box::new(f))
    }

    /// Deliver `m` once `delay` has passed.
    #[inline]
    pub fn after(delay: Duration, m: M) -> Self {
        Self::After(delay, m)
    }

    /// Stable name for tracing.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Batch(_) => "Batch",
            Self::Sequence(_) => "Sequence",
            Self::Msg(_) => "Msg",
            Self::Task(..) => "Task",
            Self::After(..) => "After",
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Program
// ─────────────────────────────────────────────────────────────────────────────

/// Threaded runner for a [`Model`].
pub struct Program<M: Model> {
    model: M,
    sender: Sender<M::Message>,
    receiver: Receiver<M::Message>,
    handles: Vec<JoinHandle<()>>,
    pending: usize,
}

impl<M: Model> Program<M> {
    /// Wrap `model`. Nothing runs until [`init`](Self::init) or
    /// [`send`](Self::send).
    pub fn new(model: M) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            model,
            sender,
            receiver,
            handles: Vec::new(),
            pending: 0,
        }
    }

    /// Run [`Model::init`] and execute what it returns.
    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.execute_cmd(cmd);
    }

    /// Apply `msg` now.
    pub fn send(&mut self, msg: M::Message) {
        self.apply(msg);
    }

    /// Apply every task or timer result that has already arrived. Never
    /// blocks. Returns how many messages were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(msg) = self.receiver.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            self.apply(msg);
            applied += 1;
        }
        self.reap_finished_tasks();
        applied
    }

    /// Block until no task or timer is outstanding, or `timeout` passes.
    ///
    /// Returns `true` when the program went idle.
    pub fn run_until_idle(&mut self, timeout: Duration) -> bool {
        const POLL: Duration = Duration::from_millis(10);
        let deadline = Instant::now() + timeout;
        loop {
            self.pump();
            if self.pending == 0 {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                tracing::debug!(pending = self.pending, "run_until_idle deadline reached");
                return false;
            }
            match self.receiver.recv_timeout((deadline - now).min(POLL)) {
                Ok(msg) => {
                    self.pending = self.pending.saturating_sub(1);
                    self.apply(msg);
                }
                Err(RecvTimeoutError::Timeout) => {}
                // The program holds a sender, so the channel cannot close.
                Err(RecvTimeoutError::Disconnected) => return self.pending == 0,
            }
        }
    }

    /// Tasks and timers whose result has not been applied yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Stop driving the model and hand it back. Outstanding results are
    /// discarded.
    pub fn into_model(self) -> M {
        self.model
    }

    fn apply(&mut self, msg: M::Message) {
        let cmd = {
            let _span = tracing::debug_span!("arbor.program.update").entered();
            self.model.update(msg)
        };
        self.execute_cmd(cmd);
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        tracing::trace!(cmd = cmd.type_name(), "execute");
        match cmd {
            Cmd::None => {}
            Cmd::Msg(m) => self.apply(m),
            Cmd::Batch(cmds) | Cmd::Sequence(cmds) => {
                for c in cmds {
                    self.execute_cmd(c);
                }
            }
            Cmd::Task(spec, f) => {
                let sender = self.sender.clone();
                let name = spec.name;
                let handle = std::thread::spawn(move || {
                    let _span = tracing::debug_span!("arbor.program.task", name = ?name).entered();
                    let msg = f();
                    let _ = sender.send(msg);
                });
                self.handles.push(handle);
                self.pending += 1;
            }
            Cmd::After(delay, m) => {
                let sender = self.sender.clone();
                let handle = std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    let _ = sender.send(m);
                });
                self.handles.push(handle);
                self.pending += 1;
            }
        }
    }

    fn reap_finished_tasks(&mut self) {
        if self.handles.is_empty() {
            return;
        }
        let mut remaining = Vec::with_capacity(self.handles.len());
        for handle in self.handles.drain(..) {
            if !handle.is_finished() {
                remaining.push(handle);
                continue;
            }
            if let Err(payload) = handle.join() {
                let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                    (*s).to_owned()
                } else if let Some(s) = payload.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic payload".to_owned()
                };
                tracing::error!("spawned task panicked: {msg}");
                self.pending = self.pending.saturating_sub(1);
            }
        }
        self.handles = remaining;
    }
}

impl<M: Model + std::fmt::Debug> std::fmt::Debug for Program<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program")
            .field("model", &self.model)
            .field("pending", &self.pending)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Counter {
        value: i64,
        log: Vec<&'static str>,
    }

    #[derive(Debug)]
    enum Msg {
        Add(i64),
        Label(&'static str),
        Spawn(i64),
        Delay(Duration, i64),
        Both,
    }

    impl Model for Counter {
        type Message = Msg;

        fn init(&mut self) -> Cmd<Msg> {
            Cmd::msg(Msg::Label("init"))
        }

        fn update(&mut self, msg: Msg) -> Cmd<Msg> {
            match msg {
                Msg::Add(n) => self.value += n,
                Msg::Label(l) => self.log.push(l),
                Msg::Spawn(n) => return Cmd::task_named("add", move || Msg::Add(n)),
                Msg::Delay(d, n) => return Cmd::after(d, Msg::Add(n)),
                Msg::Both => {
                    return Cmd::batch(vec![Cmd::msg(Msg::Label("a")), Cmd::msg(Msg::Label("b"))]);
                }
            }
            Cmd::none()
        }
    }

    #[test]
    fn batch_collapses() {
        assert!(Cmd::<Msg>::batch(vec![]).is_none());
        assert_eq!(Cmd::batch(vec![Cmd::msg(Msg::Add(1))]).type_name(), "Msg");
        assert_eq!(
            Cmd::sequence(vec![Cmd::<Msg>::none(), Cmd::none()]).type_name(),
            "Sequence"
        );
    }

    #[test]
    fn type_names() {
        assert_eq!(Cmd::task(|| Msg::Add(1)).type_name(), "Task");
        assert_eq!(Cmd::after(Duration::ZERO, Msg::Add(1)).type_name(), "After");
        assert_eq!(Cmd::<Msg>::default().type_name(), "None");
    }

    #[test]
    fn debug_hides_closure() {
        let cmd = Cmd::task_named("fetch", || Msg::Add(1));
        let s = format!("{cmd:?}");
        assert!(s.contains("Task"));
        assert!(s.contains("fetch"));
    }

    #[test]
    fn init_and_inline_messages() {
        let mut program = Program::new(Counter::default());
        program.init();
        program.send(Msg::Both);
        program.send(Msg::Add(2));
        assert_eq!(program.model().log, vec!["init", "a", "b"]);
        assert_eq!(program.model().value, 2);
        assert_eq!(program.pending(), 0);
    }

    #[test]
    fn task_result_is_applied_once() {
        let mut program = Program::new(Counter::default());
        program.send(Msg::Spawn(5));
        assert_eq!(program.pending(), 1);
        assert!(program.run_until_idle(Duration::from_secs(5)));
        assert_eq!(program.model().value, 5);
        assert_eq!(program.pump(), 0);
        assert_eq!(program.model().value, 5);
    }

    #[test]
    fn delayed_message_arrives() {
        let mut program = Program::new(Counter::default());
        program.send(Msg::Delay(Duration::from_millis(20), 3));
        assert_eq!(program.model().value, 0);
        assert!(program.run_until_idle(Duration::from_secs(5)));
        assert_eq!(program.model().value, 3);
    }

    #[test]
    fn deadline_reports_not_idle() {
        let mut program = Program::new(Counter::default());
        program.send(Msg::Delay(Duration::from_secs(30), 1));
        assert!(!program.run_until_idle(Duration::from_millis(20)));
        assert_eq!(program.pending(), 1);
        assert_eq!(program.into_model().value, 0);
    }
}
