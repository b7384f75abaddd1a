use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use flume::{Receiver, Sender};

use super::action::{ActionId, ActionKind, Cue, CueOscAction, FadeSpec, QueuedAction};
use super::job::{CancelToken, JobContext, JobOutcome, SendGate};
use super::pool::WorkerPool;
use super::queue::ActionQueue;
use crate::mapping::MappingError;
use crate::osc::{CompileError, MessageCompiler, MessageSink, SendError};

/// Upper bound on workers per pool
pub const MAX_SIMULTANEOUS_JOBS: usize = 511;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Workers per pool (commands and fades each get this many)
    pub max_simultaneous_jobs: usize,
    /// Default minimum time between two sends of one fade
    pub fade_step_interval: Duration,
    pub shutdown_timeout: Duration,
    pub queue_capacity: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_simultaneous_jobs: 16,
            fade_step_interval: Duration::from_millis(25),
            shutdown_timeout: Duration::from_millis(1000),
            queue_capacity: 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Idle,
    Running,
    Draining,
    Stopped,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("action queue is full ({0} actions)")]
    QueueFull(usize),

    #[error("dispatcher is {0:?} and not accepting actions")]
    NotAccepting(DispatcherState),

    #[error("dispatcher can only be started once (currently {0:?})")]
    NotIdle(DispatcherState),

    #[error("action {0} is already queued or running")]
    AlreadyQueued(ActionId),

    #[error("template {0} cannot fade")]
    FadeNotSupported(String),

    #[error("fade step interval must be greater than zero")]
    ZeroStepInterval,

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Send(#[from] SendError),

    #[error("failed to spawn dispatcher thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Progress of one action, delivered to every subscriber
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    Started(ActionId),
    Finished(ActionId),
    Cancelled(ActionId),
    Failed { id: ActionId, error: String },
}

impl DispatchEvent {
    pub fn id(&self) -> ActionId {
        match self {
            DispatchEvent::Started(id)
            | DispatchEvent::Finished(id)
            | DispatchEvent::Cancelled(id)
            | DispatchEvent::Failed { id, .. } => *id,
        }
    }
}

/// State shared by the dispatcher handle, the coordinator and the jobs
struct Shared {
    queue: ActionQueue<QueuedAction>,
    state: Mutex<DispatcherState>,
    /// Every action queued or running, with its stop flag
    jobs: Mutex<HashMap<ActionId, CancelToken>>,
    subscribers: Mutex<Vec<Sender<DispatchEvent>>>,
    ctx: JobContext,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, DispatcherState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn jobs(&self) -> MutexGuard<'_, HashMap<ActionId, CancelToken>> {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: DispatchEvent) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn run(&self, action: CueOscAction, token: CancelToken) {
        if token.is_cancelled() {
            self.finish(action.id, JobOutcome::Cancelled);
            return;
        }
        self.emit(DispatchEvent::Started(action.id));
        let outcome = match &action.kind {
            ActionKind::Command { arguments } => self.ctx.run_command(&action, arguments, &token),
            ActionKind::Fade(fade) => self.ctx.run_fade(&action, fade, &token),
        };
        self.finish(action.id, outcome);
    }

    /// Report an action's end once. Whoever removes the job entry reports it.
    fn finish(&self, id: ActionId, outcome: JobOutcome) {
        if self.jobs().remove(&id).is_none() {
            return;
        }
        let event = match outcome {
            JobOutcome::Finished => DispatchEvent::Finished(id),
            JobOutcome::Cancelled => {
                log::debug!("action {} cancelled", id);
                DispatchEvent::Cancelled(id)
            }
            JobOutcome::Failed(e) => {
                log::warn!("action {} failed: {}", id, e);
                DispatchEvent::Failed {
                    id,
                    error: e.to_string(),
                }
            }
        };
        self.emit(event);
    }
}

struct Pools {
    commands: Arc<WorkerPool>,
    fades: Arc<WorkerPool>,
}

/// Runs cue actions against one console.
///
/// Actions leave the queue in the order they were enqueued; one-shot
/// commands and fades then run on separate bounded pools, so completion
/// order across actions is not guaranteed. Single use: once shut down it
/// cannot be restarted.
pub struct CueDispatcher {
    shared: Arc<Shared>,
    config: DispatcherConfig,
    coordinator: Mutex<Option<JoinHandle<()>>>,
    pools: Mutex<Option<Pools>>,
}

impl CueDispatcher {
    pub fn new(sink: Arc<dyn MessageSink>, compiler: MessageCompiler, config: DispatcherConfig) -> Self {
        let mut config = config;
        let workers = config.max_simultaneous_jobs.clamp(1, MAX_SIMULTANEOUS_JOBS);
        if workers != config.max_simultaneous_jobs {
            log::warn!(
                "max_simultaneous_jobs {} out of range, using {}",
                config.max_simultaneous_jobs,
                workers
            );
            config.max_simultaneous_jobs = workers;
        }
        config.queue_capacity = config.queue_capacity.max(1);

        let shared = Shared {
            queue: ActionQueue::new(config.queue_capacity),
            state: Mutex::new(DispatcherState::Idle),
            jobs: Mutex::new(HashMap::new()),
            subscribers: Mutex::new(Vec::new()),
            ctx: JobContext {
                sink,
                compiler,
                gate: SendGate::new(),
                fade_step_interval: config.fade_step_interval,
            },
        };
        Self {
            shared: Arc::new(shared),
            config,
            coordinator: Mutex::new(None),
            pools: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn state(&self) -> DispatcherState {
        *self.shared.state()
    }

    /// Actions waiting for the coordinator
    pub fn pending(&self) -> usize {
        self.shared.queue.len()
    }

    /// Actions queued or running
    pub fn active(&self) -> usize {
        self.shared.jobs().len()
    }

    pub fn subscribe(&self) -> Receiver<DispatchEvent> {
        let (tx, rx) = flume::unbounded();
        self.shared
            .subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(tx);
        rx
    }

    /// Spawn the worker pools and the coordinator thread.
    pub fn start(&self) -> Result<(), DispatchError> {
        let mut state = self.shared.state();
        if *state != DispatcherState::Idle {
            return Err(DispatchError::NotIdle(*state));
        }

        let workers = self.config.max_simultaneous_jobs;
        let pools = Pools {
            commands: Arc::new(WorkerPool::new("mixcue-command", workers)?),
            fades: Arc::new(WorkerPool::new("mixcue-fade", workers)?),
        };

        let shared = Arc::clone(&self.shared);
        let commands = Arc::clone(&pools.commands);
        let fades = Arc::clone(&pools.fades);
        let handle = std::thread::Builder::new()
            .name("mixcue-dispatcher".into())
            .spawn(move || coordinate(shared, commands, fades))?;

        *self.coordinator.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
        *self.pools.lock().unwrap_or_else(|e| e.into_inner()) = Some(pools);
        *state = DispatcherState::Running;
        log::info!(
            "Cue dispatcher running with {} workers per pool, queue capacity {}",
            workers,
            self.config.queue_capacity
        );
        Ok(())
    }

    /// Queue an action without blocking. Fades are checked here so a bad
    /// fade never reaches a worker.
    pub fn enqueue(&self, action: CueOscAction) -> Result<ActionId, DispatchError> {
        if let ActionKind::Fade(fade) = &action.kind {
            self.validate_fade(&action, fade)?;
        }

        let state = self.shared.state();
        if matches!(*state, DispatcherState::Draining | DispatcherState::Stopped) {
            return Err(DispatchError::NotAccepting(*state));
        }

        let id = action.id;
        let token = CancelToken::new();
        {
            let mut jobs = self.shared.jobs();
            if jobs.contains_key(&id) {
                return Err(DispatchError::AlreadyQueued(id));
            }
            jobs.insert(id, token.clone());
        }
        if self
            .shared
            .queue
            .try_push(QueuedAction::Run(action, token))
            .is_err()
        {
            self.shared.jobs().remove(&id);
            log::warn!("Action queue full, rejecting {}", id);
            return Err(DispatchError::QueueFull(self.shared.queue.capacity()));
        }
        log::trace!("queued {}", id);
        Ok(id)
    }

    /// Queue every action of a cue in order. If any is refused, the ones
    /// already queued are stopped again.
    pub fn enqueue_cue(&self, cue: &Cue) -> Result<Vec<ActionId>, DispatchError> {
        for action in &cue.actions {
            if let ActionKind::Fade(fade) = &action.kind {
                self.validate_fade(action, fade)?;
            }
        }

        let mut queued = Vec::with_capacity(cue.actions.len());
        for action in &cue.actions {
            match self.enqueue(action.clone()) {
                Ok(id) => queued.push(id),
                Err(e) => {
                    for id in &queued {
                        self.stop_action(*id);
                    }
                    return Err(e);
                }
            }
        }
        log::debug!("cue '{}' queued {} actions", cue.name, queued.len());
        Ok(queued)
    }

    /// Cancel one queued or running action. False if it is unknown or done.
    pub fn stop_action(&self, id: ActionId) -> bool {
        match self.shared.jobs().get(&id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every action of a cue; returns how many were still live.
    pub fn stop_cue(&self, cue: &Cue) -> usize {
        cue.action_ids().filter(|id| self.stop_action(*id)).count()
    }

    /// Stop accepting work, cancel everything, close the send path and wait
    /// (up to the configured timeout) for the workers. No message is sent
    /// once this returns.
    pub fn shutdown(&self) {
        let previous = {
            let mut state = self.shared.state();
            let previous = *state;
            if matches!(previous, DispatcherState::Draining | DispatcherState::Stopped) {
                return;
            }
            *state = DispatcherState::Draining;
            previous
        };
        log::info!("Cue dispatcher shutting down");

        if previous == DispatcherState::Running {
            self.shared.queue.force_push(QueuedAction::Exit);
            let handle = self.coordinator.lock().unwrap_or_else(|e| e.into_inner()).take();
            if let Some(handle) = handle {
                if handle.join().is_err() {
                    log::warn!("Dispatcher coordinator panicked");
                }
            }
        }

        for token in self.shared.jobs().values() {
            token.cancel();
        }
        self.shared.ctx.gate.close();

        let deadline = Instant::now() + self.config.shutdown_timeout;
        let pools = self.pools.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(pools) = pools {
            pools.commands.shutdown(deadline);
            pools.fades.shutdown(deadline);
        }

        let dropped = self.shared.queue.drain().len();
        if dropped > 0 {
            log::debug!("dropped {} unstarted actions", dropped);
        }
        let leftover: Vec<ActionId> = self.shared.jobs().drain().map(|(id, _)| id).collect();
        for id in leftover {
            self.shared.emit(DispatchEvent::Cancelled(id));
        }

        *self.shared.state() = DispatcherState::Stopped;
        log::info!("Cue dispatcher stopped");
    }

    fn validate_fade(&self, action: &CueOscAction, fade: &FadeSpec) -> Result<(), DispatchError> {
        let interval = fade.min_step_interval.unwrap_or(self.config.fade_step_interval);
        if interval.is_zero() {
            return Err(DispatchError::ZeroStepInterval);
        }

        let template = &action.template;
        let unsupported = || DispatchError::FadeNotSupported(template.id.clone());
        let target = template.fade_target().ok_or_else(unsupported)?;
        let (min, max) = target.numeric_range().ok_or_else(unsupported)?;

        let compiler = &self.shared.ctx.compiler;
        compiler.fill_path(template, &action.path_values)?;
        for value in [&fade.start, &fade.end] {
            compiler.compile_arguments(template, std::slice::from_ref(value))?;
            let v = value.as_number().ok_or_else(unsupported)?;
            compiler
                .mapper()
                .percentage_from_value(min, max, v, target.param_type)?;
        }
        Ok(())
    }
}

impl Drop for CueDispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Coordinator loop: hand actions to the pools in queue order until the
/// exit marker arrives.
fn coordinate(shared: Arc<Shared>, commands: Arc<WorkerPool>, fades: Arc<WorkerPool>) {
    log::debug!("Coordinator started");
    loop {
        match shared.queue.pop() {
            QueuedAction::Exit => break,
            QueuedAction::Run(action, token) => {
                let id = action.id;
                let pool = if action.is_fade() { &fades } else { &commands };
                let job_shared = Arc::clone(&shared);
                if !pool.submit(Box::new(move || job_shared.run(action, token))) {
                    shared.finish(id, JobOutcome::Cancelled);
                }
            }
        }
    }
    log::debug!("Coordinator exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{TemplateRegistry, ValueStorer};
    use rosc::OscMessage;

    struct NullSink;

    impl MessageSink for NullSink {
        fn send(&self, _message: &OscMessage) -> Result<(), SendError> {
            Ok(())
        }
    }

    fn dispatcher(config: DispatcherConfig) -> CueDispatcher {
        CueDispatcher::new(Arc::new(NullSink), MessageCompiler::default(), config)
    }

    fn mute(registry: &TemplateRegistry) -> CueOscAction {
        CueOscAction::command(
            registry.get("CDYON").unwrap(),
            vec![ValueStorer::int(1)],
            vec![ValueStorer::int(0)],
        )
    }

    #[test]
    fn test_lifecycle() {
        let d = dispatcher(DispatcherConfig::default());
        assert_eq!(d.state(), DispatcherState::Idle);
        d.start().unwrap();
        assert_eq!(d.state(), DispatcherState::Running);
        assert!(matches!(d.start(), Err(DispatchError::NotIdle(DispatcherState::Running))));
        d.shutdown();
        assert_eq!(d.state(), DispatcherState::Stopped);
        assert!(matches!(d.start(), Err(DispatchError::NotIdle(DispatcherState::Stopped))));
        // Second shutdown is a no-op
        d.shutdown();
    }

    #[test]
    fn test_worker_count_is_clamped() {
        let d = dispatcher(DispatcherConfig {
            max_simultaneous_jobs: 0,
            ..DispatcherConfig::default()
        });
        assert_eq!(d.config().max_simultaneous_jobs, 1);
        let d = dispatcher(DispatcherConfig {
            max_simultaneous_jobs: 4096,
            ..DispatcherConfig::default()
        });
        assert_eq!(d.config().max_simultaneous_jobs, MAX_SIMULTANEOUS_JOBS);
    }

    #[test]
    fn test_queue_full_is_reported() {
        let registry = TemplateRegistry::x32().unwrap();
        let d = dispatcher(DispatcherConfig {
            queue_capacity: 2,
            ..DispatcherConfig::default()
        });
        d.enqueue(mute(&registry)).unwrap();
        d.enqueue(mute(&registry)).unwrap();
        assert!(matches!(d.enqueue(mute(&registry)), Err(DispatchError::QueueFull(2))));
        assert_eq!(d.pending(), 2);
        assert_eq!(d.active(), 2);
    }

    #[test]
    fn test_duplicate_action_rejected() {
        let registry = TemplateRegistry::x32().unwrap();
        let d = dispatcher(DispatcherConfig::default());
        let action = mute(&registry);
        d.enqueue(action.clone()).unwrap();
        assert!(matches!(d.enqueue(action), Err(DispatchError::AlreadyQueued(_))));
    }

    #[test]
    fn test_fades_validated_at_enqueue() {
        let registry = TemplateRegistry::x32().unwrap();
        let d = dispatcher(DispatcherConfig::default());

        let enum_fade = CueOscAction::fade(
            registry.get("CDYON").unwrap(),
            vec![ValueStorer::int(1)],
            FadeSpec::new(ValueStorer::int(0), ValueStorer::int(1), Duration::from_secs(1)),
        );
        assert!(matches!(d.enqueue(enum_fade), Err(DispatchError::FadeNotSupported(_))));

        let icon_fade = CueOscAction::fade(
            registry.get("CICON").unwrap(),
            vec![ValueStorer::int(1)],
            FadeSpec::new(ValueStorer::int(1), ValueStorer::int(9), Duration::from_secs(1)),
        );
        assert!(matches!(d.enqueue(icon_fade), Err(DispatchError::FadeNotSupported(_))));

        let wrong_type = CueOscAction::fade(
            registry.get("CFADR").unwrap(),
            vec![ValueStorer::int(1)],
            FadeSpec::new(ValueStorer::linf(-90.0), ValueStorer::linf(0.0), Duration::from_secs(1)),
        );
        assert!(matches!(
            d.enqueue(wrong_type),
            Err(DispatchError::Compile(CompileError::TypeMismatch { .. }))
        ));

        let bad_channel = CueOscAction::fade(
            registry.get("CFADR").unwrap(),
            vec![ValueStorer::int(40)],
            FadeSpec::new(
                ValueStorer::level_1024(-90.0),
                ValueStorer::level_1024(0.0),
                Duration::from_secs(1),
            ),
        );
        assert!(matches!(
            d.enqueue(bad_channel),
            Err(DispatchError::Compile(CompileError::ValueOutOfRange { .. }))
        ));

        let zero_interval = CueOscAction::fade(
            registry.get("CFADR").unwrap(),
            vec![ValueStorer::int(1)],
            FadeSpec::new(
                ValueStorer::level_1024(-90.0),
                ValueStorer::level_1024(0.0),
                Duration::from_secs(1),
            )
            .with_step_interval(Duration::ZERO),
        );
        assert!(matches!(d.enqueue(zero_interval), Err(DispatchError::ZeroStepInterval)));
        assert_eq!(d.pending(), 0);
    }

    #[test]
    fn test_shutdown_from_idle_cancels_queued() {
        let registry = TemplateRegistry::x32().unwrap();
        let d = dispatcher(DispatcherConfig::default());
        let events = d.subscribe();
        let id = d.enqueue(mute(&registry)).unwrap();

        d.shutdown();
        assert_eq!(d.state(), DispatcherState::Stopped);
        assert_eq!(events.try_recv(), Ok(DispatchEvent::Cancelled(id)));
        assert!(matches!(
            d.enqueue(mute(&registry)),
            Err(DispatchError::NotAccepting(DispatcherState::Stopped))
        ));
    }

    #[test]
    fn test_stop_unknown_action() {
        let d = dispatcher(DispatcherConfig::default());
        assert!(!d.stop_action(uuid::Uuid::new_v4()));
    }

    #[test]
    fn test_enqueue_cue_rolls_back_on_failure() {
        let registry = TemplateRegistry::x32().unwrap();
        let d = dispatcher(DispatcherConfig {
            queue_capacity: 2,
            ..DispatcherConfig::default()
        });
        let cue = Cue::new("Too big")
            .with_action(mute(&registry))
            .with_action(mute(&registry))
            .with_action(mute(&registry));
        assert!(matches!(d.enqueue_cue(&cue), Err(DispatchError::QueueFull(2))));

        let events = d.subscribe();
        d.start().unwrap();
        let mut cancelled = 0;
        while let Ok(event) = events.recv_timeout(Duration::from_secs(2)) {
            assert!(matches!(event, DispatchEvent::Cancelled(_)), "{:?}", event);
            cancelled += 1;
            if cancelled == 2 {
                break;
            }
        }
        assert_eq!(cancelled, 2);
    }
}
