use std::sync::{Arc, Condvar, Mutex, RwLock};
use std::time::{Duration, Instant};

use rosc::OscMessage;

use super::action::{CueOscAction, FadeSpec};
use super::dispatcher::DispatchError;
use crate::mapping::MappingError;
use crate::osc::{CompileError, MessageCompiler, MessageSink, SendError};
use crate::template::ValueStorer;

/// Cooperative stop flag a job checks between sends.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, wake) = &*self.inner;
        *flag.lock().unwrap_or_else(|e| e.into_inner()) = true;
        wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sleep up to `timeout`, returning early (true) if cancelled.
    pub fn wait(&self, timeout: Duration) -> bool {
        let (flag, wake) = &*self.inner;
        let guard = flag.lock().unwrap_or_else(|e| e.into_inner());
        let (guard, _) = wake
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(|e| e.into_inner());
        *guard
    }
}

/// Closed at shutdown; no send starts once closed.
///
/// Sends hold the read side, so closing waits for sends in flight.
#[derive(Debug)]
pub(crate) struct SendGate {
    open: RwLock<bool>,
}

impl SendGate {
    pub fn new() -> Self {
        Self {
            open: RwLock::new(true),
        }
    }

    /// Ok(false) when the gate is closed and nothing was sent
    pub fn send(&self, sink: &dyn MessageSink, message: &OscMessage) -> Result<bool, SendError> {
        let open = self.open.read().unwrap_or_else(|e| e.into_inner());
        if !*open {
            return Ok(false);
        }
        sink.send(message)?;
        Ok(true)
    }

    pub fn close(&self) {
        *self.open.write().unwrap_or_else(|e| e.into_inner()) = false;
    }
}

#[derive(Debug)]
pub(crate) enum JobOutcome {
    Finished,
    Cancelled,
    Failed(DispatchError),
}

impl From<DispatchError> for JobOutcome {
    fn from(e: DispatchError) -> Self {
        JobOutcome::Failed(e)
    }
}

impl From<CompileError> for JobOutcome {
    fn from(e: CompileError) -> Self {
        JobOutcome::Failed(e.into())
    }
}

impl From<MappingError> for JobOutcome {
    fn from(e: MappingError) -> Self {
        JobOutcome::Failed(e.into())
    }
}

impl From<SendError> for JobOutcome {
    fn from(e: SendError) -> Self {
        JobOutcome::Failed(e.into())
    }
}

/// What every job needs, shared by the dispatcher's pools
pub(crate) struct JobContext {
    pub sink: Arc<dyn MessageSink>,
    pub compiler: MessageCompiler,
    pub gate: SendGate,
    pub fade_step_interval: Duration,
}

impl JobContext {
    /// Compile and send one message with the given argument values
    fn send(&self, action: &CueOscAction, arguments: &[ValueStorer]) -> Result<bool, JobOutcome> {
        let message = self
            .compiler
            .compile(&action.template, &action.path_values, arguments)?;
        Ok(self.gate.send(self.sink.as_ref(), &message)?)
    }

    pub fn run_command(
        &self,
        action: &CueOscAction,
        arguments: &[ValueStorer],
        token: &CancelToken,
    ) -> JobOutcome {
        if token.is_cancelled() {
            return JobOutcome::Cancelled;
        }
        match self.send(action, arguments) {
            Ok(true) => JobOutcome::Finished,
            Ok(false) => JobOutcome::Cancelled,
            Err(outcome) => outcome,
        }
    }

    pub fn run_fade(&self, action: &CueOscAction, fade: &FadeSpec, token: &CancelToken) -> JobOutcome {
        match self.fade_steps(action, fade, token) {
            Ok(outcome) => outcome,
            Err(outcome) => outcome,
        }
    }

    fn fade_steps(
        &self,
        action: &CueOscAction,
        fade: &FadeSpec,
        token: &CancelToken,
    ) -> Result<JobOutcome, JobOutcome> {
        let template = &action.template;
        let target = template
            .fade_target()
            .ok_or_else(|| DispatchError::FadeNotSupported(template.id.clone()))?;
        let (min, max) = target
            .numeric_range()
            .ok_or_else(|| DispatchError::FadeNotSupported(template.id.clone()))?;
        let param_type = target.param_type;
        let mapper = self.compiler.mapper();

        let position = |value: &ValueStorer| -> Result<f64, JobOutcome> {
            let v = value
                .as_number()
                .ok_or_else(|| DispatchError::FadeNotSupported(template.id.clone()))?;
            Ok(mapper.percentage_from_value(min, max, v, param_type)?)
        };
        let start = position(&fade.start)?;
        let end = position(&fade.end)?;

        let interval = fade.min_step_interval.unwrap_or(self.fade_step_interval);
        let steps = fade.step_count(interval);
        log::debug!(
            "fade {} on {}: {:.3} -> {:.3} in {} steps",
            action.id,
            template.id,
            start,
            end,
            steps
        );

        for step in 1..=steps {
            if token.is_cancelled() {
                return Ok(JobOutcome::Cancelled);
            }
            let step_began = Instant::now();

            let value = if step == steps {
                fade.end.clone()
            } else {
                let pct = start + (end - start) * step as f64 / steps as f64;
                let v = mapper.value_from_percentage(min, max, pct, param_type)?;
                ValueStorer::from_number(param_type, v)
                    .ok_or_else(|| DispatchError::FadeNotSupported(template.id.clone()))?
            };

            if !self.send(action, &[value])? {
                return Ok(JobOutcome::Cancelled);
            }

            if step < steps {
                let elapsed = step_began.elapsed();
                if elapsed >= interval {
                    log::debug!("fade {} step {} overran {:?}", action.id, step, interval);
                } else if token.wait(interval - elapsed) {
                    return Ok(JobOutcome::Cancelled);
                }
            }
        }
        Ok(JobOutcome::Finished)
    }
}
