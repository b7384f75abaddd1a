use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::job::CancelToken;
use crate::template::{CommandTemplate, ValueStorer};

pub type ActionId = Uuid;

/// A fade from `start` to `end` over `duration`.
#[derive(Debug, Clone, PartialEq)]
pub struct FadeSpec {
    pub start: ValueStorer,
    pub end: ValueStorer,
    pub duration: Duration,
    /// Minimum time between two sends. `None` uses the dispatcher's setting.
    pub min_step_interval: Option<Duration>,
}

impl FadeSpec {
    pub fn new(start: ValueStorer, end: ValueStorer, duration: Duration) -> Self {
        Self {
            start,
            end,
            duration,
            min_step_interval: None,
        }
    }

    pub fn with_step_interval(mut self, interval: Duration) -> Self {
        self.min_step_interval = Some(interval);
        self
    }

    /// `ceil(duration / interval)`, never less than one
    pub fn step_count(&self, interval: Duration) -> u32 {
        let interval = interval.as_nanos();
        if interval == 0 {
            return 1;
        }
        let steps = self.duration.as_nanos().div_ceil(interval);
        u32::try_from(steps).unwrap_or(u32::MAX).max(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    /// Send once with these argument values
    Command { arguments: Vec<ValueStorer> },
    Fade(FadeSpec),
}

/// One scheduled unit of work against one template
#[derive(Debug, Clone, PartialEq)]
pub struct CueOscAction {
    pub id: ActionId,
    pub template: Arc<CommandTemplate>,
    pub path_values: Vec<ValueStorer>,
    pub kind: ActionKind,
}

impl CueOscAction {
    pub fn command(
        template: Arc<CommandTemplate>,
        path_values: Vec<ValueStorer>,
        arguments: Vec<ValueStorer>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            template,
            path_values,
            kind: ActionKind::Command { arguments },
        }
    }

    pub fn fade(template: Arc<CommandTemplate>, path_values: Vec<ValueStorer>, fade: FadeSpec) -> Self {
        Self {
            id: Uuid::new_v4(),
            template,
            path_values,
            kind: ActionKind::Fade(fade),
        }
    }

    pub fn is_fade(&self) -> bool {
        matches!(self.kind, ActionKind::Fade(_))
    }
}

/// A named group of actions fired and stopped together
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub id: Uuid,
    pub name: String,
    pub actions: Vec<CueOscAction>,
}

impl Cue {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            actions: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: CueOscAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn push(&mut self, action: CueOscAction) {
        self.actions.push(action);
    }

    pub fn action_ids(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.actions.iter().map(|a| a.id)
    }
}

/// What travels through the dispatcher queue
pub(crate) enum QueuedAction {
    Run(CueOscAction, CancelToken),
    /// Stop the coordinator once everything ahead of it is handed out
    Exit,
}
