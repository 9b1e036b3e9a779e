//! # Wizard
//!
//! The four linear phases of the outreach flow:
//!
//! ```text
//! Description ──► File ──► Process ──► Emails
//!  (profile)     (upload)  (filter)    (drafts, repeatable)
//! ```
//!
//! Each phase has one trigger. A trigger goes `Ready → InFlight` when its
//! request is spawned, and leaves `InFlight` only through `succeed` or
//! `fail`. The step advances only on success and never moves backwards.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Description,
    File,
    Process,
    Emails,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Description,
        WizardStep::File,
        WizardStep::Process,
        WizardStep::Emails,
    ];

    /// The step a success moves to. `Emails` is terminal.
    pub fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::Description => Some(WizardStep::File),
            WizardStep::File => Some(WizardStep::Process),
            WizardStep::Process => Some(WizardStep::Emails),
            WizardStep::Emails => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            WizardStep::Description => "Company",
            WizardStep::File => "Invitees",
            WizardStep::Process => "Process",
            WizardStep::Emails => "Emails",
        }
    }
}

/// What happens to a trigger when its request fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// The trigger stays disabled for the rest of the session.
    Lockout,
    /// The trigger can be used again.
    #[default]
    Reenable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Ready,
    InFlight,
    Locked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardError {
    /// The request belongs to a step that is not the current one.
    WrongStep {
        current: WizardStep,
        requested: WizardStep,
    },
    /// A request for this step is already running.
    InFlight,
    /// An earlier failure disabled the trigger.
    Locked,
    /// A completion arrived with no request in flight.
    NotInFlight,
}

impl fmt::Display for WizardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardError::WrongStep { current, requested } => write!(
                f,
                "step {} is not active (current: {})",
                requested.label(),
                current.label()
            ),
            WizardError::InFlight => write!(f, "request already in progress"),
            WizardError::Locked => write!(f, "disabled after a failed request"),
            WizardError::NotInFlight => write!(f, "no request in progress"),
        }
    }
}

impl std::error::Error for WizardError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wizard {
    step: WizardStep,
    trigger: Trigger,
    policy: FailurePolicy,
}

impl Wizard {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            step: WizardStep::Description,
            trigger: Trigger::Ready,
            policy,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn is_busy(&self) -> bool {
        self.trigger == Trigger::InFlight
    }

    /// Whether the current step's trigger can fire.
    pub fn can_begin(&self) -> bool {
        self.trigger == Trigger::Ready
    }

    pub fn begin(&mut self, step: WizardStep) -> Result<(), WizardError> {
        self.check_step(step)?;
        match self.trigger {
            Trigger::Ready => {
                self.trigger = Trigger::InFlight;
                Ok(())
            }
            Trigger::InFlight => Err(WizardError::InFlight),
            Trigger::Locked => Err(WizardError::Locked),
        }
    }

    /// Completes the in-flight request and returns the (possibly new) step.
    pub fn succeed(&mut self, step: WizardStep) -> Result<WizardStep, WizardError> {
        self.check_in_flight(step)?;
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        self.trigger = Trigger::Ready;
        Ok(self.step)
    }

    /// Fails the in-flight request. The step never changes.
    pub fn fail(&mut self, step: WizardStep) -> Result<Trigger, WizardError> {
        self.check_in_flight(step)?;
        self.trigger = match self.policy {
            FailurePolicy::Lockout => Trigger::Locked,
            FailurePolicy::Reenable => Trigger::Ready,
        };
        Ok(self.trigger)
    }

    fn check_step(&self, requested: WizardStep) -> Result<(), WizardError> {
        if requested == self.step {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                current: self.step,
                requested,
            })
        }
    }

    fn check_in_flight(&self, step: WizardStep) -> Result<(), WizardError> {
        self.check_step(step)?;
        if self.trigger == Trigger::InFlight {
            Ok(())
        } else {
            Err(WizardError::NotInFlight)
        }
    }
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new(FailurePolicy::default())
    }
}
