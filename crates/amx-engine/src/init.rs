//! Machine initialization with library installation
//!
//! An [`Initializer`] runs the base machine initializer and then every
//! library installer it was built with, in order. Each stage's status is
//! collected into an [`InitReport`]; an [`InitPolicy`] decides which status
//! the caller finally sees.
//!
//! A failing machine stage stops the sequence: no installer runs on a
//! machine that did not initialize. Installer failures never stop it.

use crate::amx::Amx;
use amx_sdk::{status_code, AmxError, AmxResult, NativeLibrary};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

// ============================================================================
// Seams
// ============================================================================

/// Prepares a machine for a program image
pub trait MachineInitializer {
    /// Initialize `amx` from `program`
    fn init_machine(&self, amx: &mut Amx, program: &[u8]) -> AmxResult<()>;
}

/// The machine's own initializer, [`Amx::init`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseInitializer;

impl MachineInitializer for BaseInitializer {
    fn init_machine(&self, amx: &mut Amx, program: &[u8]) -> AmxResult<()> {
        amx.init(program)
    }
}

/// Installs one library of natives into an initialized machine
pub trait LibraryInstaller {
    /// Library name, used in reports
    fn name(&self) -> &str;

    /// Install the library; returns the registration status
    fn install(&self, amx: &mut Amx) -> AmxResult<()>;
}

impl LibraryInstaller for NativeLibrary {
    fn name(&self) -> &str {
        NativeLibrary::name(self)
    }

    fn install(&self, amx: &mut Amx) -> AmxResult<()> {
        amx.register(self.registry())
    }
}

// ============================================================================
// Report
// ============================================================================

/// One step of initialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Stage {
    /// The base machine initializer
    Machine,
    /// Installation of the named library
    Library(String),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Machine => write!(f, "machine"),
            Stage::Library(name) => write!(f, "library {}", name),
        }
    }
}

/// Status of one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageOutcome {
    /// Which stage ran
    pub stage: Stage,
    /// What it returned
    pub status: AmxResult<()>,
}

impl StageOutcome {
    /// Numeric status, 0 for success
    pub fn code(&self) -> i32 {
        status_code(&self.status)
    }
}

/// Ordered record of every stage that ran
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitReport {
    outcomes: Vec<StageOutcome>,
    natives_bound: bool,
}

impl InitReport {
    /// Stage outcomes in execution order
    pub fn outcomes(&self) -> &[StageOutcome] {
        &self.outcomes
    }

    /// Status of the base machine initializer
    pub fn machine_status(&self) -> AmxResult<()> {
        self.outcomes
            .iter()
            .find(|o| o.stage == Stage::Machine)
            .map_or(Err(AmxError::InitFailure), |o| o.status)
    }

    /// Library stages that failed, in order
    pub fn library_failures(&self) -> Vec<(&str, AmxError)> {
        self.outcomes
            .iter()
            .filter_map(|o| match (&o.stage, o.status) {
                (Stage::Library(name), Err(err)) => Some((name.as_str(), err)),
                _ => None,
            })
            .collect()
    }

    /// Whether every native of the program had a handler after the last stage
    pub fn all_natives_bound(&self) -> bool {
        self.natives_bound
    }

    /// Aggregate status under `policy`
    pub fn outcome(&self, policy: InitPolicy) -> AmxResult<()> {
        self.machine_status()?;
        match policy {
            InitPolicy::IgnoreLibraryFailures => Ok(()),
            InitPolicy::FailOnLibraryError => match self.library_failures().first() {
                Some((_, err)) => Err(*err),
                None => Ok(()),
            },
            InitPolicy::RequireAllNativesBound => {
                if self.natives_bound {
                    Ok(())
                } else {
                    Err(AmxError::FunctionNotFound)
                }
            }
        }
    }
}

/// How library failures affect the aggregate status
///
/// A library reports `FunctionNotFound` whenever the program still has
/// natives that only a later library provides, so `FailOnLibraryError`
/// also fails for programs that use more than one library.
/// `RequireAllNativesBound` checks the state after all libraries ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitPolicy {
    /// Only the machine status counts
    #[default]
    IgnoreLibraryFailures,
    /// The first failing library's status is returned
    FailOnLibraryError,
    /// Fails with `FunctionNotFound` if any native stays unbound
    RequireAllNativesBound,
}

// ============================================================================
// Initializer
// ============================================================================

/// Base initializer followed by a list of library installers
pub struct Initializer {
    machine: Box<dyn MachineInitializer + Send + Sync>,
    libraries: Vec<Box<dyn LibraryInstaller + Send + Sync>>,
    policy: InitPolicy,
}

impl fmt::Debug for Initializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Initializer")
            .field("libraries", &self.library_names())
            .field("policy", &self.policy)
            .finish()
    }
}

impl Initializer {
    /// Create an initializer with no libraries
    pub fn new(machine: impl MachineInitializer + Send + Sync + 'static) -> Self {
        Self {
            machine: Box::new(machine),
            libraries: Vec::new(),
            policy: InitPolicy::default(),
        }
    }

    /// Append a library; libraries are installed in the order added
    pub fn with_library(mut self, library: impl LibraryInstaller + Send + Sync + 'static) -> Self {
        self.libraries.push(Box::new(library));
        self
    }

    /// Set the policy [`initialize`](Self::initialize) applies
    pub fn with_policy(mut self, policy: InitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Configured policy
    pub fn policy(&self) -> InitPolicy {
        self.policy
    }

    /// Names of the configured libraries, in install order
    pub fn library_names(&self) -> Vec<&str> {
        self.libraries.iter().map(|l| l.name()).collect()
    }

    /// Run every stage and report each status
    pub fn run(&self, amx: &mut Amx, program: &[u8]) -> InitReport {
        let mut outcomes = Vec::with_capacity(self.libraries.len() + 1);

        let status = self.machine.init_machine(amx, program);
        debug!(status = status_code(&status), "machine stage");
        outcomes.push(StageOutcome {
            stage: Stage::Machine,
            status,
        });
        if status.is_err() {
            return InitReport {
                outcomes,
                natives_bound: false,
            };
        }

        for library in &self.libraries {
            let status = library.install(amx);
            debug!(library = library.name(), status = status_code(&status), "library stage");
            outcomes.push(StageOutcome {
                stage: Stage::Library(library.name().to_string()),
                status,
            });
        }

        InitReport {
            outcomes,
            natives_bound: amx.unbound_natives().is_empty(),
        }
    }

    /// Run every stage and apply the configured policy
    pub fn initialize(&self, amx: &mut Amx, program: &[u8]) -> AmxResult<()> {
        let report = self.run(amx, program);
        if self.policy == InitPolicy::IgnoreLibraryFailures {
            // a library misses natives a later one provides; only the final table matters
            for (name, err) in report.library_failures() {
                debug!(library = name, error = %err, "library registration failed, ignored");
            }
            if report.machine_status().is_ok() && !report.all_natives_bound() {
                warn!(
                    unbound = ?amx.unbound_natives(),
                    "natives left unbound after installing libraries"
                );
            }
        }
        report.outcome(self.policy)
    }
}
