//! `MachineBuilder` for configuring a [`Machine`].

use super::Machine;
use crate::print_handler::{stdout_handler, SharedPrintHandler};

/// Runtime limits and sizing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MachineConfig {
    /// Abort a run after this many steps. `None` runs without limit.
    pub max_steps: Option<u64>,
    /// Initial value-stack capacity of a freshly allocated frame.
    pub stack_capacity: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            max_steps: None,
            stack_capacity: 16,
        }
    }
}

/// Builder for [`Machine`].
///
/// Defaults: output to stdout, no step limit.
#[derive(Default)]
pub struct MachineBuilder {
    config: MachineConfig,
    print_handler: Option<SharedPrintHandler>,
}

impl MachineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `p`, `str_p` and the `p_*` dumps through `handler`.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    #[must_use]
    pub fn max_steps(mut self, limit: u64) -> Self {
        self.config.max_steps = Some(limit);
        self
    }

    #[must_use]
    pub fn stack_capacity(mut self, capacity: usize) -> Self {
        self.config.stack_capacity = capacity;
        self
    }

    #[must_use]
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Machine {
        let print = self.print_handler.unwrap_or_else(stdout_handler);
        Machine::from_parts(self.config, print)
    }
}
