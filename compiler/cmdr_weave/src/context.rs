//! Weave context: the state of one pass.

use cmdr_diagnostic::{Diagnostic, DiagnosticQueue, ErrorGuaranteed};
use cmdr_ir::Module;

use crate::assets::Assets;
use crate::registry::CommandRegistry;
use crate::{WeaveConfig, WeaveError};

/// Everything a weave phase needs besides the module itself.
///
/// Built at the start of [`weave`](crate::weave) and dropped at its end;
/// nothing outlives the pass.
pub struct WeaveContext<'cfg> {
    pub config: &'cfg WeaveConfig,
    pub assets: Assets,
    pub registry: CommandRegistry,
    pub queue: DiagnosticQueue,
}

impl<'cfg> WeaveContext<'cfg> {
    pub fn new(module: &Module, config: &'cfg WeaveConfig) -> Self {
        WeaveContext {
            config,
            assets: Assets::new(module, config),
            registry: CommandRegistry::new(),
            queue: DiagnosticQueue::new(),
        }
    }

    /// Report a per-command failure as an error diagnostic.
    pub fn report(&mut self, err: &WeaveError, location: impl Into<String>) -> ErrorGuaranteed {
        self.queue.emit_error(err.to_diagnostic(location))
    }

    pub fn warn(&mut self, diag: Diagnostic) {
        self.queue.add(diag);
    }
}
