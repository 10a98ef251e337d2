//! Command weaver.
//!
//! Turns methods tagged with command marker attributes into command
//! properties backed by a command implementation, initialized from every
//! constructor of the declaring type.
//!
//! # Pipeline
//!
//! ```text
//! scan markers ──► registry ──► select implementation
//!                                   │ user type / nested / generated
//!                                   ▼
//!                 per owning type: properties ──► initializer + ctor calls
//!                                   │
//!                                   ▼
//!                              cleanup ──► WeaveReport
//! ```
//!
//! Every phase works command by command. A failure is reported as a
//! diagnostic and leaves that command unwired; nothing aborts the pass.
//! Weaving an already woven module changes nothing.
//!
//! # Debugging
//!
//! - `RUST_LOG=cmdr_weave=debug`: per-command decisions.
//! - `RUST_LOG=cmdr_weave=info`: per-type summaries.
//!
//! Call [`init_tracing`] to install a subscriber.

pub mod assets;
pub mod cleanup;
mod config;
mod context;
mod error;
pub mod generic_impl;
pub mod init;
mod members;
pub mod nested_impl;
pub mod property;
pub mod registry;
pub mod scan;

#[cfg(test)]
mod test_helpers;

use std::sync::Once;

use cmdr_diagnostic::Diagnostic;
use cmdr_ir::{Module, TypeId};

pub use assets::{Assets, Implementation, GENERATED_PREFIX};
pub use config::{AttributeMatch, InitializerOrder, WeaveConfig};
pub use context::WeaveContext;
pub use error::WeaveError;
pub use init::{Strategy, INITIALIZER_NAME};
pub use registry::{CommandData, CommandId, CommandRegistry};

/// Result of one [`weave`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeaveReport {
    /// Every diagnostic, in emission order.
    pub diagnostics: Vec<Diagnostic>,
    /// Commands that received a construction block.
    pub commands_wired: usize,
    /// Commands found wired by an earlier weave.
    pub already_wired: usize,
    /// Types whose initializer or constructors changed.
    pub types_woven: usize,
    /// The shared generated implementation, when that path was taken.
    pub generated_type: Option<TypeId>,
    /// Nested implementation types created by this weave.
    pub nested_types: Vec<TypeId>,
}

impl WeaveReport {
    /// Whether the host should fail the build.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }
}

/// Weave `module` in place.
pub fn weave(module: &mut Module, config: &WeaveConfig) -> WeaveReport {
    let mut cx = WeaveContext::new(module, config);
    let mut report = WeaveReport::default();

    scan::scan_markers(&mut cx, module);
    if cx.registry.is_empty() {
        tracing::info!(module = module.str(module.name), "no commands found");
    } else if let Some(strategy) = select_strategy(&mut cx, module, &mut report) {
        let owners: Vec<TypeId> = module
            .all_types()
            .into_iter()
            .filter(|&ty| cx.registry.declares_commands(ty))
            .collect();
        for ty in owners {
            let commands = cx.registry.commands_of(ty);
            property::inject_properties(&mut cx, module, ty, &commands);
            let outcome = init::weave_initialization(&mut cx, module, ty, &commands, &strategy);
            report.commands_wired += outcome.commands_wired;
            report.already_wired += outcome.already_wired;
            if outcome.commands_wired + outcome.constructors_wired > 0 {
                report.types_woven += 1;
            }
            report.nested_types.extend(outcome.nested_types);
        }
    }

    if config.cleanup {
        cleanup::cleanup(module, config);
    }

    report.diagnostics = cx.queue.flush();
    tracing::info!(
        module = module.str(module.name),
        commands = cx.registry.len(),
        wired = report.commands_wired,
        types = report.types_woven,
        errors = report.errors().count(),
        "weave finished"
    );
    report
}

/// Pick the implementation path for the module. `None` when the shared
/// generated type cannot be used; that failure is already reported.
fn select_strategy(
    cx: &mut WeaveContext<'_>,
    module: &mut Module,
    report: &mut WeaveReport,
) -> Option<Strategy> {
    if let Some(implementation) = cx.assets.find_user_implementation(module) {
        tracing::debug!(
            implementation = %module.full_name(implementation.ty),
            "using module implementation"
        );
        return Some(Strategy::Shared(implementation));
    }
    if cx.config.fallback_to_nested {
        tracing::debug!("using nested implementations");
        return Some(Strategy::Nested);
    }
    match generic_impl::ensure_delegate_command(module, &cx.assets) {
        Ok(implementation) => {
            report.generated_type = Some(implementation.ty);
            Some(Strategy::Shared(implementation))
        }
        Err(err) => {
            cx.report(&err, generic_impl::DELEGATE_COMMAND_NAME);
            None
        }
    }
}

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
