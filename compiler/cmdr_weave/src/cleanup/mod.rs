//! Post-weave cleanup.
//!
//! Marker attributes and the reference to the marker assembly are only
//! needed at weave time; both are removed from the woven module.

use rustc_hash::FxHashSet;

use cmdr_ir::{Module, Name};

use crate::WeaveConfig;

/// What [`cleanup`] removed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CleanupOutcome {
    pub markers_removed: usize,
    pub reference_removed: bool,
}

/// Run both cleanup passes.
pub fn cleanup(module: &mut Module, config: &WeaveConfig) -> CleanupOutcome {
    let markers_removed = strip_markers(module, config);
    let reference_removed = remove_marker_reference(module, &config.marker_assembly);
    CleanupOutcome {
        markers_removed,
        reference_removed,
    }
}

/// Remove every marker attribute from types and methods. Returns the
/// number of attributes removed.
pub fn strip_markers(module: &mut Module, config: &WeaveConfig) -> usize {
    let types = module.all_types();

    // Resolve attribute names once; the edits below hold `ty_mut`.
    let mut markers: FxHashSet<Name> = FxHashSet::default();
    for &ty in &types {
        let def = module.ty(ty);
        let attributes = def
            .attributes
            .iter()
            .chain(def.methods.iter().flat_map(|m| m.attributes.iter()));
        markers.extend(
            attributes
                .map(|a| a.ty)
                .filter(|&name| config.is_marker(module.str(name))),
        );
    }
    if markers.is_empty() {
        return 0;
    }

    let mut removed = 0;
    for ty in types {
        let def = module.ty_mut(ty);
        removed += retain_count(&mut def.attributes, |a| !markers.contains(&a.ty));
        for method in &mut def.methods {
            removed += retain_count(&mut method.attributes, |a| !markers.contains(&a.ty));
        }
    }
    tracing::debug!(removed, "stripped marker attributes");
    removed
}

fn retain_count<T>(items: &mut Vec<T>, keep: impl FnMut(&T) -> bool) -> usize {
    let before = items.len();
    items.retain(keep);
    before - items.len()
}

/// Remove the assembly reference named `name`. Returns whether it existed.
pub fn remove_marker_reference(module: &mut Module, name: &str) -> bool {
    let position = module
        .references
        .iter()
        .position(|r| module.str(r.name) == name);
    match position {
        Some(index) => {
            module.references.remove(index);
            tracing::info!(reference = name, "removed reference");
            true
        }
        None => {
            tracing::info!(reference = name, "no reference found");
            false
        }
    }
}
