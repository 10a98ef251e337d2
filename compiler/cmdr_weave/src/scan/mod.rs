//! Marker scanner.
//!
//! Walks every method of every type (nested types after their owner) and
//! records each validly-shaped, marker-tagged method in the registry under
//! the command name given by the marker. Per type, execute markers are
//! scanned before can-execute markers.
//!
//! # Handler shapes
//!
//! - **execute**: returns `void`; no parameters, or one non-`out` parameter.
//! - **can-execute**: returns `bool`; no parameters, or one non-`out`
//!   parameter of type `object`.
//!
//! A marked method of the wrong shape is reported as a warning (one note
//! per parameter) and never enters the registry. A marker whose first
//! constructor argument is not a string names no command; it is reported
//! and skipped. Scanning never fails.

use cmdr_diagnostic::{Diagnostic, ErrorCode};
use cmdr_ir::{MethodDef, MethodId, Module, TypeId, TypeRef};

use crate::WeaveContext;

/// Which marker a method carries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MarkerRole {
    Execute,
    CanExecute,
}

impl MarkerRole {
    fn label(self) -> &'static str {
        match self {
            MarkerRole::Execute => "execute",
            MarkerRole::CanExecute => "can-execute",
        }
    }
}

/// Fill the context's registry from the module's marker attributes.
pub fn scan_markers(cx: &mut WeaveContext<'_>, module: &Module) {
    for ty in module.all_types() {
        scan_type(cx, module, ty, MarkerRole::Execute);
        scan_type(cx, module, ty, MarkerRole::CanExecute);
    }
    tracing::info!(commands = cx.registry.len(), "marker scan complete");
}

fn scan_type(cx: &mut WeaveContext<'_>, module: &Module, ty: TypeId, role: MarkerRole) {
    let def = module.ty(ty);
    for (index, method) in def.methods.iter().enumerate() {
        let id = MethodId {
            ty,
            index: u32::try_from(index).unwrap_or(u32::MAX),
        };
        if !method
            .attributes
            .iter()
            .any(|a| is_role_marker(cx, module, a.ty, role))
        {
            continue;
        }

        if !is_valid_handler(method, role) {
            cx.warn(invalid_handler(module, id, role));
            continue;
        }

        for attribute in &method.attributes {
            if !is_role_marker(cx, module, attribute.ty, role) {
                continue;
            }
            let Some(name) = attribute.first_string_arg() else {
                cx.warn(
                    Diagnostic::warning(ErrorCode::E1003)
                        .with_message(format!(
                            "`{}` marker has no command name",
                            module.str(attribute.ty)
                        ))
                        .at(module.display_method(id)),
                );
                continue;
            };
            tracing::debug!(
                method = %module.display_method(id),
                command = module.str(name),
                role = role.label(),
                "found command handler"
            );
            let command = cx.registry.get_or_insert(name, ty);
            match role {
                MarkerRole::Execute => command.execute_methods.push(id),
                MarkerRole::CanExecute => command.can_execute_methods.push(id),
            }
        }
    }
}

fn is_role_marker(cx: &WeaveContext<'_>, module: &Module, attr: cmdr_ir::Name, role: MarkerRole) -> bool {
    let name = module.str(attr);
    match role {
        MarkerRole::Execute => cx.config.is_execute_marker(name),
        MarkerRole::CanExecute => cx.config.is_can_execute_marker(name),
    }
}

/// Whether `method` has the shape required for `role`.
pub fn is_valid_handler(method: &MethodDef, role: MarkerRole) -> bool {
    let param_ok = |required: Option<&TypeRef>| match method.params.as_slice() {
        [] => true,
        [p] => !p.is_out && required.map_or(true, |r| p.ty == *r),
        _ => false,
    };
    match role {
        MarkerRole::Execute => method.ret == TypeRef::Void && param_ok(None),
        MarkerRole::CanExecute => method.ret == TypeRef::Bool && param_ok(Some(&TypeRef::Object)),
    }
}

fn invalid_handler(module: &Module, id: MethodId, role: MarkerRole) -> Diagnostic {
    let (code, shape) = match role {
        MarkerRole::Execute => (
            ErrorCode::E1001,
            "must return void and take at most one parameter",
        ),
        MarkerRole::CanExecute => (
            ErrorCode::E1002,
            "must return bool and take no parameter or one `object` parameter",
        ),
    };
    let method = module.method(id);
    let diag = Diagnostic::warning(code)
        .with_message(format!(
            "`{}` is not a valid {} handler: it {shape}",
            module.str(method.name),
            role.label()
        ))
        .at(module.display_method(id));
    method
        .params
        .iter()
        .enumerate()
        .fold(diag, |d, (i, p)| {
            let out = if p.is_out { "out " } else { "" };
            d.with_note(format!(
                "parameter[{i}]: {out}{} {}",
                module.display_type(&p.ty),
                module.str(p.name)
            ))
        })
}

#[cfg(test)]
mod tests;
