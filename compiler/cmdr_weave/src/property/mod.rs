//! Property injector.
//!
//! Gives every command of a type a property of the command-interface type.
//! An existing property of that name is reused when its type is the command
//! interface and it has both accessors; otherwise a public auto-property is
//! synthesized:
//!
//! ```text
//! private ICommand <Save>k__BackingField;
//! public ICommand get_Save() { return this.<Save>k__BackingField; }
//! public void set_Save(ICommand value) { this.<Save>k__BackingField = value; }
//! ```
//!
//! Failures are per command: the command keeps `property == None` and is
//! skipped by the initialization weaver.

use cmdr_ir::{
    BodyBuilder, FieldDef, FieldFlags, MethodDef, MethodFlags, Module, Operand, PropertyDef,
    PropertyId, TypeId, TypeRef,
};

use crate::assets::Assets;
use crate::registry::CommandId;
use crate::{WeaveContext, WeaveError};

/// Outcome of [`ensure_command_property`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PropertyOutcome {
    Reused(PropertyId),
    Created(PropertyId),
}

impl PropertyOutcome {
    pub fn id(self) -> PropertyId {
        match self {
            PropertyOutcome::Reused(id) | PropertyOutcome::Created(id) => id,
        }
    }
}

/// Inject properties for `commands`, all declared by `ty`.
pub fn inject_properties(
    cx: &mut WeaveContext<'_>,
    module: &mut Module,
    ty: TypeId,
    commands: &[CommandId],
) {
    for &id in commands {
        let name = cx.registry.command(id).name;
        let command_name = module.str(name);
        match ensure_command_property(module, &cx.assets, ty, command_name) {
            Ok(outcome) => {
                tracing::debug!(
                    ty = %module.full_name(ty),
                    command = command_name,
                    created = matches!(outcome, PropertyOutcome::Created(_)),
                    "command property ready"
                );
                cx.registry.command_mut(id).property = Some(outcome.id());
            }
            Err(err) => {
                cx.report(&err, module.full_name(ty));
            }
        }
    }
}

/// Find or create the command property `name` on `ty`.
pub fn ensure_command_property(
    module: &mut Module,
    assets: &Assets,
    ty: TypeId,
    name: &str,
) -> Result<PropertyOutcome, WeaveError> {
    let prop_name = module.intern(name);
    if let Some(index) = module.ty(ty).find_property(prop_name) {
        let id = PropertyId { ty, index };
        let prop = module.property(id);
        if prop.ty != assets.command {
            return Err(WeaveError::PropertyTypeConflict {
                property: name.to_owned(),
                found: module.display_type(&prop.ty),
                expected: module.display_type(&assets.command),
            });
        }
        if prop.getter.is_none() {
            return Err(WeaveError::MissingAccessor {
                property: name.to_owned(),
                accessor: "getter",
            });
        }
        if prop.setter.is_none() {
            return Err(WeaveError::MissingAccessor {
                property: name.to_owned(),
                accessor: "setter",
            });
        }
        return Ok(PropertyOutcome::Reused(id));
    }

    let field_name = module.intern(&format!("<{name}>k__BackingField"));
    let getter_name = module.intern(&format!("get_{name}"));
    let setter_name = module.intern(&format!("set_{name}"));
    let def = module.ty(ty);
    let clash = if def.find_field(field_name).is_some() {
        Some(field_name)
    } else if def.find_method(getter_name).is_some() {
        Some(getter_name)
    } else if def.find_method(setter_name).is_some() {
        Some(setter_name)
    } else {
        None
    };
    if let Some(member) = clash {
        return Err(WeaveError::MemberNameClash {
            ty: module.full_name(ty),
            member: module.str(member).to_owned(),
        });
    }

    let command_ty = assets.command.clone();
    let field = module.add_field(
        ty,
        FieldDef {
            name: field_name,
            ty: command_ty.clone(),
            flags: FieldFlags::PRIVATE,
        },
    );

    let mut b = BodyBuilder::new();
    let value = b.load_field(command_ty.clone(), Operand::THIS, field);
    b.ret(Some(Operand::Var(value)));
    let getter = module.add_method(
        ty,
        MethodDef::new(getter_name, MethodFlags::ACCESSOR, command_ty.clone()).with_body(b.finish()),
    );

    let mut b = BodyBuilder::new();
    b.store_field(Operand::THIS, field, Operand::Arg(1));
    b.ret(None);
    let setter = module.add_method(
        ty,
        MethodDef::new(setter_name, MethodFlags::ACCESSOR, TypeRef::Void)
            .with_param(assets.value, command_ty.clone())
            .with_body(b.finish()),
    );

    let id = module.add_property(
        ty,
        PropertyDef {
            name: prop_name,
            ty: command_ty,
            getter: Some(getter.index),
            setter: Some(setter.index),
        },
    );
    Ok(PropertyOutcome::Created(id))
}
