//! Command registry.
//!
//! One [`CommandData`] per distinct command name in the module, populated by
//! the marker scanner and read by every later phase. The registry lives in
//! the weave context, so its lifetime is exactly one pass.
//!
//! Entries keep insertion order; every phase iterates in that order, which
//! makes the weave deterministic.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use cmdr_ir::{MethodId, Name, PropertyId, TypeId};

/// Index of a command in its [`CommandRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct CommandId(u32);

impl CommandId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Everything known about one command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandData {
    pub name: Name,
    /// Type that exposes and initializes the command: the type of the first
    /// handler discovered for it.
    pub declaring_type: TypeId,
    /// Validated execute handlers, in discovery order.
    pub execute_methods: SmallVec<[MethodId; 1]>,
    /// Validated can-execute handlers, in discovery order.
    pub can_execute_methods: SmallVec<[MethodId; 1]>,
    /// Command-typed property, set by the property injector.
    pub property: Option<PropertyId>,
    /// A construction block for this command is in the initializer.
    pub initialization_injected: bool,
    pub uses_nested_implementation: bool,
}

impl CommandData {
    pub fn new(name: Name, declaring_type: TypeId) -> Self {
        CommandData {
            name,
            declaring_type,
            execute_methods: SmallVec::new(),
            can_execute_methods: SmallVec::new(),
            property: None,
            initialization_injected: false,
            uses_nested_implementation: false,
        }
    }

    /// The execute handler used for wiring: the first one discovered.
    pub fn execute_method(&self) -> Option<MethodId> {
        self.execute_methods.first().copied()
    }
}

#[derive(Clone, Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<CommandData>,
    index: FxHashMap<Name, CommandId>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The command called `name`, created with `declaring_type` if absent.
    pub fn get_or_insert(&mut self, name: Name, declaring_type: TypeId) -> &mut CommandData {
        let id = match self.index.get(&name) {
            Some(&id) => id,
            None => {
                let id = CommandId::new(
                    u32::try_from(self.commands.len())
                        .unwrap_or_else(|_| panic!("command count exceeds u32::MAX")),
                );
                self.commands.push(CommandData::new(name, declaring_type));
                self.index.insert(name, id);
                tracing::trace!(command = name.raw(), id = id.raw(), "registered command");
                id
            }
        };
        &mut self.commands[id.index()]
    }

    pub fn lookup(&self, name: Name) -> Option<CommandId> {
        self.index.get(&name).copied()
    }

    pub fn get(&self, name: Name) -> Option<&CommandData> {
        self.lookup(name).map(|id| &self.commands[id.index()])
    }

    #[inline]
    pub fn command(&self, id: CommandId) -> &CommandData {
        &self.commands[id.index()]
    }

    #[inline]
    pub fn command_mut(&mut self, id: CommandId) -> &mut CommandData {
        &mut self.commands[id.index()]
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandData> {
        self.commands.iter()
    }

    /// Commands declared by `ty`, in insertion order.
    pub fn commands_of(&self, ty: TypeId) -> Vec<CommandId> {
        self.commands
            .iter()
            .enumerate()
            .filter(|(_, c)| c.declaring_type == ty)
            .map(|(i, _)| CommandId::new(u32::try_from(i).unwrap_or(u32::MAX)))
            .collect()
    }

    pub fn declares_commands(&self, ty: TypeId) -> bool {
        self.commands.iter().any(|c| c.declaring_type == ty)
    }
}
