//! Error codes for all weave diagnostics.
//!
//! Each code is a unique identifier (e.g. `E1001`) whose first digit names
//! the weave phase that reported it.

use std::fmt;

/// Error codes for all weave diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E1xxx: Marker scanning (handler shape, marker usage)
/// - E2xxx: Property injection
/// - E3xxx: Implementation selection and synthesis
/// - E4xxx: Initialization weaving
/// - E9xxx: Internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Scanning (E1xxx)
    /// Execute handler must return void and take at most one parameter
    E1001,
    /// Can-execute handler must return bool and take at most one `object` parameter
    E1002,
    /// Marker attribute without a command name
    E1003,

    // Property injection (E2xxx)
    /// Existing property has a type other than the command interface
    E2001,
    /// Accessor or backing field name already taken
    E2002,
    /// Existing command property lacks a getter or setter
    E2003,

    // Implementation (E3xxx)
    /// No constructor of the required arity on the implementation type
    E3001,
    /// Existing type with a generated name has an unexpected shape
    E3002,

    // Initialization (E4xxx)
    /// Command has no execute handler
    E4001,
    /// More than one can-execute handler for a command
    E4002,
    /// Handler signature does not fit the constructor's delegate parameter
    E4003,
    /// Initializer name is taken by an incompatible method
    E4004,
    /// Handler is declared on a type other than the command's owner
    E4005,

    // Internal (E9xxx)
    /// Internal weaver error
    E9001,
}

impl ErrorCode {
    /// Every code, in numeric order.
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E4001,
        ErrorCode::E4002,
        ErrorCode::E4003,
        ErrorCode::E4004,
        ErrorCode::E4005,
        ErrorCode::E9001,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E4004 => "E4004",
            ErrorCode::E4005 => "E4005",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// One-line description used by `--explain`-style lookups.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "invalid execute handler signature",
            ErrorCode::E1002 => "invalid can-execute handler signature",
            ErrorCode::E1003 => "command marker without a name",
            ErrorCode::E2001 => "property exists with a non-command type",
            ErrorCode::E2002 => "generated member name already taken",
            ErrorCode::E2003 => "command property lacks an accessor",
            ErrorCode::E3001 => "implementation constructor not found",
            ErrorCode::E3002 => "generated type has an unexpected shape",
            ErrorCode::E4001 => "command has no execute handler",
            ErrorCode::E4002 => "ambiguous can-execute handler",
            ErrorCode::E4003 => "handler does not fit delegate parameter",
            ErrorCode::E4004 => "initializer name clash",
            ErrorCode::E4005 => "handler declared on another type",
            ErrorCode::E9001 => "internal weaver error",
        }
    }

    pub fn is_scan_error(&self) -> bool {
        matches!(self, ErrorCode::E1001 | ErrorCode::E1002 | ErrorCode::E1003)
    }

    pub fn is_property_error(&self) -> bool {
        matches!(self, ErrorCode::E2001 | ErrorCode::E2002 | ErrorCode::E2003)
    }

    pub fn is_implementation_error(&self) -> bool {
        matches!(self, ErrorCode::E3001 | ErrorCode::E3002)
    }

    pub fn is_init_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E4001
                | ErrorCode::E4002
                | ErrorCode::E4003
                | ErrorCode::E4004
                | ErrorCode::E4005
        )
    }

    pub fn is_internal_error(&self) -> bool {
        matches!(self, ErrorCode::E9001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse a code string like `"E4002"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
