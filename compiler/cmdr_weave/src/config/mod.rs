//! Weave configuration.
//!
//! A plain value resolved by the host before the weave runs. Defaults match
//! the marker attributes shipped with the `Commander` marker assembly.

/// How a custom attribute is matched against a configured marker name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AttributeMatch {
    /// `Commander.OnCommandAttribute` must match exactly.
    #[default]
    FullName,
    /// Only the part after the last `.` is compared.
    SimpleName,
}

impl AttributeMatch {
    /// Whether `actual` (an attribute type's full name) matches `configured`.
    pub fn matches(self, configured: &str, actual: &str) -> bool {
        match self {
            AttributeMatch::FullName => configured == actual,
            AttributeMatch::SimpleName => simple_name(configured) == simple_name(actual),
        }
    }
}

fn simple_name(full: &str) -> &str {
    full.rsplit_once('.').map_or(full, |(_, simple)| simple)
}

/// Order in which construction blocks run inside the initializer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InitializerOrder {
    /// Each block is appended before the terminating return: blocks run in
    /// command discovery order.
    #[default]
    Declaration,
    /// Each block is prepended at the entry: the last command processed
    /// runs first.
    Reverse,
}

/// Configuration for one weave.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "snake_case"))]
pub struct WeaveConfig {
    /// Full name of the execute marker attribute.
    pub execute_attribute: String,
    /// Full name of the can-execute marker attribute.
    pub can_execute_attribute: String,
    pub attribute_match: AttributeMatch,
    /// Full name of the command interface.
    pub command_interface: String,
    /// Use one private nested implementation per command when the module
    /// has no usable implementation of its own.
    pub fallback_to_nested: bool,
    pub initializer_order: InitializerOrder,
    /// Strip marker attributes and the marker assembly reference afterwards.
    pub cleanup: bool,
    /// Name of the assembly reference removed by cleanup.
    pub marker_assembly: String,
}

impl Default for WeaveConfig {
    fn default() -> Self {
        WeaveConfig {
            execute_attribute: "Commander.OnCommandAttribute".to_owned(),
            can_execute_attribute: "Commander.OnCommandCanExecuteAttribute".to_owned(),
            attribute_match: AttributeMatch::FullName,
            command_interface: "System.Windows.Input.ICommand".to_owned(),
            fallback_to_nested: false,
            initializer_order: InitializerOrder::Declaration,
            cleanup: true,
            marker_assembly: "Commander".to_owned(),
        }
    }
}

impl WeaveConfig {
    /// Default configuration with the nested fallback enabled.
    pub fn nested() -> Self {
        WeaveConfig {
            fallback_to_nested: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_markers(mut self, execute: impl Into<String>, can_execute: impl Into<String>) -> Self {
        self.execute_attribute = execute.into();
        self.can_execute_attribute = can_execute.into();
        self
    }

    #[must_use]
    pub fn with_attribute_match(mut self, attribute_match: AttributeMatch) -> Self {
        self.attribute_match = attribute_match;
        self
    }

    #[must_use]
    pub fn with_fallback_to_nested(mut self, fallback: bool) -> Self {
        self.fallback_to_nested = fallback;
        self
    }

    #[must_use]
    pub fn with_initializer_order(mut self, order: InitializerOrder) -> Self {
        self.initializer_order = order;
        self
    }

    #[must_use]
    pub fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    pub fn is_execute_marker(&self, attribute: &str) -> bool {
        self.attribute_match.matches(&self.execute_attribute, attribute)
    }

    pub fn is_can_execute_marker(&self, attribute: &str) -> bool {
        self.attribute_match
            .matches(&self.can_execute_attribute, attribute)
    }

    /// Either marker.
    pub fn is_marker(&self, attribute: &str) -> bool {
        self.is_execute_marker(attribute) || self.is_can_execute_marker(attribute)
    }
}
