use crate::config::keys::{CONTROLLER_URI_CONFIG, SCOPE_CONFIG};
use crate::config::properties::Properties;

/// Store-specific settings carried inside a Kafka property bag
///
/// Both fields are optional: the controller URI falls back to
/// `bootstrap.servers`, and a missing scope only fails once a reader needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Explicit controller URI
    pub controller_uri: Option<String>,

    /// Scope for streams and reader groups
    pub scope: Option<String>,
}

impl StoreConfig {
    /// Read the `pravega.*` block out of a property bag
    pub fn from_properties(props: &Properties) -> Self {
        let non_blank = |key: &str| {
            props
                .get_property(key)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            controller_uri: non_blank(CONTROLLER_URI_CONFIG),
            scope: non_blank(SCOPE_CONFIG),
        }
    }

    /// Set the controller URI (builder pattern)
    pub fn with_controller_uri(mut self, uri: impl Into<String>) -> Self {
        self.controller_uri = Some(uri.into());
        self
    }

    /// Set the scope (builder pattern)
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}
