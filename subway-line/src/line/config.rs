//! Line maintenance configuration.

use tracing::warn;

/// Environment variable selecting the [`RemovalPolicy`].
pub const REMOVAL_POLICY_VAR: &str = "SUBWAY_REMOVAL_POLICY";

/// Which stations may be removed from a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovalPolicy {
    /// Only the trailing terminal may be removed.
    #[default]
    TrailingTerminal,
    /// Any station may be removed; the path is re-linked around it.
    AnyStation,
}

impl RemovalPolicy {
    /// Parse a policy name: `terminal` or `any` (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "terminal" => Some(RemovalPolicy::TrailingTerminal),
            "any" => Some(RemovalPolicy::AnyStation),
            _ => None,
        }
    }
}

/// Configuration for line maintenance.
#[derive(Debug, Clone, Default)]
pub struct LineConfig {
    /// Which stations `remove_station` accepts.
    pub removal_policy: RemovalPolicy,
}

impl LineConfig {
    /// Create a new configuration with the given policy.
    pub fn new(removal_policy: RemovalPolicy) -> Self {
        Self { removal_policy }
    }

    /// Read the configuration from the environment.
    ///
    /// Unset or unrecognised values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_policy_value(std::env::var(REMOVAL_POLICY_VAR).ok().as_deref())
    }

    fn from_policy_value(value: Option<&str>) -> Self {
        let removal_policy = match value {
            None => RemovalPolicy::default(),
            Some(raw) => RemovalPolicy::parse(raw).unwrap_or_else(|| {
                warn!(
                    value = raw,
                    "Unrecognised {}, using default", REMOVAL_POLICY_VAR
                );
                RemovalPolicy::default()
            }),
        };
        Self { removal_policy }
    }
}
