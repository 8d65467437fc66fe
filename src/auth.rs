//! Request-scoped authentication context.
//!
//! The engine never holds a process-wide session. Every call that needs to
//! know who is acting receives an [`AuthContext`] value owned by the calling
//! boundary (request handler, CLI, test).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline role carried by an [`AuthContext`].
///
/// The role decides which transitions and queues are available; the engine
/// rejects a call whose role does not match the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Spending unit (SKPD) — submits and revises documents
    Skpd,
    /// Registrar — registers incoming documents or sends them back
    Registrar,
    /// Verifier — works the verification queue
    Verifier,
    /// Corrector — returns documents with corrections, shares the verifier pool
    Corrector,
    /// Disbursement registrar — records the final SP2D
    DisbursementRegistrar,
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Skpd => "skpd",
            Role::Registrar => "registrar",
            Role::Verifier => "verifier",
            Role::Corrector => "corrector",
            Role::DisbursementRegistrar => "disbursement-registrar",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The acting user, passed explicitly into every engine call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
}

impl AuthContext {
    #[must_use]
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Skpd.to_string(), "skpd");
        assert_eq!(Role::DisbursementRegistrar.to_string(), "disbursement-registrar");
    }

    #[test]
    fn test_role_serde_round_trip() {
        let json = serde_json::to_string(&Role::Verifier).unwrap();
        assert_eq!(json, "\"verifier\"");
        let parsed: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Role::Verifier);
    }

    #[test]
    fn test_auth_context_new() {
        let ctx = AuthContext::new("u-1", "Siti", Role::Registrar);
        assert_eq!(ctx.user_id, "u-1");
        assert_eq!(ctx.display_name, "Siti");
        assert_eq!(ctx.role, Role::Registrar);
    }
}
