//! Prefixed record IDs.
//!
//! Format: `{prefix}_{uuid_simple}` (32 hex chars, no hyphens). License IDs are
//! not generated here; they are customer-facing keys from [`crate::keygen`].

use uuid::Uuid;

/// Record types that carry a prefixed ID.
#[derive(Debug, Clone, Copy)]
pub enum EntityType {
    Activation,
    VerificationLog,
}

impl EntityType {
    /// Returns the prefix for this entity type.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Activation => "act",
            Self::VerificationLog => "ver",
        }
    }

    /// Generates a new prefixed ID for this entity type.
    pub fn gen_id(&self) -> String {
        format!("{}_{}", self.prefix(), Uuid::new_v4().as_simple())
    }
}
