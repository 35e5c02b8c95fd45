//! Seams to the platform facilities the sensor consumes.
//!
//! The host supplies implementations for its call-log store, telephony state
//! and permission model; [`memory`] has in-process ones.

pub mod memory;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::models::{CallLogRow, CallStateChange};

pub use memory::{ManualTelephony, MemoryCallLog, StaticPermissions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    ReadContacts,
    ReadPhoneState,
    ReadCallLog,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ReadContacts => "read-contacts",
            Permission::ReadPhoneState => "read-phone-state",
            Permission::ReadCallLog => "read-call-log",
        }
    }
}

pub const REQUIRED_PERMISSIONS: [Permission; 3] = [
    Permission::ReadContacts,
    Permission::ReadPhoneState,
    Permission::ReadCallLog,
];

pub trait PermissionChecker: Send + Sync {
    fn is_granted(&self, permission: Permission) -> bool;
}

/// Required permissions the checker does not grant, in declaration order.
pub fn missing_permissions(checker: &dyn PermissionChecker) -> Vec<Permission> {
    REQUIRED_PERMISSIONS
        .into_iter()
        .filter(|permission| !checker.is_granted(*permission))
        .collect()
}

/// The platform call log.
pub trait CallLogSource: Send + Sync {
    /// The most recent row by call date, if any.
    fn latest_call(&self) -> Result<Option<CallLogRow>>;

    /// Registers for change notifications. Dropping the receiver unregisters.
    fn register(&self) -> Result<mpsc::UnboundedReceiver<()>>;
}

/// The platform telephony state.
pub trait TelephonySource: Send + Sync {
    /// Listens for call-state transitions. Dropping the receiver stops listening.
    fn listen(&self) -> Result<mpsc::UnboundedReceiver<CallStateChange>>;
}

/// Everything the sensor needs from the host platform.
#[derive(Clone)]
pub struct Platform {
    pub call_log: Arc<dyn CallLogSource>,
    pub telephony: Arc<dyn TelephonySource>,
    pub permissions: Arc<dyn PermissionChecker>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_permissions_keeps_declaration_order() {
        let checker = StaticPermissions::granting([Permission::ReadPhoneState]);

        assert_eq!(
            missing_permissions(&checker),
            vec![Permission::ReadContacts, Permission::ReadCallLog]
        );
        assert!(missing_permissions(&StaticPermissions::all()).is_empty());
    }
}
