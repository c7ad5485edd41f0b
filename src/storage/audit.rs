// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Audit trail for identity-scoped state changes.
//!
//! Wallet links, mints and reconciliation writes are recorded through the
//! store's append-only audit log. Identities appear only as fingerprints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::identity::AnonymousIdentity;

/// Types of auditable events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    // Data events
    DataSaved,
    AchievementsReconciled,

    // Wallet events
    WalletLinked,
    WalletLinkRejected,
    WalletUnlinked,

    // Mint events
    AchievementMinted,
    MintFailed,
}

/// An audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditEvent {
    /// Unique event ID.
    pub event_id: String,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Type of event.
    pub event_type: AuditEventType,
    /// Fingerprint of the identity that triggered the event.
    pub identity: Option<String>,
    /// Resource affected (achievement id, wallet address, ...).
    pub resource_id: Option<String>,
    /// Resource type (achievement, wallet, ...).
    pub resource_type: Option<String>,
    /// Additional details as JSON.
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error code if the operation failed.
    pub error: Option<String>,
}

impl AuditEvent {
    /// Create a new audit event.
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type,
            identity: None,
            resource_id: None,
            resource_type: None,
            details: None,
            success: true,
            error: None,
        }
    }

    /// Set the identity (stored as its fingerprint).
    pub fn with_identity(mut self, identity: &AnonymousIdentity) -> Self {
        self.identity = Some(identity.fingerprint());
        self
    }

    /// Set the resource.
    pub fn with_resource(
        mut self,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        self.resource_type = Some(resource_type.into());
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Add details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Mark as failed with an error code.
    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.error = Some(error.into());
        self
    }

    /// Storage key: sortable timestamp followed by the event id.
    pub fn storage_key(&self) -> String {
        format!(
            "{}|{}",
            self.timestamp.format("%Y%m%dT%H%M%S%.9fZ"),
            self.event_id
        )
    }
}

/// Record an audit event; failures are logged, never propagated.
#[macro_export]
macro_rules! audit_log {
    ($store:expr, $event:expr) => {{
        let event: $crate::storage::AuditEvent = $event;
        if let Err(e) = $store.log_event(&event) {
            tracing::warn!(
                error = %e,
                event_type = ?event.event_type,
                "Failed to record audit event"
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_audit_event() {
        let identity = AnonymousIdentity::parse(&"A".repeat(43)).unwrap();
        let event = AuditEvent::new(AuditEventType::WalletLinked)
            .with_identity(&identity)
            .with_resource("wallet", "addr");

        assert_eq!(event.event_type, AuditEventType::WalletLinked);
        assert_eq!(event.identity, Some(identity.fingerprint()));
        assert_eq!(event.resource_type.as_deref(), Some("wallet"));
        assert!(event.success);
    }

    #[test]
    fn failed_event() {
        let event = AuditEvent::new(AuditEventType::MintFailed).failed("minting_unavailable");
        assert!(!event.success);
        assert_eq!(event.error.as_deref(), Some("minting_unavailable"));
    }

    #[test]
    fn storage_keys_sort_by_time() {
        let first = AuditEvent::new(AuditEventType::DataSaved);
        let mut second = AuditEvent::new(AuditEventType::DataSaved);
        second.timestamp = first.timestamp + chrono::Duration::milliseconds(1);
        assert!(first.storage_key() < second.storage_key());
    }
}
