use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::errors::InternalError;
use crate::stores::AuditStore;
use crate::types::internal::audit::{AuditEvent, EventType};
use crate::types::internal::context::RequestContext;

/// Builder for creating custom audit events
///
/// Provides a fluent API for constructing audit events with type-safe field
/// addition and hashing of sensitive values.
///
/// # Example
/// ```ignore
/// audit_logger
///     .builder("institution_lookup")
///     .with_context(&ctx)
///     .add_field("institution_code", "bru4j")
///     .add_sensitive("email", "registrar@bru.edu")
///     .write()
///     .await?;
/// ```
pub struct AuditBuilder {
    event_type: EventType,
    actor_id: Option<String>,
    target_id: Option<String>,
    ip_address: Option<String>,
    request_id: Option<String>,
    data: HashMap<String, serde_json::Value>,
    store: Arc<AuditStore>,
}

impl AuditBuilder {
    pub fn new(store: Arc<AuditStore>, event_type: impl Into<EventType>) -> Self {
        Self {
            event_type: event_type.into(),
            actor_id: None,
            target_id: None,
            ip_address: None,
            request_id: None,
            data: HashMap::new(),
            store,
        }
    }

    /// Populate actor, IP and request id from the context
    ///
    /// Source, authentication state and the JWT id (when present) go into
    /// the event data.
    pub fn with_context(mut self, ctx: &RequestContext) -> Self {
        self.actor_id = Some(ctx.actor_id.clone());
        self.ip_address = ctx.ip_address.map(|ip| ip.to_string());
        self.request_id = Some(ctx.request_id.to_string());

        self.data.insert("source".to_string(), json!(ctx.source.as_str()));
        self.data.insert("authenticated".to_string(), json!(ctx.authenticated));
        if let Some(claims) = &ctx.claims {
            self.data.insert("jwt_id".to_string(), json!(claims.jti));
        }
        self
    }

    /// Whom the action was performed on
    pub fn target(mut self, id: impl Into<String>) -> Self {
        self.target_id = Some(id.into());
        self
    }

    pub fn actor(mut self, id: impl Into<String>) -> Self {
        self.actor_id = Some(id.into());
        self
    }

    /// Add an arbitrary field to the event data
    pub fn add_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.data.insert(key.into(), json_value);
        }
        self
    }

    /// Add a field stored as `sha256:<hex>` of its JSON form
    ///
    /// Same input always produces the same digest, so related events can be
    /// correlated without recording the value itself.
    pub fn add_sensitive(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(&value) {
            let digest = Sha256::digest(json_value.to_string().as_bytes());
            self.data
                .insert(key.into(), json!(format!("sha256:{:x}", digest)));
        }
        self
    }

    /// Build the audit event without writing it
    pub fn build(self) -> AuditEvent {
        let mut event = AuditEvent::new(self.event_type);
        if let Some(actor_id) = self.actor_id {
            event.actor_id = actor_id;
        }
        if let Some(request_id) = self.request_id {
            event.request_id = request_id;
        }
        event.target_id = self.target_id;
        event.ip_address = self.ip_address;
        event.data = self.data;
        event
    }

    pub async fn write(self) -> Result<(), InternalError> {
        let store = self.store.clone();
        store.write_event(self.build()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::setup_audit_store;

    #[tokio::test]
    async fn test_build_uses_context_and_defaults() {
        let (_db, store) = setup_audit_store().await;
        let ctx = RequestContext::for_cli("approvals");

        let event = AuditBuilder::new(store, EventType::ApprovalGranted)
            .with_context(&ctx)
            .target("user-1")
            .add_field("request_id_ref", "req-1")
            .build();

        assert_eq!(event.event_type, EventType::ApprovalGranted);
        assert_eq!(event.actor_id, "cli:approvals");
        assert_eq!(event.target_id.as_deref(), Some("user-1"));
        assert_eq!(event.ip_address, None);
        assert_eq!(event.request_id, ctx.request_id.to_string());
        assert_eq!(event.data.get("source"), Some(&json!("cli")));
        assert_eq!(event.data.get("request_id_ref"), Some(&json!("req-1")));
    }

    #[tokio::test]
    async fn test_add_sensitive_hashes_value() {
        let (_db, store) = setup_audit_store().await;

        let event = AuditBuilder::new(store, "custom_event")
            .add_sensitive("email", "user@example.com")
            .build();

        let stored = event.data.get("email").and_then(|v| v.as_str()).unwrap();
        assert!(stored.starts_with("sha256:"));
        assert_eq!(stored.len(), "sha256:".len() + 64);
        assert!(!stored.contains("user@example.com"));
        assert_eq!(event.event_type, EventType::Custom("custom_event".to_string()));
    }

    #[tokio::test]
    async fn test_write_persists_event() {
        use sea_orm::EntityTrait;
        use crate::types::db::audit_event;

        let (db, store) = setup_audit_store().await;

        AuditBuilder::new(store, EventType::OtpIssued)
            .actor("user-9")
            .add_field("verification_type", "registration")
            .write()
            .await
            .unwrap();

        let events = audit_event::Entity::find().all(&db).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "otp_issued");
        assert_eq!(events[0].actor_id, "user-9");
        assert!(events[0].data.contains("registration"));
    }
}
