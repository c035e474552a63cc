use std::sync::Arc;

use mockable::Clock;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use crate::errors::InternalError;
use crate::errors::internal::AuditError;
use crate::types::db::audit_event;
use crate::types::internal::audit::AuditEvent;

/// Repository for audit event storage on the audit database
pub struct AuditStore {
    db: DatabaseConnection,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl AuditStore {
    pub fn new(db: DatabaseConnection, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { db, clock }
    }

    /// Serialize the event data to JSON and insert the row
    pub async fn write_event(&self, event: AuditEvent) -> Result<(), InternalError> {
        let data_json = serde_json::to_string(&event.data).map_err(|e| {
            AuditError::LogWriteFailed(format!("Failed to serialize audit data: {}", e))
        })?;

        let audit_event = audit_event::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            timestamp: Set(self.clock.utc().to_rfc3339()),
            event_type: Set(event.event_type.to_string()),
            actor_id: Set(event.actor_id),
            target_id: Set(event.target_id),
            ip_address: Set(event.ip_address),
            request_id: Set(event.request_id),
            data: Set(data_json),
        };

        audit_event
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("write_audit_event", e))?;

        Ok(())
    }
}
