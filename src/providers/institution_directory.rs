use std::sync::Arc;

use sea_orm::ConnectionTrait;

use crate::errors::InternalError;
use crate::errors::internal::InstitutionError;
use crate::providers::input_validation::normalize_institution_code;
use crate::stores::{NewOrganization, OrganizationStore};
use crate::types::db::organization;

/// Maps institution codes to organizations
///
/// Codes are compared case-insensitively: every code is trimmed and
/// lower-cased before it reaches storage.
pub struct InstitutionDirectory {
    organization_store: Arc<OrganizationStore>,
}

impl InstitutionDirectory {
    pub fn new(organization_store: Arc<OrganizationStore>) -> Self {
        Self { organization_store }
    }

    pub async fn resolve(
        &self,
        conn: &impl ConnectionTrait,
        code: &str,
    ) -> Result<organization::Model, InternalError> {
        let code = normalize_institution_code(code)?;

        match self.organization_store.find_by_code(conn, &code).await? {
            Some(org) => Ok(org),
            None => {
                tracing::debug!("No institution registered under code '{}'", code);
                Err(InstitutionError::NotFound { code }.into())
            }
        }
    }

    /// Register a new institution under `code`
    ///
    /// The lookup is only an early exit; the unique index on the code is
    /// what settles concurrent creators.
    pub async fn create(
        &self,
        conn: &impl ConnectionTrait,
        code: &str,
        name: &str,
        email: &str,
    ) -> Result<organization::Model, InternalError> {
        let code = normalize_institution_code(code)?;

        if self.organization_store.find_by_code(conn, &code).await?.is_some() {
            return Err(InstitutionError::CodeTaken { code }.into());
        }

        let name = match name.trim() {
            "" => code.clone(),
            trimmed => trimmed.to_owned(),
        };

        let org = self
            .organization_store
            .create(
                conn,
                NewOrganization {
                    name,
                    email: email.to_owned(),
                    institution_code: code,
                },
            )
            .await?;

        tracing::info!(
            "Institution '{}' created with code '{}'",
            org.name,
            org.institution_code
        );
        Ok(org)
    }
}
