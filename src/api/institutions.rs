use std::sync::Arc;

use poem_openapi::{OpenApi, Tags, param::Path, payload::Json};

use crate::coordinators::RegistrationCoordinator;
use crate::errors::AuthError;
use crate::types::dto::institutions::InstitutionResponse;

pub struct InstitutionsApi {
    registration_coordinator: Arc<RegistrationCoordinator>,
}

impl InstitutionsApi {
    pub fn new(registration_coordinator: Arc<RegistrationCoordinator>) -> Self {
        Self {
            registration_coordinator,
        }
    }
}

#[derive(Tags)]
enum InstitutionTags {
    /// Institution directory
    Institutions,
}

#[OpenApi(prefix_path = "/institutions")]
impl InstitutionsApi {
    /// Look up an institution by code (case-insensitive)
    #[oai(path = "/:code", method = "get", tag = "InstitutionTags::Institutions")]
    async fn lookup(&self, code: Path<String>) -> Result<Json<InstitutionResponse>, AuthError> {
        let organization = self
            .registration_coordinator
            .lookup_institution(&code.0)
            .await?;

        Ok(Json(organization.into()))
    }
}
