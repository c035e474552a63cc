use poem_openapi::Object;

use crate::types::db::organization;

/// Public view of an institution, enough for a registration form to confirm
/// the code
#[derive(Object, Debug, Clone, PartialEq)]
pub struct InstitutionResponse {
    pub id: String,
    pub name: String,
    pub institution_code: String,
}

impl From<organization::Model> for InstitutionResponse {
    fn from(model: organization::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            institution_code: model.institution_code,
        }
    }
}
