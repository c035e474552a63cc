// API layer - HTTP endpoints
pub mod approvals;
pub mod auth;
pub mod health;
pub mod helpers;
pub mod institutions;
pub mod otp;

#[cfg(test)]
mod helpers_test;

use std::sync::Arc;

use poem::Route;
use poem_openapi::OpenApiService;

pub use approvals::ApprovalsApi;
pub use auth::{AuthApi, BearerAuth};
pub use health::HealthApi;
pub use institutions::InstitutionsApi;
pub use otp::OtpApi;

use crate::app_data::AppData;
use crate::coordinators::{
    ApprovalCoordinator, OtpCoordinator, RegistrationCoordinator, SessionCoordinator,
};

/// Every endpoint group, wired to coordinators sharing one `AppData`
pub type AcadifyApi = (HealthApi, AuthApi, OtpApi, ApprovalsApi, InstitutionsApi);

pub fn build_api(app_data: Arc<AppData>) -> AcadifyApi {
    let registration_coordinator = Arc::new(RegistrationCoordinator::new(app_data.clone()));
    let session_coordinator = Arc::new(SessionCoordinator::new(app_data.clone()));
    let otp_coordinator = Arc::new(OtpCoordinator::new(app_data.clone()));
    let approval_coordinator = Arc::new(ApprovalCoordinator::new(app_data));

    (
        HealthApi,
        AuthApi::new(registration_coordinator.clone(), session_coordinator.clone()),
        OtpApi::new(otp_coordinator),
        ApprovalsApi::new(approval_coordinator, session_coordinator),
        InstitutionsApi::new(registration_coordinator),
    )
}

/// Routes: the API under `/api`, Swagger UI under `/swagger`
pub fn build_routes(app_data: Arc<AppData>, server_url: &str) -> Route {
    let api_service = OpenApiService::new(build_api(app_data), "Acadify API", "1.0.0")
        .server(format!("{}/api", server_url));
    let ui = api_service.swagger_ui();

    Route::new().nest("/api", api_service).nest("/swagger", ui)
}
