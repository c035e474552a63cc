// Operator review of pending registrations

use std::sync::Arc;

use crate::app_data::AppData;
use crate::coordinators::ApprovalCoordinator;
use crate::providers::input_validation::parse_role_filter;
use crate::types::internal::context::RequestContext;

/// Print pending requests for an institution
pub async fn list_pending(
    app_data: &Arc<AppData>,
    ctx: RequestContext,
    institution_code: &str,
    role: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let roles = parse_role_filter(role)?;
    let pending = ApprovalCoordinator::new(app_data.clone())
        .list_pending_for_institution(&ctx, institution_code, roles.as_deref())
        .await?;

    if pending.is_empty() {
        println!("No pending approval requests for {}.", institution_code);
        return Ok(());
    }

    println!("Pending approval requests for {}:", institution_code);
    for item in pending {
        println!();
        println!("   Request:    {}", item.request.id);
        println!("   User:       {}", item.request.user_id);
        println!("   Name:       {} <{}>", item.full_name, item.email);
        println!("   Role:       {}", item.request.requested_role);
        if let Some(department) = item.department {
            println!("   Department: {}", department);
        }
    }

    Ok(())
}

pub async fn approve(
    app_data: &Arc<AppData>,
    ctx: RequestContext,
    request_id: &str,
    user_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let decision = ApprovalCoordinator::new(app_data.clone())
        .approve(&ctx, request_id, user_id)
        .await?;

    println!("✅ Request {} approved for user {}.", decision.request_id, decision.user_id);
    Ok(())
}

pub async fn reject(
    app_data: &Arc<AppData>,
    ctx: RequestContext,
    request_id: &str,
    user_id: &str,
    remarks: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let decision = ApprovalCoordinator::new(app_data.clone())
        .reject(&ctx, request_id, user_id, remarks)
        .await?;

    println!("✅ Request {} rejected for user {}.", decision.request_id, decision.user_id);
    Ok(())
}
