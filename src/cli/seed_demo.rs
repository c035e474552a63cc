// Demo data for local development and walkthroughs

use std::sync::Arc;

use crate::app_data::AppData;
use crate::coordinators::DemoSeedCoordinator;
use crate::types::internal::context::RequestContext;

/// Seed the demo institution and print credentials for new accounts
///
/// Passwords are shown once; they are not stored anywhere in plain text.
pub async fn seed_demo(
    app_data: &Arc<AppData>,
    ctx: RequestContext,
    institution_code: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let seeded = DemoSeedCoordinator::new(app_data.clone())
        .seed(&ctx, institution_code)
        .await?;

    println!("Demo institution: {}", institution_code.trim().to_lowercase());
    println!();
    for account in &seeded {
        match &account.password {
            Some(password) => println!(
                "   {:<12} {:<22} {}",
                account.role.display_role().label(),
                account.email,
                password
            ),
            None => println!(
                "   {:<12} {:<22} (already exists, skipped)",
                account.role.display_role().label(),
                account.email
            ),
        }
    }
    println!();
    println!("⚠️  Save these passwords now. They will not be shown again.");

    Ok(())
}
