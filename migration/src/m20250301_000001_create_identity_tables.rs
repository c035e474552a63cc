use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Credentialed identities
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Accounts::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Accounts::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Accounts::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Accounts::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // institution_code uniqueness is the authority for code conflicts
        manager
            .create_table(
                Table::create()
                    .table(Organizations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Organizations::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Organizations::Name).string().not_null())
                    .col(ColumnDef::new(Organizations::Email).string().not_null())
                    .col(ColumnDef::new(Organizations::InstitutionCode).string().not_null().unique_key())
                    .col(ColumnDef::new(Organizations::SubscriptionStatus).string().not_null().default("trial"))
                    .col(ColumnDef::new(Organizations::Address).string().null())
                    .col(ColumnDef::new(Organizations::Phone).string().null())
                    .col(ColumnDef::new(Organizations::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Organizations::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Profiles::UserId).string().not_null().primary_key())
                    .col(ColumnDef::new(Profiles::FullName).string().not_null())
                    .col(ColumnDef::new(Profiles::Email).string().not_null())
                    .col(ColumnDef::new(Profiles::Department).string().null())
                    .col(ColumnDef::new(Profiles::OrganizationId).string().null())
                    .col(ColumnDef::new(Profiles::ApprovalStatus).string_len(16).null())
                    .col(ColumnDef::new(Profiles::IsVerified).boolean().not_null().default(false))
                    .col(ColumnDef::new(Profiles::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Profiles::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profiles_user_id")
                            .from(Profiles::Table, Profiles::UserId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profiles_organization_id")
                            .from(Profiles::Table, Profiles::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_profiles_organization_id")
                    .table(Profiles::Table)
                    .col(Profiles::OrganizationId)
                    .to_owned(),
            )
            .await?;

        // role is free text; the resolver rejects values outside the vocabulary
        manager
            .create_table(
                Table::create()
                    .table(UserRoles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserRoles::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(UserRoles::UserId).string().not_null())
                    .col(ColumnDef::new(UserRoles::Role).string().not_null())
                    .col(ColumnDef::new(UserRoles::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_roles_user_id")
                            .from(UserRoles::Table, UserRoles::UserId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_roles_user_id")
                    .table(UserRoles::Table)
                    .col(UserRoles::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ApprovalRequests::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ApprovalRequests::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(ApprovalRequests::UserId).string().not_null())
                    .col(ColumnDef::new(ApprovalRequests::ApproverId).string().null())
                    .col(ColumnDef::new(ApprovalRequests::RequestedRole).string().not_null())
                    .col(ColumnDef::new(ApprovalRequests::Status).string_len(16).not_null().default("pending"))
                    .col(ColumnDef::new(ApprovalRequests::Remarks).string().null())
                    .col(ColumnDef::new(ApprovalRequests::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(ApprovalRequests::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_approval_requests_user_id")
                            .from(ApprovalRequests::Table, ApprovalRequests::UserId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_approval_requests_status")
                    .table(ApprovalRequests::Table)
                    .col(ApprovalRequests::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OtpVerifications::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OtpVerifications::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(OtpVerifications::UserId).string().not_null())
                    .col(ColumnDef::new(OtpVerifications::Email).string().not_null())
                    .col(ColumnDef::new(OtpVerifications::VerificationType).string_len(32).not_null())
                    .col(ColumnDef::new(OtpVerifications::OtpHash).string().not_null())
                    .col(ColumnDef::new(OtpVerifications::OtpExpiry).big_integer().not_null())
                    .col(ColumnDef::new(OtpVerifications::IsVerified).boolean().not_null().default(false))
                    .col(ColumnDef::new(OtpVerifications::FailedAttempts).integer().not_null().default(0))
                    .col(ColumnDef::new(OtpVerifications::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_otp_verifications_user_id")
                            .from(OtpVerifications::Table, OtpVerifications::UserId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_otp_verifications_user_type")
                    .table(OtpVerifications::Table)
                    .col(OtpVerifications::UserId)
                    .col(OtpVerifications::VerificationType)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OtpVerifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ApprovalRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserRoles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Organizations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Email,
    PasswordHash,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
    Name,
    Email,
    InstitutionCode,
    SubscriptionStatus,
    Address,
    Phone,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Profiles {
    Table,
    UserId,
    FullName,
    Email,
    Department,
    OrganizationId,
    ApprovalStatus,
    IsVerified,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserRoles {
    Table,
    Id,
    UserId,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ApprovalRequests {
    Table,
    Id,
    UserId,
    ApproverId,
    RequestedRole,
    Status,
    Remarks,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OtpVerifications {
    Table,
    Id,
    UserId,
    Email,
    VerificationType,
    OtpHash,
    OtpExpiry,
    IsVerified,
    FailedAttempts,
    CreatedAt,
}
