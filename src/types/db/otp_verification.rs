use sea_orm::entity::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum VerificationType {
    #[sea_orm(string_value = "registration")]
    Registration,
    #[sea_orm(string_value = "password_reset")]
    PasswordReset,
}

impl VerificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::PasswordReset => "password_reset",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "otp_verifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub email: String,
    pub verification_type: VerificationType,
    /// HMAC-SHA256 of the code, hex encoded
    pub otp_hash: String,
    /// Epoch milliseconds
    pub otp_expiry: i64,
    pub is_verified: bool,
    /// Wrong guesses against this code
    pub failed_attempts: i32,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
