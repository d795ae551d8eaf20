use sea_orm::entity::prelude::*;

/// User account. Ordinary users are never hard-deleted; administrative
/// accounts may be.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    /// argon2 PHC string.
    pub password: String,
    pub phone_number: String,
    pub photo: String,
    pub dob: Option<chrono::NaiveDate>,
    pub otp: Option<String>,
    /// `ACTIVATED` or `DEACTIVATED`.
    pub status: String,
    #[sea_orm(unique)]
    pub forgot_password_token: Option<String>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::user_roles::Entity")]
    UserRole,
}

impl Related<super::user_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRole.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
