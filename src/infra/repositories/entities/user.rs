//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 hash
    pub password: String,
    pub name: String,
    pub disabled: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::users_role::Entity")]
    UsersRole,
}

impl Related<super::users_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UsersRole.def()
    }
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        super::users_role::Relation::Role.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::users_role::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
