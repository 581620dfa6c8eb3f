use crate::entities::accounts;
use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Bootstrap staff logins. Both passwords must be rotated after first login
/// on a real deployment.
const ADMIN_EMAIL: &str = "admin@univ.example";
const ADMIN_PASSWORD: &str = "admin123";
const LEADERSHIP_EMAIL: &str = "rector@univ.example";
const LEADERSHIP_PASSWORD: &str = "rector123";

fn hash_seed_password(password: &str) -> Result<String, DbErr> {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DbErr::Migration(format!("Failed to hash seed password: {e}")))
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = chrono::Utc::now().to_rfc3339();

        for (email, name, password, role) in [
            (ADMIN_EMAIL, "University Admin", ADMIN_PASSWORD, "ADMIN"),
            (
                LEADERSHIP_EMAIL,
                "University Rector",
                LEADERSHIP_PASSWORD,
                "LEADERSHIP",
            ),
        ] {
            let insert = sea_orm_migration::sea_query::Query::insert()
                .into_table(Accounts)
                .columns([
                    accounts::Column::Email,
                    accounts::Column::Name,
                    accounts::Column::PasswordHash,
                    accounts::Column::Role,
                    accounts::Column::CreatedAt,
                    accounts::Column::UpdatedAt,
                ])
                .values_panic([
                    email.into(),
                    name.into(),
                    hash_seed_password(password)?.into(),
                    role.into(),
                    now.clone().into(),
                    now.clone().into(),
                ])
                .to_owned();

            manager.exec_stmt(insert).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = sea_orm_migration::sea_query::Query::delete()
            .from_table(Accounts)
            .cond_where(
                sea_orm_migration::sea_query::Expr::col(accounts::Column::Email)
                    .is_in([ADMIN_EMAIL, LEADERSHIP_EMAIL]),
            )
            .to_owned();

        manager.exec_stmt(delete).await?;

        Ok(())
    }
}
