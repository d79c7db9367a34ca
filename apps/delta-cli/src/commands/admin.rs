//! `create-admin`

use domain_users::{MongoUserRepository, RegisterRequest, Role, UserService};
use mongodb::Database;
use tracing::info;
use validator::Validate;

pub async fn create_admin(
    db: &Database,
    email: String,
    first_name: String,
    last_name: String,
    password: String,
) -> eyre::Result<()> {
    let input = RegisterRequest {
        first_name,
        last_name,
        email,
        password,
        phone: None,
    };
    input.validate()?;

    let repository = MongoUserRepository::new(db);
    repository.init_indexes().await?;
    let service = UserService::new(repository);

    let admin = service.create_account(input, Role::Admin).await?;
    info!(user_id = %admin.id, email = %admin.email, "Admin account created");
    Ok(())
}
