use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::{Keyed, Professor, Role, Student, User};
use crate::registry::{load_table, save_table};
use crate::repository::{Collection, PersistenceGateway};

pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify_password(plain: &str, hashed: &str) -> bool {
    hash_password(plain) == hashed
}

pub async fn find_user(
    gateway: &dyn PersistenceGateway,
    role: Role,
    user_id: &str,
) -> Result<Option<User>, AppError> {
    let user = match role {
        Role::Student => load_table::<Student>(gateway, role.collection())
            .await?
            .get(user_id)
            .cloned()
            .map(User::Student),
        Role::Professor => load_table::<Professor>(gateway, role.collection())
            .await?
            .get(user_id)
            .cloned()
            .map(User::Professor),
    };
    Ok(user)
}

pub async fn login(
    gateway: &dyn PersistenceGateway,
    role: Role,
    user_id: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    let user = find_user(gateway, role, user_id)
        .await?
        .filter(|u| verify_password(password, u.password_hash()));
    match &user {
        Some(_) => info!("{:?} {} logged in", role, user_id),
        None => warn!("failed login for {:?} {}", role, user_id),
    }
    Ok(user)
}

async fn replace_hash<T>(
    gateway: &dyn PersistenceGateway,
    collection: Collection,
    user_id: &str,
    new_hash: String,
    field: impl FnOnce(&mut T) -> &mut String,
) -> Result<bool, AppError>
where
    T: DeserializeOwned + Serialize + Keyed,
{
    let mut users = load_table::<T>(gateway, collection).await?;
    let Some(user) = users.get_mut(user_id) else {
        return Ok(false);
    };
    *field(user) = new_hash;
    save_table(gateway, collection, &users).await?;
    Ok(true)
}

/// Returns `false` when no such user exists.
pub async fn change_password(
    gateway: &dyn PersistenceGateway,
    role: Role,
    user_id: &str,
    new_password: &str,
) -> Result<bool, AppError> {
    let new_hash = hash_password(new_password);
    let changed = match role {
        Role::Student => {
            replace_hash::<Student>(gateway, role.collection(), user_id, new_hash, |s| {
                &mut s.password_hash
            })
            .await?
        }
        Role::Professor => {
            replace_hash::<Professor>(gateway, role.collection(), user_id, new_hash, |p| {
                &mut p.password_hash
            })
            .await?
        }
    };
    if changed {
        info!("password changed for {:?} {}", role, user_id);
    }
    Ok(changed)
}
