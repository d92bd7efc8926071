//! Invite code generation
//!
//! Codes are short lowercase alphanumeric tokens, unique across all rooms
//! (enforced by a unique index; generation retries on collision).

use rand::Rng;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use tracing::warn;

use crate::entities::rooms;

/// Invite code length
pub const CODE_LEN: usize = 8;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// How many collisions to tolerate before giving up
const MAX_ATTEMPTS: usize = 16;

/// Generate one candidate code.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Generate a code that no existing room uses.
pub async fn fresh_code(db: &DatabaseConnection) -> Result<String, DbErr> {
    for attempt in 0..MAX_ATTEMPTS {
        let code = generate_code();
        let taken = rooms::Entity::find()
            .filter(rooms::Column::InviteCode.eq(&code))
            .one(db)
            .await?
            .is_some();
        if !taken {
            return Ok(code);
        }
        warn!("Invite code collision on attempt {}", attempt + 1);
    }
    Err(DbErr::Custom(
        "Could not generate a unique invite code".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_shape() {
        let code = generate_code();
        assert_eq!(code.len(), CODE_LEN);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_codes_vary() {
        let a = generate_code();
        let b = generate_code();
        let c = generate_code();
        // Three straight collisions from a 36^8 space means a broken RNG
        assert!(!(a == b && b == c));
    }
}
