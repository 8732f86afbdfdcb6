//! Campaign invite codes and membership rules.

use rand::Rng;

use crate::error::CoreError;
use crate::types::DbId;

pub const INVITE_CODE_LENGTH: usize = 8;

/// Generate a fresh invite code: uppercase ASCII letters and digits.
pub fn generate_invite_code() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(INVITE_CODE_LENGTH)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect()
}

/// Normalize a user-typed invite code and check its shape.
pub fn normalize_invite_code(code: &str) -> Result<String, CoreError> {
    let code = code.trim().to_ascii_uppercase();
    if code.len() != INVITE_CODE_LENGTH || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CoreError::Validation("Invalid invite code".into()));
    }
    Ok(code)
}

/// Whether `user_id` may remove a character from a campaign: the campaign
/// owner may remove anyone, players only their own characters.
pub fn can_remove_character(
    user_id: DbId,
    campaign_owner_id: DbId,
    character_owner_id: DbId,
) -> bool {
    user_id == campaign_owner_id || user_id == character_owner_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_valid() {
        for _ in 0..50 {
            let code = generate_invite_code();
            assert_eq!(code.len(), INVITE_CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
            assert_eq!(normalize_invite_code(&code).unwrap(), code);
        }
    }

    #[test]
    fn normalize_uppercases_and_trims() {
        assert_eq!(normalize_invite_code(" ab12cd34 ").unwrap(), "AB12CD34");
        assert!(normalize_invite_code("short").is_err());
        assert!(normalize_invite_code("AB12-D34").is_err());
    }

    #[test]
    fn removal_rights() {
        assert!(can_remove_character(1, 1, 2));
        assert!(can_remove_character(2, 1, 2));
        assert!(!can_remove_character(3, 1, 2));
    }
}
