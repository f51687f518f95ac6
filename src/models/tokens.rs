use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// One-time token handed out by a manager and redeemed by a student.
///
/// `is_used`, `owned_by` and `used_at` are always set together.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Token {
    pub id: i64,
    pub token_value: String,
    pub issued_by: i64,
    pub owned_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub is_used: bool,
}

impl Token {
    pub fn redeem(&mut self, redeemer_id: i64, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.is_used {
            return Err(DomainError::Conflict(format!(
                "Token {} is already used",
                self.token_value
            )));
        }

        self.is_used = true;
        self.owned_by = Some(redeemer_id);
        self.used_at = Some(now);

        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct NewToken {
    pub token_value: String,
    pub issued_by: i64,
}

impl NewToken {
    pub fn into_token(self, id: i64, created_at: DateTime<Utc>) -> Token {
        Token {
            id,
            token_value: self.token_value,
            issued_by: self.issued_by,
            owned_by: None,
            created_at,
            used_at: None,
            is_used: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeem_is_one_shot() {
        let mut token = NewToken {
            token_value: "ABC123".to_string(),
            issued_by: 2,
        }
        .into_token(1, Utc::now());

        let first = Utc::now();
        token.redeem(9, first).unwrap();
        assert!(token.is_used);
        assert_eq!(token.owned_by, Some(9));
        assert_eq!(token.used_at, Some(first));

        assert!(matches!(
            token.redeem(10, Utc::now()),
            Err(DomainError::Conflict(_))
        ));
        assert_eq!(token.owned_by, Some(9));
        assert_eq!(token.used_at, Some(first));
    }

    #[test]
    fn issuer_may_redeem_own_token() {
        let mut token = NewToken {
            token_value: "SELF".to_string(),
            issued_by: 2,
        }
        .into_token(1, Utc::now());

        token.redeem(2, Utc::now()).unwrap();
        assert_eq!(token.owned_by, Some(token.issued_by));
    }
}
