//! Coordinate move notation: `source + target [+ promotion]`, e.g. `e2e4`
//! or `e7e8q`. This is a pure format transform; legality is never checked.

use std::fmt;
use std::str::FromStr;

use shakmaty::{Role, Square};

/// A move in coordinate form. `promotion` is set iff the move carries a
/// fifth promotion-piece character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UciMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveFormatError {
    #[error("move string must be 4 or 5 characters, got {0}")]
    BadLength(usize),

    #[error("invalid square '{0}'")]
    BadSquare(String),

    #[error("invalid promotion piece '{0}'")]
    BadPromotion(char),
}

impl UciMove {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(from: Square, to: Square, role: Role) -> Self {
        Self {
            from,
            to,
            promotion: Some(role),
        }
    }
}

impl fmt::Display for UciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(role) = self.promotion {
            write!(f, "{}", role.char())?;
        }
        Ok(())
    }
}

impl FromStr for UciMove {
    type Err = MoveFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return Err(MoveFormatError::BadLength(s.chars().count()));
        }
        let from = s[0..2]
            .parse::<Square>()
            .map_err(|_| MoveFormatError::BadSquare(s[0..2].to_string()))?;
        let to = s[2..4]
            .parse::<Square>()
            .map_err(|_| MoveFormatError::BadSquare(s[2..4].to_string()))?;
        let promotion = match s.as_bytes().get(4) {
            None => None,
            Some(&b) => {
                let c = b.to_ascii_lowercase() as char;
                let role = Role::from_char(c).ok_or(MoveFormatError::BadPromotion(c))?;
                if !matches!(role, Role::Queen | Role::Rook | Role::Bishop | Role::Knight) {
                    return Err(MoveFormatError::BadPromotion(c));
                }
                Some(role)
            }
        };
        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}
