//! Coordinate move text as engines send it: source square, destination
//! square, optional promotion letter ("e2e4", "a7a8q").

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// Squares are indices in 0..64, rank-major: a1 = 0, b1 = 1, ..., h8 = 63.

/// Convert a square index to coordinate text ("e4").
pub fn sq_to_coord(sq: u8) -> String {
    let file = (b'a' + sq % 8) as char;
    let rank = (b'1' + sq / 8) as char;
    format!("{file}{rank}")
}

/// Parse coordinate text ("e4") into a square index.
pub fn coord_to_sq(text: &str) -> Option<u8> {
    let b = text.as_bytes();
    if b.len() != 2 {
        return None;
    }
    square_from_bytes(b[0], b[1])
}

fn square_from_bytes(file: u8, rank: u8) -> Option<u8> {
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }
    Some((rank - b'1') * 8 + (file - b'a'))
}

/// Promotion piece carried by a five-character move token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Promotion {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl Promotion {
    /// The lowercase letter used on the wire.
    pub fn letter(self) -> char {
        match self {
            Promotion::Queen => 'q',
            Promotion::Rook => 'r',
            Promotion::Bishop => 'b',
            Promotion::Knight => 'n',
        }
    }

    pub fn from_letter(ch: char) -> Option<Promotion> {
        match ch.to_ascii_lowercase() {
            'q' => Some(Promotion::Queen),
            'r' => Some(Promotion::Rook),
            'b' => Some(Promotion::Bishop),
            'n' => Some(Promotion::Knight),
            _ => None,
        }
    }
}

/// A move in wire form: two squares plus an optional promotion.
///
/// This is the only move representation the workspace passes around. It says
/// nothing about legality; [`crate::Game`] decides that.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UciMove {
    pub from: u8,
    pub to: u8,
    pub promotion: Option<Promotion>,
}

impl UciMove {
    pub fn new(from: u8, to: u8) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(from: u8, to: u8, promotion: Promotion) -> Self {
        Self {
            from,
            to,
            promotion: Some(promotion),
        }
    }
}

impl fmt::Display for UciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", sq_to_coord(self.from), sq_to_coord(self.to))?;
        if let Some(p) = self.promotion {
            write!(f, "{}", p.letter())?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MoveParseError {
    #[error("move text must be 4 or 5 characters, got {0}")]
    BadLength(usize),
    #[error("invalid square {0:?}")]
    BadSquare(String),
    #[error("invalid promotion letter {0:?}")]
    BadPromotion(char),
}

impl FromStr for UciMove {
    type Err = MoveParseError;

    /// Decode a move token. Exactly 4 or 5 characters: two for the source
    /// square, two for the destination, an optional promotion letter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let b = s.as_bytes();
        if b.len() != 4 && b.len() != 5 {
            return Err(MoveParseError::BadLength(b.len()));
        }
        let from = square_from_bytes(b[0], b[1])
            .ok_or_else(|| MoveParseError::BadSquare(String::from_utf8_lossy(&b[0..2]).into_owned()))?;
        let to = square_from_bytes(b[2], b[3])
            .ok_or_else(|| MoveParseError::BadSquare(String::from_utf8_lossy(&b[2..4]).into_owned()))?;
        let promotion = match b.get(4) {
            Some(&letter) => Some(
                Promotion::from_letter(letter as char)
                    .ok_or(MoveParseError::BadPromotion(letter as char))?,
            ),
            None => None,
        };
        Ok(UciMove {
            from,
            to,
            promotion,
        })
    }
}

#[cfg(test)]
#[path = "uci_tests.rs"]
mod uci_tests;
