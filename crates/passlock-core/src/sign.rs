//! Passcode signs and entered sequences

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::SignError;

/// One entered symbol of a passcode
///
/// The alphabet is the ten decimal digits, matching a numeric keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Zeroize)]
pub struct PasscodeSign(u8);

impl PasscodeSign {
    /// Keypad alphabet in display order
    pub const ALPHABET: [char; 10] = ['1', '2', '3', '4', '5', '6', '7', '8', '9', '0'];

    /// Create a sign from a digit value (0-9)
    pub fn from_digit(digit: u8) -> Result<Self, SignError> {
        if digit > 9 {
            return Err(SignError::InvalidDigit(digit));
        }
        Ok(Self(digit))
    }

    /// Digit value of this sign
    pub fn digit(self) -> u8 {
        self.0
    }

    /// Character shown on the keypad for this sign
    pub fn as_char(self) -> char {
        char::from(b'0' + self.0)
    }
}

impl TryFrom<char> for PasscodeSign {
    type Error = SignError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        c.to_digit(10)
            .map(|d| Self(d as u8))
            .ok_or(SignError::InvalidSign(c))
    }
}

impl FromStr for PasscodeSign {
    type Err = SignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::try_from(c),
            (None, _) => Err(SignError::Empty),
            (Some(_), Some(extra)) => Err(SignError::InvalidSign(extra)),
        }
    }
}

impl fmt::Display for PasscodeSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// An ordered sequence of signs (zeroized on drop)
///
/// Equality is exact ordered equality, which is the only comparison the
/// lock states perform.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Passcode(Vec<PasscodeSign>);

impl Passcode {
    /// Build a passcode from already validated signs
    pub fn from_signs(signs: Vec<PasscodeSign>) -> Self {
        Self(signs)
    }

    /// Signs in entry order
    pub fn signs(&self) -> &[PasscodeSign] {
        &self.0
    }

    /// Number of signs
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Digit string used by persistent repositories
    pub fn to_digit_string(&self) -> String {
        self.0.iter().map(|s| s.as_char()).collect()
    }
}

impl FromStr for Passcode {
    type Err = SignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(SignError::Empty);
        }
        s.chars()
            .map(PasscodeSign::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl fmt::Debug for Passcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Passcode([REDACTED; {}])", self.0.len())
    }
}

impl Serialize for Passcode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut digits = self.to_digit_string();
        let result = serializer.serialize_str(&digits);
        digits.zeroize();
        result
    }
}

impl<'de> Deserialize<'de> for Passcode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut s = String::deserialize(deserializer)?;
        let passcode = s.parse().map_err(serde::de::Error::custom);
        s.zeroize();
        passcode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_from_char() {
        assert_eq!(PasscodeSign::try_from('7').unwrap().digit(), 7);
        assert_eq!(
            PasscodeSign::try_from('a'),
            Err(SignError::InvalidSign('a'))
        );
        assert_eq!(PasscodeSign::from_digit(10), Err(SignError::InvalidDigit(10)));
    }

    #[test]
    fn test_sign_from_str() {
        assert_eq!("0".parse::<PasscodeSign>().unwrap().as_char(), '0');
        assert_eq!("".parse::<PasscodeSign>(), Err(SignError::Empty));
        assert_eq!("12".parse::<PasscodeSign>(), Err(SignError::InvalidSign('2')));
    }

    #[test]
    fn test_passcode_order_matters() {
        let a: Passcode = "1357".parse().unwrap();
        let b: Passcode = "7531".parse().unwrap();
        assert_ne!(a, b);
        assert_eq!(a, "1357".parse().unwrap());
        assert_eq!(a.to_digit_string(), "1357");
    }

    #[test]
    fn test_passcode_debug_is_redacted() {
        let passcode: Passcode = "2468".parse().unwrap();
        let debug = format!("{:?}", passcode);
        assert!(!debug.contains("2468"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_passcode_json() {
        let passcode: Passcode = "0042".parse().unwrap();
        let json = serde_json::to_string(&passcode).unwrap();
        assert_eq!(json, "\"0042\"");
        assert!(serde_json::from_str::<Passcode>("\"12x4\"").is_err());
    }
}
