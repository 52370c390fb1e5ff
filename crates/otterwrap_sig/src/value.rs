use std::fmt;
use std::str::FromStr;

use otterwrap_utils::find_best_match;
use serde::{Deserialize, Serialize};

use crate::SigParseError;

/// Representation of a single parameter or return value at a call boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ValueKind {
    I32,
    I64,
    F32,
    F64,
    S128,
    AnyRef,
    FuncRef,
}

impl ValueKind {
    pub const ALL: [ValueKind; 7] = [
        ValueKind::I32,
        ValueKind::I64,
        ValueKind::F32,
        ValueKind::F64,
        ValueKind::S128,
        ValueKind::AnyRef,
        ValueKind::FuncRef,
    ];

    /// Stable byte used in key fingerprints.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueKind::I32 => "i32",
            ValueKind::I64 => "i64",
            ValueKind::F32 => "f32",
            ValueKind::F64 => "f64",
            ValueKind::S128 => "s128",
            ValueKind::AnyRef => "anyref",
            ValueKind::FuncRef => "funcref",
        }
    }

    /// One-letter code used in compact signature names.
    pub fn short_code(self) -> char {
        match self {
            ValueKind::I32 => 'i',
            ValueKind::I64 => 'l',
            ValueKind::F32 => 'f',
            ValueKind::F64 => 'd',
            ValueKind::S128 => 's',
            ValueKind::AnyRef => 'r',
            ValueKind::FuncRef => 'a',
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueKind {
    type Err = SigParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        ValueKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| SigParseError::UnknownValueKind {
                suggestion: find_best_match(&name, ValueKind::ALL.iter().map(|k| k.name())),
                name,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_names() {
        for kind in ValueKind::ALL {
            assert_eq!(kind.name().parse::<ValueKind>(), Ok(kind));
        }
        assert_eq!(" F64 ".parse::<ValueKind>(), Ok(ValueKind::F64));
    }

    #[test]
    fn unknown_name_carries_suggestion() {
        let err = "fucnref".parse::<ValueKind>().unwrap_err();
        assert_eq!(
            err,
            SigParseError::UnknownValueKind {
                name: "fucnref".into(),
                suggestion: Some("funcref"),
            }
        );
        assert!(err.to_string().contains("did you mean `funcref`"));
    }

    #[test]
    fn short_codes_are_unique() {
        let mut codes: Vec<char> = ValueKind::ALL.iter().map(|k| k.short_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), ValueKind::ALL.len());
    }
}
