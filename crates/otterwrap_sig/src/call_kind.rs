use std::fmt;
use std::str::FromStr;

use otterwrap_utils::find_best_match;
use serde::{Deserialize, Serialize};

use crate::SigParseError;

/// Strategy used to adapt a call across the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum CallKind {
    /// The import could not be linked; the wrapper throws a link error.
    LinkError = 0,
    /// The signature cannot cross the boundary; the wrapper throws a type error.
    RuntimeTypeError = 1,
    /// The callee already speaks the caller's representation.
    #[serde(alias = "direct")]
    DirectAdapter = 2,
    /// Host callee whose declared arity matches the parameter count.
    ArityMatch = 3,
    /// Host callee whose declared arity differs; arguments are padded or dropped.
    ArityMismatch = 4,
    /// Host callee of unknown shape; every call goes through the generic path.
    #[serde(alias = "generic")]
    GenericAdapter = 5,
}

impl CallKind {
    pub const ALL: [CallKind; 6] = [
        CallKind::LinkError,
        CallKind::RuntimeTypeError,
        CallKind::DirectAdapter,
        CallKind::ArityMatch,
        CallKind::ArityMismatch,
        CallKind::GenericAdapter,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            CallKind::LinkError => "link-error",
            CallKind::RuntimeTypeError => "runtime-type-error",
            CallKind::DirectAdapter => "direct-adapter",
            CallKind::ArityMatch => "arity-match",
            CallKind::ArityMismatch => "arity-mismatch",
            CallKind::GenericAdapter => "generic-adapter",
        }
    }

    /// Wrappers of these kinds never reach the callee.
    pub fn always_throws(self) -> bool {
        matches!(self, CallKind::LinkError | CallKind::RuntimeTypeError)
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CallKind {
    type Err = SigParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "generic" => return Ok(CallKind::GenericAdapter),
            "direct" => return Ok(CallKind::DirectAdapter),
            _ => {}
        }
        CallKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| SigParseError::UnknownCallKind {
                suggestion: find_best_match(&name, CallKind::ALL.iter().map(|k| k.name())),
                name,
            })
    }
}
