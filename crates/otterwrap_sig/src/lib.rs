//! Call-boundary signature identities.
//!
//! A wrapper is identified by *how* a call crosses the boundary ([`CallKind`])
//! and by the exact parameter/return shape it adapts ([`FunctionSig`]).
//! [`SignatureKey`] pairs the two into a hashable, structurally compared key.

pub mod call_kind;
pub mod error;
pub mod key;
pub mod sig;
pub mod value;

pub use call_kind::CallKind;
pub use error::SigParseError;
pub use key::SignatureKey;
pub use sig::FunctionSig;
pub use value::ValueKind;
