use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::{SigParseError, ValueKind};

/// Ordered parameter and return kinds of a function.
///
/// Returns and parameters live in one immutable slice, returns first. Clones
/// share that slice, so a [`crate::SignatureKey`] built from a module's
/// signature points at the module's storage instead of copying it.
/// Equality and hashing are structural: two signatures built independently
/// from the same kinds compare and hash equal.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FunctionSig {
    return_count: usize,
    reps: Arc<[ValueKind]>,
}

impl FunctionSig {
    pub fn new(
        params: impl IntoIterator<Item = ValueKind>,
        returns: impl IntoIterator<Item = ValueKind>,
    ) -> Self {
        let mut reps: Vec<ValueKind> = returns.into_iter().collect();
        let return_count = reps.len();
        reps.extend(params);
        Self {
            return_count,
            reps: reps.into(),
        }
    }

    /// `() -> ()`.
    pub fn empty() -> Self {
        Self::new([], [])
    }

    pub fn params(&self) -> &[ValueKind] {
        &self.reps[self.return_count..]
    }

    pub fn returns(&self) -> &[ValueKind] {
        &self.reps[..self.return_count]
    }

    pub fn param_count(&self) -> usize {
        self.reps.len() - self.return_count
    }

    pub fn return_count(&self) -> usize {
        self.return_count
    }

    pub fn is_empty(&self) -> bool {
        self.reps.is_empty()
    }

    pub fn contains(&self, kind: ValueKind) -> bool {
        self.reps.contains(&kind)
    }

    /// Whether both signatures read from the same backing slice.
    pub fn shares_storage_with(&self, other: &FunctionSig) -> bool {
        Arc::ptr_eq(&self.reps, &other.reps)
    }

    /// Compact name: return codes, `_`, parameter codes (`d_il` for
    /// `(i32, i64) -> f64`).
    pub fn short_name(&self) -> String {
        let mut name = String::with_capacity(self.reps.len() + 1);
        name.extend(self.returns().iter().map(|kind| kind.short_code()));
        name.push('_');
        name.extend(self.params().iter().map(|kind| kind.short_code()));
        name
    }
}

impl Default for FunctionSig {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for FunctionSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionSig({self})")
    }
}

impl fmt::Display for FunctionSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, self.params())?;
        f.write_str(" -> ")?;
        write_list(f, self.returns())
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, kinds: &[ValueKind]) -> fmt::Result {
    f.write_str("(")?;
    for (i, kind) in kinds.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{kind}")?;
    }
    f.write_str(")")
}

impl FromStr for FunctionSig {
    type Err = SigParseError;

    /// Accepts `i32, i64 -> f64`, `(i32) -> (i32)`, `() -> ()`, `-> i32`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (params, returns) = s
            .split_once("->")
            .ok_or_else(|| SigParseError::MissingArrow(s.trim().to_string()))?;
        Ok(Self::new(parse_list(params)?, parse_list(returns)?))
    }
}

fn parse_list(list: &str) -> Result<Vec<ValueKind>, SigParseError> {
    let list = list.trim();
    let list = list
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(list);

    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::parse)
        .collect()
}
