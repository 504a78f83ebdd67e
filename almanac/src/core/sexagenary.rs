//! Sexagenary (stem-branch) cycle arithmetic.
//!
//! A day, month, year or hour is named by one of 10 heavenly stems and one of
//! 12 earthly branches. Advancing both in lockstep yields a 60-term cycle made
//! of six decades ("xun"); each decade leaves two branches without a stem,
//! the void branches ("kong wang").

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Heavenly stems in cycle order.
pub const STEMS: [char; 10] = ['甲', '乙', '丙', '丁', '戊', '己', '庚', '辛', '壬', '癸'];

/// Earthly branches in cycle order.
pub const BRANCHES: [char; 12] = [
    '子', '丑', '寅', '卯', '辰', '巳', '午', '未', '申', '酉', '戌', '亥',
];

/// A stem-branch code could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid stem-branch code '{code}': {reason}")]
pub struct InvalidCodeError {
    pub code: String,
    pub reason: String,
}

impl InvalidCodeError {
    fn new(code: &str, reason: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Stem(u8);

impl Stem {
    pub fn from_char(c: char) -> Option<Self> {
        STEMS.iter().position(|s| *s == c).map(|i| Self(i as u8))
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    pub fn as_char(self) -> char {
        STEMS[self.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Branch(u8);

impl Branch {
    pub fn from_char(c: char) -> Option<Self> {
        BRANCHES.iter().position(|b| *b == c).map(|i| Self(i as u8))
    }

    /// Branch at `index`, wrapping around the 12-branch cycle.
    pub fn from_index(index: usize) -> Self {
        Self((index % BRANCHES.len()) as u8)
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    pub fn as_char(self) -> char {
        BRANCHES[self.index()]
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Two-character stem-branch code such as `甲子`.
///
/// Any of the 10×12 combinations parses. Only same-parity pairs occur in the
/// real 60-term cycle; see [`StemBranch::cycle_position`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StemBranch {
    pub stem: Stem,
    pub branch: Branch,
}

impl StemBranch {
    pub fn new(stem: Stem, branch: Branch) -> Self {
        Self { stem, branch }
    }

    /// Branch index on which this pair's decade starts (the branch paired with `甲`).
    pub fn decade_start(self) -> usize {
        (self.branch.index() + BRANCHES.len() - self.stem.index()) % BRANCHES.len()
    }

    /// The pair that opens this pair's decade.
    pub fn decade_head(self) -> StemBranch {
        StemBranch::new(Stem(0), Branch::from_index(self.decade_start()))
    }

    /// 0-based position within the 60-term cycle, or `None` for a pair that
    /// never occurs in it (stem and branch of different parity).
    pub fn cycle_position(self) -> Option<usize> {
        if self.stem.index() % 2 != self.branch.index() % 2 {
            return None;
        }
        (0..60).find(|n| {
            n % STEMS.len() == self.stem.index() && n % BRANCHES.len() == self.branch.index()
        })
    }
}

impl FromStr for StemBranch {
    type Err = InvalidCodeError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let mut chars = code.chars();
        let (Some(stem_char), Some(branch_char), None) = (chars.next(), chars.next(), chars.next())
        else {
            return Err(InvalidCodeError::new(code, "expected exactly two characters"));
        };
        let stem = Stem::from_char(stem_char)
            .ok_or_else(|| InvalidCodeError::new(code, format!("'{stem_char}' is not a heavenly stem")))?;
        let branch = Branch::from_char(branch_char).ok_or_else(|| {
            InvalidCodeError::new(code, format!("'{branch_char}' is not an earthly branch"))
        })?;
        Ok(Self { stem, branch })
    }
}

impl fmt::Display for StemBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem, self.branch)
    }
}

/// The two branches left without a stem in `pair`'s decade, in cycle order.
pub fn void_branches(pair: StemBranch) -> (Branch, Branch) {
    let start = pair.decade_start();
    (Branch::from_index(start + 10), Branch::from_index(start + 11))
}

/// Parse `code` and return its void branches concatenated, e.g. `"戌亥"`.
pub fn void_branches_for_code(code: &str) -> Result<String, InvalidCodeError> {
    let pair: StemBranch = code.parse()?;
    let (first, second) = void_branches(pair);
    Ok(format!("{first}{second}"))
}
