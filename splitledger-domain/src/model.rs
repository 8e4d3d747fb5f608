use std::{
    collections::BTreeMap,
    fmt,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use chrono::{DateTime, Utc};
use rust_decimal::{prelude::ToPrimitive, Decimal};

use crate::error::MoneyParseError;

/// Largest decimal scale accepted when converting amounts to minor units.
pub const MAX_AMOUNT_SCALE: u32 = 18;

/// A money amount in minor units (e.g. cents, paise).
///
/// All engine arithmetic happens on this fixed-point integer; decimal strings
/// exist only at the boundary and are converted exactly once on each side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub fn zero() -> Self {
        Self(0)
    }

    pub fn from_i64(value: i64) -> Self {
        Self(value)
    }

    pub fn amount(self) -> i64 {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn signum(self) -> i64 {
        self.0.signum()
    }

    /// Parses a decimal string (e.g. `"100.00"`) into minor units at the given
    /// currency scale. Fails on sub-minor-unit fractions rather than rounding:
    /// the boundary conversion must be exact.
    pub fn parse_decimal_str(input: &str, scale: u32) -> Result<Self, MoneyParseError> {
        if scale > MAX_AMOUNT_SCALE {
            return Err(MoneyParseError::UnsupportedScale {
                scale,
                max_supported: MAX_AMOUNT_SCALE,
            });
        }
        let value = Decimal::from_str(input.trim())
            .map_err(|_| MoneyParseError::InvalidDecimal(input.to_owned()))?;
        let factor = Decimal::from_i128_with_scale(10_i128.pow(scale), 0);
        let units = value
            .checked_mul(factor)
            .ok_or(MoneyParseError::OutOfRange)?;
        if units.fract() != Decimal::ZERO {
            return Err(MoneyParseError::SubMinorUnit { scale });
        }
        units.to_i64().map(Self).ok_or(MoneyParseError::OutOfRange)
    }

    /// Renders the amount as a decimal string at the given currency scale,
    /// keeping trailing zeros (`Money(10000)` at scale 2 is `"100.00"`).
    pub fn to_decimal_string(self, scale: u32) -> String {
        Decimal::new(self.0, scale).to_string()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberId(pub u64);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(pub u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpenseId(pub u64);

/// Currency code plus the number of decimal places in its minor unit.
/// The engine nets within a single currency per group; the code is carried
/// for the boundary, never interpreted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Currency {
    code: String,
    scale: u32,
}

impl Currency {
    pub fn new(code: impl Into<String>, scale: u32) -> Self {
        Self {
            code: code.into(),
            scale,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "INR" | "USD" | "EUR" => Some(Self::new(code, 2)),
            "JPY" => Some(Self::new(code, 0)),
            _ => None,
        }
    }

    pub fn inr() -> Self {
        Self::new("INR", 2)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }
}

/// How a shared expense is divided among its participants.
/// Fixed once an expense is created; changing it means re-deriving a whole
/// new split list, never mutating one in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SplitStrategy {
    Equal,
    Exact,
    Percentage,
    Shares,
}

impl SplitStrategy {
    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "equal" => Some(Self::Equal),
            "exact" => Some(Self::Exact),
            "percentage" => Some(Self::Percentage),
            "shares" => Some(Self::Shares),
            _ => None,
        }
    }
}

impl fmt::Display for SplitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Equal => "equal",
            Self::Exact => "exact",
            Self::Percentage => "percentage",
            Self::Shares => "shares",
        };
        f.write_str(name)
    }
}

/// One participant's entry in a proposed split. Exactly one of the optional
/// fields is meaningful, selected by the enclosing strategy; the others are
/// ignored for that strategy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticipantInput {
    pub member: MemberId,
    pub amount: Option<Money>,
    pub percentage: Option<Decimal>,
    pub shares: Option<u32>,
}

impl ParticipantInput {
    pub fn bare(member: MemberId) -> Self {
        Self {
            member,
            amount: None,
            percentage: None,
            shares: None,
        }
    }

    pub fn exact(member: MemberId, amount: Money) -> Self {
        Self {
            amount: Some(amount),
            ..Self::bare(member)
        }
    }

    pub fn percentage(member: MemberId, percentage: Decimal) -> Self {
        Self {
            percentage: Some(percentage),
            ..Self::bare(member)
        }
    }

    pub fn shares(member: MemberId, shares: u32) -> Self {
        Self {
            shares: Some(shares),
            ..Self::bare(member)
        }
    }
}

/// One participant's computed share of an expense.
///
/// `rounding_adjustment` is true for at most one split per expense: the one
/// that absorbed the reconciliation remainder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Split {
    pub member: MemberId,
    pub owed: Money,
    pub rounding_adjustment: bool,
}

/// A recorded shared cost. Splits are kept in participant input order so
/// remainder placement is reproducible.
#[derive(Clone, Debug, PartialEq)]
pub struct Expense {
    pub id: ExpenseId,
    pub group: GroupId,
    pub payer: MemberId,
    pub total: Money,
    pub currency: Currency,
    pub date: DateTime<Utc>,
    pub strategy: SplitStrategy,
    pub splits: Vec<Split>,
}

/// Net balance per member, derived on demand from the expense and settlement
/// history, never stored. Keyed by a `BTreeMap` so iteration order is stable
/// for deterministic tie-breaks downstream.
pub type MemberBalances = BTreeMap<MemberId, Money>;

/// A proposed pairwise payment from the settlement plan: `from` (debtor) pays
/// `to` (creditor). Always positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

/// A confirmed real-world payment recorded by the persistence collaborator.
/// Once recorded it pulls both parties toward zero in every later aggregation.
#[derive(Clone, Debug, PartialEq)]
pub struct Settlement {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
    pub settled_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// What a single expense did to one member's position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExpensePosition {
    pub paid: Money,
    pub share: Money,
    pub lent: Money,
    pub borrowed: Money,
}
