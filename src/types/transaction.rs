//! Transaction-related types for the ledger validator
//!
//! A transaction pays a fee and carries an ordered list of instructions. Each
//! instruction changes one account either by a literal amount or by the
//! current balance of another account.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "fee": { "payer": "alice", "amount": 1 },
//!   "instructions": [
//!     { "account": "alice", "change": -10 },
//!     { "account": "bob",   "change": { "account": "carol", "sign": "plus" } }
//!   ]
//! }
//! ```

use super::account::AccountId;
use super::error::LedgerError;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Fee paid by a transaction to the validator account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    /// Account that pays the fee
    pub payer: AccountId,

    /// Fee amount; must be positive
    pub amount: i64,
}

impl Fee {
    /// Create a new fee
    pub fn new(payer: &str, amount: i64) -> Self {
        Self {
            payer: payer.to_string(),
            amount,
        }
    }
}

/// Direction of an account reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    /// Add the referenced balance
    Plus,
    /// Subtract the referenced balance
    Minus,
}

impl Sign {
    /// Wire representation of the sign
    pub fn as_str(&self) -> &'static str {
        match self {
            Sign::Plus => "plus",
            Sign::Minus => "minus",
        }
    }
}

impl FromStr for Sign {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plus" => Ok(Sign::Plus),
            "minus" => Ok(Sign::Minus),
            other => Err(LedgerError::invalid_sign(other)),
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Amount an instruction adds to its account
///
/// Exactly one of two shapes: a literal signed integer, or the current
/// balance of another account with a sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Literal signed amount
    Direct(i64),

    /// Current balance of `account`, added or subtracted
    Reference {
        /// Account whose balance is read at resolution time
        account: AccountId,
        /// Whether the balance is added or subtracted
        sign: Sign,
    },
}

impl Change {
    /// Create an account reference change
    pub fn reference(account: &str, sign: Sign) -> Self {
        Change::Reference {
            account: account.to_string(),
            sign,
        }
    }

    /// Decode a change from JSON text
    ///
    /// Accepts a bare integer or `{"account": .., "sign": "plus"|"minus"}`.
    pub fn from_json(text: &str) -> Result<Self, LedgerError> {
        serde_json::from_str(text).map_err(|e| LedgerError::malformed_change(e.to_string()))
    }
}

impl Serialize for Change {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Change::Direct(value) => serializer.serialize_i64(*value),
            Change::Reference { account, sign } => {
                let mut state = serializer.serialize_struct("Change", 2)?;
                state.serialize_field("account", account)?;
                state.serialize_field("sign", sign)?;
                state.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Change {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ChangeVisitor)
    }
}

struct ChangeVisitor;

impl<'de> Visitor<'de> for ChangeVisitor {
    type Value = Change;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or an object with 'account' and 'sign'")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Change, E> {
        Ok(Change::Direct(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Change, E> {
        i64::try_from(value).map(Change::Direct).map_err(|_| {
            E::custom(LedgerError::malformed_change(format!(
                "value {value} does not fit a signed 64-bit integer"
            )))
        })
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Change, E> {
        // Integral floats such as `5.0` are accepted; anything with a fraction is not.
        if value.is_finite()
            && value.fract() == 0.0
            && value >= i64::MIN as f64
            && value < i64::MAX as f64
        {
            Ok(Change::Direct(value as i64))
        } else {
            Err(E::custom(LedgerError::malformed_change(format!(
                "value {value} is not an integer"
            ))))
        }
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Change, A::Error> {
        let mut account: Option<String> = None;
        let mut sign: Option<String> = None;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "account" => {
                    if account.is_some() {
                        return Err(de::Error::duplicate_field("account"));
                    }
                    account = Some(map.next_value()?);
                }
                "sign" => {
                    if sign.is_some() {
                        return Err(de::Error::duplicate_field("sign"));
                    }
                    sign = Some(map.next_value()?);
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        let account = account.ok_or_else(|| de::Error::missing_field("account"))?;
        let sign = sign.ok_or_else(|| de::Error::missing_field("sign"))?;

        if account.is_empty() {
            return Err(de::Error::custom(LedgerError::malformed_change(
                "reference account cannot be empty",
            )));
        }
        let sign = sign.parse::<Sign>().map_err(de::Error::custom)?;

        Ok(Change::Reference { account, sign })
    }
}

/// One balance change within a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// Account whose balance changes
    pub account: AccountId,

    /// Amount added to the account
    pub change: Change,
}

impl Instruction {
    /// Instruction with a literal amount
    pub fn direct(account: &str, value: i64) -> Self {
        Self {
            account: account.to_string(),
            change: Change::Direct(value),
        }
    }

    /// Instruction that adds or subtracts another account's balance
    pub fn reference(account: &str, referenced: &str, sign: Sign) -> Self {
        Self {
            account: account.to_string(),
            change: Change::reference(referenced, sign),
        }
    }
}

/// Signed-intent transaction received from a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Fee paid to the validator account
    pub fee: Fee,

    /// Ordered balance changes
    pub instructions: Vec<Instruction>,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(fee: Fee, instructions: Vec<Instruction>) -> Self {
        Self { fee, instructions }
    }

    /// Accounts this transaction reads or writes
    ///
    /// The fee payer plus every instruction account. Accounts that are only
    /// referenced through a [`Change::Reference`] are not included.
    pub fn touched_accounts(&self) -> HashSet<&str> {
        std::iter::once(self.fee.payer.as_str())
            .chain(self.instructions.iter().map(|i| i.account.as_str()))
            .collect()
    }
}
