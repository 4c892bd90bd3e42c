use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Currency code used for all balances and transaction amounts.
///
/// Girata is effectively mono-currency (the wallet is denominated in USDC),
/// but the engine models currency explicitly to keep the data model
/// future-proof.
///
/// ## Minor units
///
/// The engine stores monetary values as an `i64` number of **minor units**
/// (see [`Money`]). `minor_units()` returns how many decimal digits are used
/// when converting between major units (human input/output, e.g. `10.50`)
/// and minor units (stored integers, e.g. `1050`).
///
/// [`Money`]: crate::Money
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usdc,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Usdc => "USDC",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Usdc => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USDC" => Ok(Currency::Usdc),
            other => Err(EngineError::CurrencyMismatch(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}
