//! [`Price`]-related definitions.

use std::{fmt, str::FromStr};

#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

/// Strictly positive monetary amount.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Price(Decimal);

impl Price {
    /// Creates a new [`Price`] if the given `amount` is valid.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        amount.is_sign_positive()
            .then_some(Self(amount))
            .filter(|p| !p.0.is_zero())
    }

    /// Creates a new [`Price`] without checking the given `amount`.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `amount` is strictly positive.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Returns the underlying [`Decimal`] amount of this [`Price`].
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Price {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s).map_err(|_| "invalid amount")?;
        Self::new(amount).ok_or("`Price` must be positive")
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    //! Module providing integration with [`serde`] crate.

    use rust_decimal::Decimal;
    use serde::{de::Error as _, Deserialize, Deserializer, Serialize,
                Serializer};

    use super::Price;

    impl Serialize for Price {
        fn serialize<S: Serializer>(
            &self,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            // Fully-qualified: `Decimal` has an inherent binary
            // `serialize` method shadowing the trait one.
            Serialize::serialize(&self.0, serializer)
        }
    }

    impl<'de> Deserialize<'de> for Price {
        fn deserialize<D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Self, D::Error> {
            Self::new(<Decimal as Deserialize>::deserialize(deserializer)?)
                .ok_or_else(|| D::Error::custom("`Price` must be positive"))
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::Price;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn accepts_positive() {
        assert_eq!(
            Price::new(decimal("250000.50")).unwrap().amount(),
            decimal("250000.50"),
        );
        assert_eq!(Price::from_str("0.01").unwrap().amount(), decimal("0.01"));
    }

    #[test]
    fn rejects_zero_and_negative() {
        assert!(Price::new(decimal("0")).is_none());
        assert!(Price::new(decimal("-1")).is_none());
        assert!(Price::from_str("-250000").is_err());
        assert!(Price::from_str("not a number").is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_decimal() {
        let price = Price::new(decimal("250000.50")).unwrap();

        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"250000.50\"");

        let restored: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, price);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializing_rejects_non_positive() {
        assert!(serde_json::from_str::<Price>("\"0\"").is_err());
        assert!(serde_json::from_str::<Price>("\"-42\"").is_err());
    }
}
