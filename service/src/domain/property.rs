//! [`Property`] definitions.

use std::collections::BTreeMap;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Price};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user;

/// Property listed for sale or rent.
#[derive(Clone, Debug)]
pub struct Property {
    /// ID of this [`Property`].
    pub id: Id,

    /// [`Title`] of this [`Property`].
    pub title: Title,

    /// [`Description`] of this [`Property`].
    pub description: Description,

    /// Asking [`Price`] of this [`Property`].
    pub price: Price,

    /// Composed [`Address`] of this [`Property`].
    pub address: Address,

    /// First address line of this [`Property`].
    pub address_line1: AddressLine1,

    /// Second address line of this [`Property`].
    pub address_line2: AddressLine2,

    /// [`City`] this [`Property`] is located in.
    pub city: City,

    /// [`County`] this [`Property`] is located in.
    pub county: County,

    /// [`Kind`] of this [`Property`].
    pub kind: Kind,

    /// [`Status`] of this [`Property`].
    pub status: Status,

    /// Number of bedrooms in this [`Property`].
    pub num_bedrooms: NumBedrooms,

    /// Number of bathrooms in this [`Property`].
    pub num_bathrooms: NumBathrooms,

    /// Interior area of this [`Property`].
    pub square_meters: SquareMeters,

    /// Year this [`Property`] was built in.
    pub year_built: YearBuilt,

    /// [`Latitude`] of this [`Property`].
    pub latitude: Latitude,

    /// [`Longitude`] of this [`Property`].
    pub longitude: Longitude,

    /// [`Features`] of this [`Property`].
    pub features: Features,

    /// ID of the [`User`] owning this [`Property`].
    ///
    /// [`User`]: super::User
    pub user_id: user::Id,

    /// [`DateTime`] when this [`Property`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Property`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Title of a [`Property`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `title` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        Self::check(&title).then_some(Self(title))
    }

    /// Checks whether the given `title` is a valid [`Title`].
    fn check(title: impl AsRef<str>) -> bool {
        let title = title.as_ref();
        title.trim() == title && !title.is_empty() && title.len() <= 256
    }
}

impl FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Title`")
    }
}

/// Description of a [`Property`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `text` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Creates a new [`Description`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        Self::check(&text).then_some(Self(text))
    }

    /// Checks whether the given `text` is a valid [`Description`].
    fn check(text: impl AsRef<str>) -> bool {
        let text = text.as_ref();
        !text.trim().is_empty() && text.len() <= 8192
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// First address line of a [`Property`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct AddressLine1(String);

impl AddressLine1 {
    /// Creates a new [`AddressLine1`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `line` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(line: impl Into<String>) -> Self {
        Self(line.into())
    }

    /// Creates a new [`AddressLine1`] if the given `line` is valid.
    #[must_use]
    pub fn new(line: impl Into<String>) -> Option<Self> {
        let line = line.into();
        Self::check(&line).then_some(Self(line))
    }

    /// Checks whether the given `line` is a valid [`AddressLine1`].
    fn check(line: impl AsRef<str>) -> bool {
        let line = line.as_ref();
        line.trim() == line && !line.is_empty() && line.len() <= 512
    }
}

impl FromStr for AddressLine1 {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `AddressLine1`")
    }
}

/// Second address line of a [`Property`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct AddressLine2(String);

impl AddressLine2 {
    /// Creates a new [`AddressLine2`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `line` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(line: impl Into<String>) -> Self {
        Self(line.into())
    }

    /// Creates a new [`AddressLine2`] if the given `line` is valid.
    #[must_use]
    pub fn new(line: impl Into<String>) -> Option<Self> {
        let line = line.into();
        Self::check(&line).then_some(Self(line))
    }

    /// Checks whether the given `line` is a valid [`AddressLine2`].
    fn check(line: impl AsRef<str>) -> bool {
        let line = line.as_ref();
        line.trim() == line && !line.is_empty() && line.len() <= 512
    }
}

impl FromStr for AddressLine2 {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `AddressLine2`")
    }
}

/// City of a [`Property`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct City(String);

impl City {
    /// Creates a new [`City`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `city` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(city: impl Into<String>) -> Self {
        Self(city.into())
    }

    /// Creates a new [`City`] if the given `city` is valid.
    #[must_use]
    pub fn new(city: impl Into<String>) -> Option<Self> {
        let city = city.into();
        Self::check(&city).then_some(Self(city))
    }

    /// Checks whether the given `city` is a valid [`City`].
    fn check(city: impl AsRef<str>) -> bool {
        let city = city.as_ref();
        city.trim() == city && !city.is_empty() && city.len() <= 512
    }
}

impl FromStr for City {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `City`")
    }
}

/// County of a [`Property`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct County(String);

impl County {
    /// Creates a new [`County`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `county` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(county: impl Into<String>) -> Self {
        Self(county.into())
    }

    /// Creates a new [`County`] if the given `county` is valid.
    #[must_use]
    pub fn new(county: impl Into<String>) -> Option<Self> {
        let county = county.into();
        Self::check(&county).then_some(Self(county))
    }

    /// Checks whether the given `county` is a valid [`County`].
    fn check(county: impl AsRef<str>) -> bool {
        let county = county.as_ref();
        county.trim() == county && !county.is_empty() && county.len() <= 512
    }
}

impl FromStr for County {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `County`")
    }
}

/// Full address of a [`Property`], composed from its parts.
///
/// Stored alongside the parts so location search can match against a single
/// representation.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Address(String);

impl Address {
    /// Creates a new [`Address`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Address`] from its parts.
    #[must_use]
    pub fn from_parts(
        line1: &AddressLine1,
        line2: &AddressLine2,
        city: &City,
        county: &County,
    ) -> Self {
        let mut address = String::with_capacity(512);
        address.push_str(line1.as_ref());
        address.push_str(", ");
        address.push_str(line2.as_ref());
        address.push_str(", ");
        address.push_str(city.as_ref());
        address.push_str(", ");
        address.push_str(county.as_ref());
        Self(address)
    }
}

define_kind! {
    #[doc = "Kind of a [`Property`]."]
    enum Kind {
        #[doc = "An apartment in a building."]
        Apartment = 1,

        #[doc = "A standalone house."]
        House = 2,

        #[doc = "A commercial premise."]
        Commercial = 3,

        #[doc = "A plot of land."]
        Land = 4,
    }
}

define_kind! {
    #[doc = "Status of a [`Property`]."]
    enum Status {
        #[doc = "Open for offers."]
        Available = 1,

        #[doc = "Already sold."]
        Sold = 2,

        #[doc = "Already rented out."]
        Rented = 3,
    }
}

/// Number of bedrooms in a [`Property`].
pub type NumBedrooms = u16;

/// Number of bathrooms in a [`Property`].
pub type NumBathrooms = u16;

/// Interior area of a [`Property`] in square meters.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Into, PartialEq)]
pub struct SquareMeters(u32);

impl SquareMeters {
    /// Creates a new [`SquareMeters`] if the given `area` is valid.
    #[must_use]
    pub fn new(area: u32) -> Option<Self> {
        (area > 0).then_some(Self(area))
    }

    /// Creates a new [`SquareMeters`] without checking the given `area`.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `area` is strictly positive.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(area: u32) -> Self {
        Self(area)
    }
}

/// Year a [`Property`] was built in.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq,
         PartialOrd)]
pub struct YearBuilt(i32);

impl YearBuilt {
    /// Earliest year of construction accepted by this system.
    pub const MIN: i32 = 1900;

    /// Creates a new [`YearBuilt`] if the given `year` is valid.
    #[must_use]
    pub fn new(year: i32) -> Option<Self> {
        (year >= Self::MIN).then_some(Self(year))
    }
}

/// Geographic latitude of a [`Property`], in degrees.
#[derive(Clone, Copy, Debug, Display, Into, PartialEq, PartialOrd)]
pub struct Latitude(f64);

impl Latitude {
    /// Creates a new [`Latitude`] if the given `degrees` are valid.
    #[must_use]
    pub fn new(degrees: f64) -> Option<Self> {
        ((-90.0..=90.0).contains(&degrees)).then_some(Self(degrees))
    }
}

/// Geographic longitude of a [`Property`], in degrees.
#[derive(Clone, Copy, Debug, Display, Into, PartialEq, PartialOrd)]
pub struct Longitude(f64);

impl Longitude {
    /// Creates a new [`Longitude`] if the given `degrees` are valid.
    #[must_use]
    pub fn new(degrees: f64) -> Option<Self> {
        ((-180.0..=180.0).contains(&degrees)).then_some(Self(degrees))
    }
}

/// Features of a [`Property`], as presence flags keyed by feature name.
#[derive(Clone, Debug, Default, Deserialize, Eq, From, PartialEq, Serialize)]
pub struct Features(BTreeMap<String, bool>);

impl Features {
    /// Normalizes the provided [`FeaturesInput`] into [`Features`].
    ///
    /// Clients send features either as a JSON-encoded string or as an
    /// already-structured mapping. Both normalize to the same value.
    ///
    /// # Errors
    ///
    /// If the string form is not a valid JSON mapping of booleans.
    pub fn normalize(input: FeaturesInput) -> Result<Self, InvalidFeatures> {
        match input {
            FeaturesInput::Text(text) => serde_json::from_str(&text)
                .map(Self)
                .map_err(|_| InvalidFeatures),
            FeaturesInput::Map(map) => Ok(Self(map)),
        }
    }

    /// Returns the flags of this [`Features`] mapping.
    #[must_use]
    pub fn flags(&self) -> &BTreeMap<String, bool> {
        &self.0
    }
}

/// Raw `features` field of a listing request, before normalization.
#[derive(Clone, Debug, Deserialize, Eq, From, PartialEq)]
#[serde(untagged)]
pub enum FeaturesInput {
    /// Already-structured mapping.
    Map(BTreeMap<String, bool>),

    /// JSON-encoded string form.
    Text(String),
}

/// Error of normalizing a [`FeaturesInput`] string form.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("invalid JSON in `features` field")]
pub struct InvalidFeatures;

/// [`DateTime`] when a [`Property`] was created.
pub type CreationDateTime = DateTimeOf<(Property, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{
        Features, FeaturesInput, Kind, Latitude, Longitude, SquareMeters,
        YearBuilt,
    };

    #[test]
    fn features_string_and_map_forms_normalize_identically() {
        let from_text = Features::normalize(FeaturesInput::Text(
            r#"{"pool":true,"garage":false}"#.to_owned(),
        ))
        .unwrap();
        let from_map = Features::normalize(FeaturesInput::Map(
            [("pool".to_owned(), true), ("garage".to_owned(), false)]
                .into_iter()
                .collect(),
        ))
        .unwrap();

        assert_eq!(from_text, from_map);
        assert_eq!(from_text.flags().get("pool"), Some(&true));
        assert_eq!(from_text.flags().get("garage"), Some(&false));
    }

    #[test]
    fn malformed_features_string_is_rejected() {
        assert!(Features::normalize(FeaturesInput::Text(
            "{pool:true".to_owned(),
        ))
        .is_err());
    }

    #[test]
    fn kind_parses_persistable_values_only() {
        assert_eq!("APARTMENT".parse::<Kind>().unwrap(), Kind::Apartment);
        assert_eq!("LAND".parse::<Kind>().unwrap(), Kind::Land);

        // The client-side schema also knows CONDO/TOWNHOUSE, which the
        // storage layer cannot persist. They are rejected here.
        assert!("CONDO".parse::<Kind>().is_err());
        assert!("TOWNHOUSE".parse::<Kind>().is_err());
    }

    #[test]
    fn ranges() {
        assert!(SquareMeters::new(0).is_none());
        assert!(SquareMeters::new(75).is_some());

        assert!(YearBuilt::new(1899).is_none());
        assert!(YearBuilt::new(1900).is_some());

        assert!(Latitude::new(90.0).is_some());
        assert!(Latitude::new(90.5).is_none());
        assert!(Longitude::new(-180.0).is_some());
        assert!(Longitude::new(-180.5).is_none());
    }
}
