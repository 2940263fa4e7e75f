//! [`Property`]-related read definitions.

#[cfg(doc)]
use crate::domain::Property;

pub mod search {
    //! [`Property`] search definitions.

    use common::{Pagination, Price};
    use derive_more::{From, Into};

    use crate::domain::{property, Image, Property};

    /// Selector of a [`Page`] of [`Property`]s.
    #[derive(Clone, Debug, Default)]
    pub struct Selector {
        /// [`Filter`] to narrow the search with.
        pub filter: Filter,

        /// [`Pagination`] of the search.
        pub pagination: Pagination,
    }

    /// Filter for a [`Selector`].
    ///
    /// All present conditions must hold at once. When [`Filter::geo`] is
    /// present it replaces [`Filter::location`] matching.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// Location substring to match the [`Property`] address against.
        pub location: Option<String>,

        /// [`Kind`] of the [`Property`].
        ///
        /// [`Kind`]: property::Kind
        pub kind: Option<property::Kind>,

        /// [`Status`] of the [`Property`].
        ///
        /// [`Status`]: property::Status
        pub status: Option<property::Status>,

        /// Minimum asking [`Price`], inclusive.
        pub price_min: Option<Price>,

        /// Maximum asking [`Price`], inclusive.
        pub price_max: Option<Price>,

        /// Exact number of bedrooms.
        pub num_bedrooms: Option<property::NumBedrooms>,

        /// Exact number of bathrooms.
        pub num_bathrooms: Option<property::NumBathrooms>,

        /// Minimum interior area, inclusive.
        pub square_meters: Option<property::SquareMeters>,

        /// Exact year of construction.
        pub year_built: Option<property::YearBuilt>,

        /// Geospatial condition, overriding [`Filter::location`].
        pub geo: Option<Geo>,
    }

    /// Geospatial condition of a [`Filter`].
    #[derive(Clone, Copy, Debug)]
    pub struct Geo {
        /// [`Latitude`] of the search center.
        ///
        /// [`Latitude`]: property::Latitude
        pub latitude: property::Latitude,

        /// [`Longitude`] of the search center.
        ///
        /// [`Longitude`]: property::Longitude
        pub longitude: property::Longitude,

        /// Radius around the center, in kilometers.
        pub radius_km: f64,
    }

    /// Single [`Page`] of search results.
    #[derive(Clone, Debug)]
    pub struct Page {
        /// [`Property`]s of this [`Page`], newest first.
        pub items: Vec<PropertyWithImages>,

        /// [`TotalCount`] of [`Property`]s matching the [`Filter`], across
        /// all pages.
        pub total: TotalCount,
    }

    /// [`Property`] along with its [`Image`]s.
    #[derive(Clone, Debug)]
    pub struct PropertyWithImages {
        /// The [`Property`] itself.
        pub property: Property,

        /// [`Image`]s of the [`Property`], main one first.
        pub images: Vec<Image>,
    }

    /// Total count of [`Property`]s matching a [`Filter`].
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i64);
}
