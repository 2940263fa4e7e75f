//! [`Property`]-related API definitions.
//!
//! [`Property`]: domain::Property

use std::{collections::BTreeMap, env, str::FromStr};

use axum::{
    extract::{Multipart, Path, Query as QueryParams},
    Extension, Json,
};
use common::{Pagination, Price};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, property},
    infra::TempImage,
    query, read, Query as _,
};
use uuid::Uuid;

use crate::{api, context::Auth, define_error, AsError, Error, Service};

/// Default radius of a geospatial search, in meters.
const DEFAULT_RADIUS_M: f64 = 5000.0;

/// [`Property`] with its images, as serialized in API responses.
///
/// [`Property`]: domain::Property
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Unique identifier of the [`Property`].
    ///
    /// [`Property`]: domain::Property
    pub id: Uuid,

    /// Title of the [`Property`].
    ///
    /// [`Property`]: domain::Property
    pub title: String,

    /// Description of the [`Property`].
    ///
    /// [`Property`]: domain::Property
    pub description: String,

    /// Asking price of the [`Property`].
    ///
    /// [`Property`]: domain::Property
    pub price: Price,

    /// Composed address of the [`Property`].
    ///
    /// [`Property`]: domain::Property
    pub address: String,

    /// First address line of the [`Property`].
    ///
    /// [`Property`]: domain::Property
    pub address_line1: String,

    /// Second address line of the [`Property`].
    ///
    /// [`Property`]: domain::Property
    pub address_line2: String,

    /// City the [`Property`] is located in.
    ///
    /// [`Property`]: domain::Property
    pub city: String,

    /// County the [`Property`] is located in.
    ///
    /// [`Property`]: domain::Property
    pub county: String,

    /// Kind of the [`Property`].
    ///
    /// [`Property`]: domain::Property
    pub property_type: String,

    /// Status of the [`Property`].
    ///
    /// [`Property`]: domain::Property
    pub status: String,

    /// Number of bedrooms in the [`Property`].
    ///
    /// [`Property`]: domain::Property
    pub num_bedrooms: u16,

    /// Number of bathrooms in the [`Property`].
    ///
    /// [`Property`]: domain::Property
    pub num_bathrooms: u16,

    /// Interior area of the [`Property`], in square meters.
    ///
    /// [`Property`]: domain::Property
    pub square_meters: u32,

    /// Year the [`Property`] was built in.
    ///
    /// [`Property`]: domain::Property
    pub year_built: i32,

    /// Latitude of the [`Property`].
    ///
    /// [`Property`]: domain::Property
    pub latitude: f64,

    /// Longitude of the [`Property`].
    ///
    /// [`Property`]: domain::Property
    pub longitude: f64,

    /// Features of the [`Property`], as presence flags.
    ///
    /// [`Property`]: domain::Property
    pub features: property::Features,

    /// ID of the `User` owning the [`Property`].
    ///
    /// [`Property`]: domain::Property
    pub user_id: Uuid,

    /// When the [`Property`] was listed, as an RFC 3339 string.
    ///
    /// [`Property`]: domain::Property
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: property::CreationDateTime,

    /// [`Image`]s of the [`Property`], main one first.
    ///
    /// [`Property`]: domain::Property
    pub images: Vec<Image>,
}

impl From<(domain::Property, Vec<domain::Image>)> for Property {
    fn from((property, images): (domain::Property, Vec<domain::Image>)) -> Self {
        Self {
            id: property.id.into(),
            title: property.title.to_string(),
            description: property.description.to_string(),
            price: property.price,
            address: property.address.to_string(),
            address_line1: property.address_line1.to_string(),
            address_line2: property.address_line2.to_string(),
            city: property.city.to_string(),
            county: property.county.to_string(),
            property_type: property.kind.to_string(),
            status: property.status.to_string(),
            num_bedrooms: property.num_bedrooms,
            num_bathrooms: property.num_bathrooms,
            square_meters: property.square_meters.into(),
            year_built: property.year_built.into(),
            latitude: property.latitude.into(),
            longitude: property.longitude.into(),
            features: property.features,
            user_id: property.user_id.into(),
            created_at: property.created_at,
            images: images.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<read::property::search::PropertyWithImages> for Property {
    fn from(with_images: read::property::search::PropertyWithImages) -> Self {
        (with_images.property, with_images.images).into()
    }
}

/// Image of a [`Property`], as serialized in API responses.
///
/// [`Property`]: domain::Property
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Unique identifier of the image.
    pub id: Uuid,

    /// URL of the image in the object store.
    pub url: String,

    /// Kind of the image.
    pub image_type: String,
}

impl From<domain::Image> for Image {
    fn from(image: domain::Image) -> Self {
        Self {
            id: image.id.into(),
            url: image.url.to_string(),
            image_type: image.kind.to_string(),
        }
    }
}

/// Returns the parsed `name`d field of a multipart `form`.
fn parse<T>(
    form: &BTreeMap<String, String>,
    name: &'static str,
) -> Result<T, Error>
where
    T: FromStr,
    T::Err: ToString,
{
    form.get(name)
        .ok_or_else(|| Error::invalid_field(name, &"is missing"))?
        .parse()
        .map_err(|e: T::Err| Error::invalid_field(name, &e))
}

/// `POST /api/v1/list-property` handler listing a new [`Property`].
///
/// Accepts a multipart form with the listing fields plus up to 10 `images`
/// files.
///
/// [`Property`]: domain::Property
pub async fn list(
    Extension(service): Extension<Service>,
    auth: Auth,
    mut form: Multipart,
) -> Result<(StatusCode, Json<Property>), Error> {
    let mut fields = BTreeMap::new();
    let mut images = Vec::new();

    while let Some(field) = form
        .next_field()
        .await
        .map_err(|e| Error::invalid_field("multipart", &e))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        if name == "images" {
            let file_name = field.file_name().unwrap_or("image").to_owned();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| Error::invalid_field("images", &e))?;

            // Buffered to a uniquely named local file, owned by the
            // `TempImage` and removed on every exit path.
            let path =
                env::temp_dir().join(format!("listing-{}", Uuid::new_v4()));
            tokio::fs::write(&path, &bytes)
                .await
                .map_err(|e| Error::internal(&e))?;
            images.push(TempImage::new(path, content_type, file_name));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| Error::invalid_field(&name, &e))?;
            drop(fields.insert(name, value));
        }
    }

    let cmd = command::CreateProperty {
        title: parse(&fields, "title")?,
        description: parse(&fields, "description")?,
        price: parse(&fields, "price")?,
        address_line1: parse(&fields, "addressLine1")?,
        address_line2: parse(&fields, "addressLine2")?,
        city: parse(&fields, "city")?,
        county: parse(&fields, "county")?,
        kind: parse(&fields, "propertyType")?,
        num_bedrooms: parse(&fields, "numBedrooms")?,
        num_bathrooms: parse(&fields, "numBathrooms")?,
        square_meters: property::SquareMeters::new(parse(
            &fields,
            "squareMeters",
        )?)
        .ok_or_else(|| {
            Error::invalid_field("squareMeters", &"must be positive")
        })?,
        year_built: property::YearBuilt::new(parse(&fields, "yearBuilt")?)
            .ok_or_else(|| {
                Error::invalid_field("yearBuilt", &"is out of range")
            })?,
        latitude: property::Latitude::new(parse(&fields, "latitude")?)
            .ok_or_else(|| {
                Error::invalid_field("latitude", &"is out of range")
            })?,
        longitude: property::Longitude::new(parse(&fields, "longitude")?)
            .ok_or_else(|| {
                Error::invalid_field("longitude", &"is out of range")
            })?,
        features: fields.get("features").map_or_else(
            || property::FeaturesInput::Map(BTreeMap::new()),
            |raw| property::FeaturesInput::Text(raw.clone()),
        ),
        user_id: auth.user_id,
        images,
    };

    service
        .execute(cmd)
        .await
        .map(|out| {
            (StatusCode::CREATED, Json((out.property, out.images).into()))
        })
        .map_err(AsError::into_error)
}

/// Query parameters of a [`Property`] search.
///
/// All parameters are optional, and `page`/`limit` fall back to their
/// defaults on non-numeric input rather than erroring.
///
/// [`Property`]: domain::Property
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Location substring to match addresses against.
    pub location: Option<String>,

    /// Kind of the [`Property`].
    ///
    /// [`Property`]: domain::Property
    pub property_type: Option<String>,

    /// Status of the [`Property`].
    ///
    /// [`Property`]: domain::Property
    pub status: Option<String>,

    /// Inclusive lower price bound.
    pub price_min: Option<String>,

    /// Inclusive upper price bound.
    pub price_max: Option<String>,

    /// Exact number of bedrooms.
    pub num_bedrooms: Option<String>,

    /// Exact number of bathrooms.
    pub num_bathrooms: Option<String>,

    /// Inclusive lower bound of the interior area.
    pub square_meters: Option<String>,

    /// Exact year of construction.
    pub year_built: Option<String>,

    /// Latitude of the geospatial search center.
    pub latitude: Option<String>,

    /// Longitude of the geospatial search center.
    pub longitude: Option<String>,

    /// Radius around the search center, in meters.
    pub radius: Option<String>,

    /// 1-based page number.
    pub page: Option<String>,

    /// Page size.
    pub limit: Option<String>,
}

impl SearchParams {
    /// Converts these [`SearchParams`] into a search [`Selector`].
    ///
    /// # Errors
    ///
    /// If any of the typed parameters fails to parse or is out of range.
    ///
    /// [`Selector`]: read::property::search::Selector
    fn into_selector(
        self,
    ) -> Result<read::property::search::Selector, Error> {
        /// Parses the `name`d parameter, if present.
        fn opt<T>(
            value: Option<&String>,
            name: &'static str,
        ) -> Result<Option<T>, Error>
        where
            T: FromStr,
            T::Err: ToString,
        {
            value
                .map(|v| v.parse())
                .transpose()
                .map_err(|e: T::Err| Error::invalid_field(name, &e))
        }

        let Self {
            location,
            property_type,
            status,
            price_min,
            price_max,
            num_bedrooms,
            num_bathrooms,
            square_meters,
            year_built,
            latitude,
            longitude,
            radius,
            page,
            limit,
        } = self;

        let pagination =
            Pagination::from_raw(page.as_deref(), limit.as_deref());

        let latitude = opt::<f64>(latitude.as_ref(), "latitude")?
            .map(|d| {
                property::Latitude::new(d).ok_or_else(|| {
                    Error::invalid_field("latitude", &"is out of range")
                })
            })
            .transpose()?;
        let longitude = opt::<f64>(longitude.as_ref(), "longitude")?
            .map(|d| {
                property::Longitude::new(d).ok_or_else(|| {
                    Error::invalid_field("longitude", &"is out of range")
                })
            })
            .transpose()?;
        // Both coordinates present switch the search to geospatial matching.
        let geo = latitude.zip(longitude).map(|(latitude, longitude)| {
            Ok::<_, Error>(read::property::search::Geo {
                latitude,
                longitude,
                radius_km: opt::<f64>(radius.as_ref(), "radius")?
                    .unwrap_or(DEFAULT_RADIUS_M)
                    / 1000.0,
            })
        });
        let geo = geo.transpose()?;

        Ok(read::property::search::Selector {
            filter: read::property::search::Filter {
                location,
                kind: opt(property_type.as_ref(), "propertyType")?,
                status: opt(status.as_ref(), "status")?,
                price_min: opt(price_min.as_ref(), "priceMin")?,
                price_max: opt(price_max.as_ref(), "priceMax")?,
                num_bedrooms: opt(num_bedrooms.as_ref(), "numBedrooms")?,
                num_bathrooms: opt(num_bathrooms.as_ref(), "numBathrooms")?,
                square_meters: opt::<u32>(
                    square_meters.as_ref(),
                    "squareMeters",
                )?
                .map(|a| {
                    property::SquareMeters::new(a).ok_or_else(|| {
                        Error::invalid_field(
                            "squareMeters",
                            &"must be positive",
                        )
                    })
                })
                .transpose()?,
                year_built: opt::<i32>(year_built.as_ref(), "yearBuilt")?
                    .map(|y| {
                        property::YearBuilt::new(y).ok_or_else(|| {
                            Error::invalid_field(
                                "yearBuilt",
                                &"is out of range",
                            )
                        })
                    })
                    .transpose()?,
                geo,
            },
            pagination,
        })
    }
}

/// Body of a successful [`Property`] search response.
///
/// [`Property`]: domain::Property
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Matched [`Property`]s of the requested page.
    pub properties: Vec<Property>,

    /// Resolved 1-based page number.
    pub page: u32,

    /// Resolved page size.
    pub limit: u32,

    /// Total count of [`Property`]s matching the filter, across all pages.
    ///
    /// [`Property`]: domain::Property
    pub total_count: i64,
}

/// `GET /api/v1/find-properties` handler searching [`Property`]s.
///
/// [`Property`]: domain::Property
pub async fn find(
    Extension(service): Extension<Service>,
    QueryParams(params): QueryParams<SearchParams>,
) -> Result<Json<SearchResponse>, Error> {
    let selector = params.into_selector()?;
    let (page, limit) =
        (selector.pagination.page(), selector.pagination.limit());

    service
        .execute(query::properties::Search::by(selector))
        .await
        .map(|found| {
            Json(SearchResponse {
                properties: found.items.into_iter().map(Into::into).collect(),
                page,
                limit,
                total_count: found.total.into(),
            })
        })
        .map_err(AsError::into_error)
}

/// `GET /api/v1/findPropertyById/:id` handler returning a single
/// [`Property`] with its images.
///
/// [`Property`]: domain::Property
pub async fn by_id(
    Extension(service): Extension<Service>,
    Path(id): Path<property::Id>,
) -> Result<Json<Property>, Error> {
    service
        .execute(query::property::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .map(|found| Json(found.into()))
        .ok_or_else(|| api::NotFoundError::Property.into())
}

/// Body of a [`Property`] update request.
///
/// Absent fields are left unchanged.
///
/// [`Property`]: domain::Property
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    /// New title.
    pub title: Option<String>,

    /// New description.
    pub description: Option<String>,

    /// New asking price.
    pub price: Option<Price>,

    /// New status.
    pub status: Option<String>,

    /// New number of bedrooms.
    pub num_bedrooms: Option<u16>,

    /// New number of bathrooms.
    pub num_bathrooms: Option<u16>,

    /// New features.
    pub features: Option<property::FeaturesInput>,
}

/// `PUT /api/v1/property/:id` handler partially updating a [`Property`].
///
/// [`Property`]: domain::Property
pub async fn update(
    Extension(service): Extension<Service>,
    auth: Auth,
    Path(id): Path<property::Id>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Property>, Error> {
    let UpdateRequest {
        title,
        description,
        price,
        status,
        num_bedrooms,
        num_bathrooms,
        features,
    } = req;

    let cmd = command::UpdateProperty {
        property_id: id,
        user_id: auth.user_id,
        title: title
            .map(|t| t.parse())
            .transpose()
            .map_err(|e| Error::invalid_field("title", &e))?,
        description: description
            .map(|d| d.parse())
            .transpose()
            .map_err(|e| Error::invalid_field("description", &e))?,
        price,
        status: status
            .map(|s| s.parse())
            .transpose()
            .map_err(|e| Error::invalid_field("status", &e))?,
        num_bedrooms,
        num_bathrooms,
        features,
    };

    let updated = service.execute(cmd).await.map_err(AsError::into_error)?;

    service
        .execute(query::property::ById::by(updated.id))
        .await
        .map_err(AsError::into_error)?
        .map(|found| Json(found.into()))
        .ok_or_else(|| api::NotFoundError::Property.into())
}

/// `DELETE /api/v1/deletePropertyById/:id` handler unlisting a
/// [`Property`].
///
/// [`Property`]: domain::Property
pub async fn remove(
    Extension(service): Extension<Service>,
    auth: Auth,
    Path(id): Path<property::Id>,
) -> Result<StatusCode, Error> {
    service
        .execute(command::DeleteProperty {
            property_id: id,
            user_id: auth.user_id,
        })
        .await
        .map(|()| StatusCode::OK)
        .map_err(AsError::into_error)
}

impl AsError for command::create_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::create_property::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::InvalidFeatures(_) => Some(ListingError::InvalidFeatures.into()),
            E::NoImages => Some(ListingError::NoImages.into()),
            E::TooManyImages(_) => Some(ListingError::TooManyImages.into()),
            E::OwnerNotExists(_) => Some(ListingError::OwnerNotFound.into()),
            E::ImageStore(_) => Some(ListingError::ObjectStore.into()),
        }
    }
}

impl AsError for command::update_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::update_property::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::InvalidFeatures(_) => Some(ListingError::InvalidFeatures.into()),
            E::PropertyNotExists(_) => Some(api::NotFoundError::Property.into()),
            E::NotOwner(_) => Some(api::PrivilegeError::Owner.into()),
        }
    }
}

impl AsError for command::delete_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::delete_property::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::PropertyNotExists(_) => Some(api::NotFoundError::Property.into()),
            E::NotOwner(_) => Some(api::PrivilegeError::Owner.into()),
        }
    }
}

define_error! {
    enum ListingError {
        #[code = "NO_IMAGES"]
        #[status = BAD_REQUEST]
        #[message = "At least one image must be attached"]
        NoImages,

        #[code = "TOO_MANY_IMAGES"]
        #[status = BAD_REQUEST]
        #[message = "At most 10 images can be attached"]
        TooManyImages,

        #[code = "INVALID_FEATURES"]
        #[status = BAD_REQUEST]
        #[message = "`features` must be a JSON mapping of booleans"]
        InvalidFeatures,

        #[code = "OWNER_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Owning `User` doesn't exist"]
        OwnerNotFound,

        #[code = "OBJECT_STORE_ERROR"]
        #[status = INTERNAL_SERVER_ERROR]
        #[message = "Failed to store the attached images"]
        ObjectStore,
    }
}
