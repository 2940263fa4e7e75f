//! [`Command`] for listing a new [`Property`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime, Price,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::property::Features;
use crate::{
    domain::{image, property, user, Image, Property, User},
    infra::{database, object_store, Database, ObjectStore, TempImage},
    Service,
};

use super::Command;

/// [`Command`] for listing a new [`Property`].
///
/// Buffered images are uploaded to the [`ObjectStore`] first, and the listing
/// is persisted only once every upload has succeeded. If any step fails, the
/// objects uploaded so far are deleted again, so no half-listed [`Property`]
/// leaves orphaned objects behind.
#[derive(Debug)]
pub struct CreateProperty {
    /// [`Title`] of a new [`Property`].
    ///
    /// [`Title`]: property::Title
    pub title: property::Title,

    /// [`Description`] of a new [`Property`].
    ///
    /// [`Description`]: property::Description
    pub description: property::Description,

    /// Asking [`Price`] of a new [`Property`].
    pub price: Price,

    /// First address line of a new [`Property`].
    pub address_line1: property::AddressLine1,

    /// Second address line of a new [`Property`].
    pub address_line2: property::AddressLine2,

    /// [`City`] a new [`Property`] is located in.
    ///
    /// [`City`]: property::City
    pub city: property::City,

    /// [`County`] a new [`Property`] is located in.
    ///
    /// [`County`]: property::County
    pub county: property::County,

    /// [`Kind`] of a new [`Property`].
    ///
    /// [`Kind`]: property::Kind
    pub kind: property::Kind,

    /// Number of bedrooms in a new [`Property`].
    pub num_bedrooms: property::NumBedrooms,

    /// Number of bathrooms in a new [`Property`].
    pub num_bathrooms: property::NumBathrooms,

    /// Interior area of a new [`Property`].
    pub square_meters: property::SquareMeters,

    /// Year a new [`Property`] was built in.
    pub year_built: property::YearBuilt,

    /// [`Latitude`] of a new [`Property`].
    ///
    /// [`Latitude`]: property::Latitude
    pub latitude: property::Latitude,

    /// [`Longitude`] of a new [`Property`].
    ///
    /// [`Longitude`]: property::Longitude
    pub longitude: property::Longitude,

    /// Raw [`Features`] of a new [`Property`].
    pub features: property::FeaturesInput,

    /// ID of the [`User`] listing a new [`Property`].
    pub user_id: user::Id,

    /// Buffered images of a new [`Property`], in presentation order.
    pub images: Vec<TempImage>,
}

/// Output of [`CreateProperty`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Created [`Property`].
    pub property: Property,

    /// [`Image`]s of the created [`Property`].
    pub images: Vec<Image>,
}

impl<Db, S> Command<CreateProperty> for Service<Db, S>
where
    S: ObjectStore,
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Property>, Err = Traced<database::Error>>
        + Database<Insert<Image>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateProperty {
            title,
            description,
            price,
            address_line1,
            address_line2,
            city,
            county,
            kind,
            num_bedrooms,
            num_bathrooms,
            square_meters,
            year_built,
            latitude,
            longitude,
            features,
            user_id,
            images,
        } = cmd;

        // All request validation happens before any upload, so a malformed
        // listing never reaches the `ObjectStore`.
        let features = property::Features::normalize(features)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        if images.is_empty() {
            return Err(tracerr::new!(E::NoImages));
        }
        if images.len() > image::MAX_PER_PROPERTY {
            return Err(tracerr::new!(E::TooManyImages(images.len())));
        }

        drop(
            self.database()
                .execute(Select(By::new(user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::OwnerNotExists(user_id))
                .map_err(tracerr::wrap!())?,
        );

        let mut uploaded = Vec::with_capacity(images.len());
        for img in &images {
            match self.image_store().upload(img).await {
                Ok(stored) => uploaded.push(stored),
                Err(e) => {
                    self.delete_uploaded(&uploaded).await;
                    return Err(e).map_err(tracerr::map_from_and_wrap!(=> E));
                }
            }
        }

        let property = Property {
            id: property::Id::new(),
            title,
            description,
            price,
            address: property::Address::from_parts(
                &address_line1,
                &address_line2,
                &city,
                &county,
            ),
            address_line1,
            address_line2,
            city,
            county,
            kind,
            status: property::Status::Available,
            num_bedrooms,
            num_bathrooms,
            square_meters,
            year_built,
            latitude,
            longitude,
            features,
            user_id,
            created_at: DateTime::now().coerce(),
        };
        let images = uploaded
            .iter()
            .enumerate()
            .map(|(i, stored)| Image {
                id: image::Id::new(),
                url: stored.url.clone(),
                object_id: stored.object_id.clone(),
                kind: if i == 0 {
                    image::Kind::Main
                } else {
                    image::Kind::Gallery
                },
                property_id: property.id,
                created_at: DateTime::now().coerce(),
            })
            .collect::<Vec<_>>();

        if let Err(e) = self.persist(&property, &images).await {
            self.delete_uploaded(&uploaded).await;
            return Err(e).map_err(tracerr::map_from_and_wrap!(=> E));
        }

        Ok(Output { property, images })
    }
}

impl<Db, S> Service<Db, S>
where
    S: ObjectStore,
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Property>, Err = Traced<database::Error>>
        + Database<Insert<Image>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    /// Persists the provided [`Property`] along with its [`Image`]s.
    async fn persist(
        &self,
        property: &Property,
        images: &[Image],
    ) -> Result<(), Traced<database::Error>> {
        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::wrap!())?;
        tx.execute(Insert(property.clone()))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;
        for img in images {
            tx.execute(Insert(img.clone()))
                .await
                .map_err(tracerr::wrap!())
                .map(drop)?;
        }
        tx.execute(Commit).await.map_err(tracerr::wrap!()).map(drop)
    }

    /// Deletes the provided already-uploaded objects again.
    ///
    /// Failures are logged and swallowed: the listing error is reported to
    /// the caller, an undeletable orphan only to the operator.
    async fn delete_uploaded(&self, uploaded: &[object_store::StoredObject]) {
        for stored in uploaded {
            if let Err(e) = self.image_store().delete(&stored.object_id).await
            {
                tracing::warn!(
                    object_id = %stored.object_id,
                    "failed to delete orphaned image object: {e}",
                );
            }
        }
    }
}

/// Error of [`CreateProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// `features` field cannot be normalized.
    #[display("{_0}")]
    InvalidFeatures(property::InvalidFeatures),

    /// No images provided for the new [`Property`].
    #[display("A `Property` listing requires at least one image")]
    NoImages,

    /// Too many images provided for the new [`Property`].
    #[display(
        "Too many images: {_0} provided, at most {} allowed",
        image::MAX_PER_PROPERTY
    )]
    TooManyImages(#[error(not(source))] usize),

    /// [`User`] listing the [`Property`] does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    OwnerNotExists(#[error(not(source))] user::Id),

    /// [`ObjectStore`] error.
    #[display("`ObjectStore` operation failed: {_0}")]
    ImageStore(object_store::Error),
}

#[cfg(test)]
mod spec {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use common::{
        operations::{By, Commit, Insert, Select, Transact},
        DateTime, Handler, Price,
    };
    use rust_decimal::Decimal;
    use tracerr::Traced;

    use crate::{
        domain::{image, property, user, Image, Property, User},
        infra::{
            database, object_store, ObjectStore, StoredObject, TempImage,
        },
        Config, Service,
    };

    use super::{CreateProperty, ExecutionError};

    /// In-memory stand-in for the database gateway.
    #[derive(Clone, Debug, Default)]
    struct FakeDb(Arc<Mutex<FakeDbState>>);

    #[derive(Debug, Default)]
    struct FakeDbState {
        users: Vec<User>,
        properties: Vec<Property>,
        images: Vec<Image>,
    }

    impl Handler<Select<By<Option<User>, user::Id>>> for FakeDb {
        type Ok = Option<User>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Option<User>, user::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            let id = by.into_inner();
            Ok(self
                .0
                .lock()
                .unwrap()
                .users
                .iter()
                .find(|u| u.id == id)
                .cloned())
        }
    }

    impl Handler<Transact> for FakeDb {
        type Ok = Self;
        type Err = Traced<database::Error>;

        async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
            Ok(self.clone())
        }
    }

    impl Handler<Insert<Property>> for FakeDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Insert(p): Insert<Property>,
        ) -> Result<Self::Ok, Self::Err> {
            self.0.lock().unwrap().properties.push(p);
            Ok(())
        }
    }

    impl Handler<Insert<Image>> for FakeDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Insert(i): Insert<Image>,
        ) -> Result<Self::Ok, Self::Err> {
            self.0.lock().unwrap().images.push(i);
            Ok(())
        }
    }

    impl Handler<Commit> for FakeDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
            Ok(())
        }
    }

    /// [`ObjectStore`] recording uploads and deletions, failing every upload
    /// starting from the `fail_from`th one.
    #[derive(Clone, Debug)]
    struct FakeStore {
        uploads: Arc<AtomicUsize>,
        deleted: Arc<Mutex<Vec<image::ObjectId>>>,
        fail_from: usize,
    }

    impl FakeStore {
        fn new(fail_from: usize) -> Self {
            Self {
                uploads: Arc::new(AtomicUsize::new(0)),
                deleted: Arc::new(Mutex::new(Vec::new())),
                fail_from,
            }
        }
    }

    impl ObjectStore for FakeStore {
        async fn upload(
            &self,
            _: &TempImage,
        ) -> Result<StoredObject, Traced<object_store::Error>> {
            let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= self.fail_from {
                return Err(tracerr::new!(object_store::Error::Rejected {
                    status: 500,
                    message: "simulated outage".into(),
                }));
            }
            Ok(StoredObject {
                url: image::Url::new(format!("https://cdn.test/{n}.jpg"))
                    .unwrap(),
                object_id: image::ObjectId::new(format!("listings/{n}"))
                    .unwrap(),
            })
        }

        async fn delete(
            &self,
            id: &image::ObjectId,
        ) -> Result<(), Traced<object_store::Error>> {
            self.deleted.lock().unwrap().push(id.clone());
            Ok(())
        }
    }

    fn service(
        db: FakeDb,
        store: FakeStore,
    ) -> Service<FakeDb, FakeStore> {
        let secret = b"test-secret";
        Service::new(
            Config {
                jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                    secret,
                ),
                jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                    secret,
                ),
            },
            db,
            store,
        )
    }

    fn owner() -> User {
        User {
            id: user::Id::new(),
            first_name: user::FirstName::new("Jo").unwrap(),
            last_name: user::LastName::new("Byrne").unwrap(),
            email: user::Email::new("jo@example.com").unwrap(),
            password_hash: user::PasswordHash::new(
                &user::Password::new("password123").unwrap(),
            ),
            role: user::Role::Seller,
            phone: None,
            created_at: DateTime::now().coerce(),
        }
    }

    fn cmd(user_id: user::Id, images: Vec<TempImage>) -> CreateProperty {
        CreateProperty {
            title: property::Title::new("Two-bed in Phibsborough").unwrap(),
            description: property::Description::new("Bright corner unit")
                .unwrap(),
            price: Price::new(Decimal::from(325_000)).unwrap(),
            address_line1: property::AddressLine1::new("12 Leinster St")
                .unwrap(),
            address_line2: property::AddressLine2::new("Phibsborough")
                .unwrap(),
            city: property::City::new("Dublin").unwrap(),
            county: property::County::new("Dublin").unwrap(),
            kind: property::Kind::Apartment,
            num_bedrooms: 2,
            num_bathrooms: 1,
            square_meters: property::SquareMeters::new(68).unwrap(),
            year_built: property::YearBuilt::new(1998).unwrap(),
            latitude: property::Latitude::new(53.36).unwrap(),
            longitude: property::Longitude::new(-6.27).unwrap(),
            features: property::FeaturesInput::Text(
                r#"{"parking":true}"#.to_owned(),
            ),
            user_id,
            images,
        }
    }

    fn temp_images(n: usize) -> Vec<TempImage> {
        (0..n)
            .map(|i| {
                let path = std::env::temp_dir()
                    .join(format!("upload-{}-{i}", uuid::Uuid::new_v4()));
                std::fs::write(&path, b"jpeg bytes").unwrap();
                TempImage::new(path, "image/jpeg", format!("{i}.jpg"))
            })
            .collect()
    }

    #[tokio::test]
    async fn rejects_listing_without_images() {
        let db = FakeDb::default();
        let user = owner();
        db.0.lock().unwrap().users.push(user.clone());
        let svc = service(db, FakeStore::new(usize::MAX));

        let err = svc.execute(cmd(user.id, Vec::new())).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NoImages));
    }

    #[tokio::test]
    async fn rejects_malformed_features_before_uploading() {
        let db = FakeDb::default();
        let user = owner();
        db.0.lock().unwrap().users.push(user.clone());
        let store = FakeStore::new(usize::MAX);
        let svc = service(db, store.clone());

        let mut c = cmd(user.id, temp_images(1));
        c.features =
            property::FeaturesInput::Text("{broken".to_owned());
        let err = svc.execute(c).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidFeatures(_),
        ));
        assert_eq!(store.uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_upload_deletes_already_uploaded_objects() {
        let db = FakeDb::default();
        let user = owner();
        db.0.lock().unwrap().users.push(user.clone());
        let store = FakeStore::new(3);
        let svc = service(db.clone(), store.clone());

        let images = temp_images(3);
        let paths = images
            .iter()
            .map(|i| i.path().to_owned())
            .collect::<Vec<_>>();
        let err = svc.execute(cmd(user.id, images)).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ImageStore(_),
        ));
        assert_eq!(
            *store.deleted.lock().unwrap(),
            vec![
                image::ObjectId::new("listings/1").unwrap(),
                image::ObjectId::new("listings/2").unwrap(),
            ],
        );
        assert!(db.0.lock().unwrap().properties.is_empty());
        assert!(db.0.lock().unwrap().images.is_empty());
        assert!(paths.iter().all(|p| !p.exists()));
    }

    #[tokio::test]
    async fn persists_listing_with_first_image_as_main() {
        let db = FakeDb::default();
        let user = owner();
        db.0.lock().unwrap().users.push(user.clone());
        let svc = service(db.clone(), FakeStore::new(usize::MAX));

        let out = svc.execute(cmd(user.id, temp_images(2))).await.unwrap();

        assert_eq!(out.images.len(), 2);
        assert_eq!(out.images[0].kind, image::Kind::Main);
        assert_eq!(out.images[1].kind, image::Kind::Gallery);
        assert_eq!(out.property.status, property::Status::Available);
        assert_eq!(db.0.lock().unwrap().properties.len(), 1);
        assert_eq!(db.0.lock().unwrap().images.len(), 2);
    }
}
