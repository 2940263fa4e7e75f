//! Infrastructure layer.

pub mod database;
pub mod object_store;

pub use self::{
    database::Database,
    object_store::{Cloudinary, ObjectStore, StoredObject, TempImage},
};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
