//! [`ObjectStore`] definitions.

pub mod cloudinary;

use std::{future::Future, path::PathBuf};

use derive_more::{Display, Error as StdError, From};
use tracerr::Traced;

use crate::domain::image;

pub use self::cloudinary::Cloudinary;

/// Remote store holding uploaded [`Image`] objects.
///
/// [`Image`]: crate::domain::Image
pub trait ObjectStore {
    /// Uploads the provided [`TempImage`] and returns the [`StoredObject`]
    /// it is served as.
    ///
    /// # Errors
    ///
    /// If failed to upload the [`TempImage`].
    fn upload(
        &self,
        image: &TempImage,
    ) -> impl Future<Output = Result<StoredObject, Traced<Error>>> + Send;

    /// Deletes the object with the provided [`ObjectId`] from this
    /// [`ObjectStore`].
    ///
    /// # Errors
    ///
    /// If failed to delete the object.
    ///
    /// [`ObjectId`]: image::ObjectId
    fn delete(
        &self,
        id: &image::ObjectId,
    ) -> impl Future<Output = Result<(), Traced<Error>>> + Send;
}

/// Object stored in an [`ObjectStore`].
#[derive(Clone, Debug)]
pub struct StoredObject {
    /// Public [`Url`] the object is served from.
    ///
    /// [`Url`]: image::Url
    pub url: image::Url,

    /// [`ObjectId`] of the object in the [`ObjectStore`].
    ///
    /// [`ObjectId`]: image::ObjectId
    pub object_id: image::ObjectId,
}

/// Image received from a client and buffered on local disk until uploaded to
/// an [`ObjectStore`].
///
/// The backing file is removed when this [`TempImage`] is dropped, whether
/// the upload succeeded or not.
#[derive(Debug)]
pub struct TempImage {
    /// Path of the buffered file on local disk.
    path: PathBuf,

    /// MIME type the client declared for the image.
    content_type: String,

    /// File name the client uploaded the image under.
    file_name: String,
}

impl TempImage {
    /// Creates a new [`TempImage`] owning the file at the provided `path`.
    #[must_use]
    pub fn new(
        path: PathBuf,
        content_type: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            path,
            content_type: content_type.into(),
            file_name: file_name.into(),
        }
    }

    /// Returns the local path of this [`TempImage`].
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Returns the MIME type the client declared for this [`TempImage`].
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Returns the file name this [`TempImage`] was uploaded under.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl Drop for TempImage {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    "failed to remove buffered image: {e}",
                );
            }
        }
    }
}

/// [`ObjectStore`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Error of reading a buffered [`TempImage`] from local disk.
    #[display("Failed to read a buffered image: {_0}")]
    Io(std::io::Error),

    /// Error of transporting a request to the [`ObjectStore`].
    #[display("`ObjectStore` request failed: {_0}")]
    Transport(reqwest::Error),

    /// [`ObjectStore`] refused the request.
    #[display("`ObjectStore` rejected the request with {status}: {message}")]
    Rejected {
        /// HTTP status code of the rejection.
        status: u16,

        /// Message the [`ObjectStore`] rejected the request with.
        message: String,
    },
}

#[cfg(test)]
mod spec {
    use std::{fs, io::Write as _};

    use super::TempImage;

    #[test]
    fn temp_image_removes_backing_file_on_drop() {
        let path =
            std::env::temp_dir().join(format!("img-{}", uuid::Uuid::new_v4()));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"not really a JPEG").unwrap();
        drop(file);

        let image = TempImage::new(path.clone(), "image/jpeg", "a.jpg");
        assert!(path.exists());

        drop(image);
        assert!(!path.exists());
    }
}
