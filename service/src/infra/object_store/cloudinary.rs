//! [Cloudinary]-backed [`ObjectStore`] implementation.
//!
//! [Cloudinary]: https://cloudinary.com

use derive_more::Debug;
use itertools::Itertools as _;
use reqwest::multipart;
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use sha2::{Digest as _, Sha256};
use tracerr::Traced;

use common::DateTime;

use crate::domain::image;

use super::{Error, ObjectStore, StoredObject, TempImage};

/// [`Cloudinary`] client configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Name of the Cloudinary cloud to upload into.
    pub cloud_name: String,

    /// API key identifying this client.
    pub api_key: String,

    /// API secret used to sign requests.
    #[debug(skip)]
    pub api_secret: SecretString,

    /// Folder the uploaded objects are placed under.
    pub folder: String,
}

/// [Cloudinary]-backed [`ObjectStore`].
///
/// [Cloudinary]: https://cloudinary.com
#[derive(Clone, Debug)]
pub struct Cloudinary {
    /// Configuration of this client.
    config: Config,

    /// HTTP client performing the requests.
    client: reqwest::Client,
}

impl Cloudinary {
    /// Timeout of a single API request.
    ///
    /// A timed-out upload is reported as a failed one, triggering the same
    /// cleanup path.
    const REQUEST_TIMEOUT: std::time::Duration =
        std::time::Duration::from_secs(30);

    /// Creates a new [`Cloudinary`] client with the provided [`Config`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: reqwest::Client::builder()
                .timeout(Self::REQUEST_TIMEOUT)
                .build()
                .expect("valid `reqwest::Client` configuration"),
        }
    }

    /// Returns the API endpoint of the provided `action`.
    fn endpoint(&self, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/{action}",
            self.config.cloud_name,
        )
    }

    /// Signs the provided `params` for a request.
    ///
    /// Parameters are serialized in lexicographic key order with the API
    /// secret appended, as Cloudinary's signing scheme requires.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let to_sign = params
            .iter()
            .sorted_by_key(|(k, _)| *k)
            .map(|(k, v)| format!("{k}={v}"))
            .join("&");
        let digest = Sha256::digest(
            format!("{to_sign}{}", self.config.api_secret.expose_secret())
                .as_bytes(),
        );
        hex::encode(digest)
    }
}

impl ObjectStore for Cloudinary {
    async fn upload(
        &self,
        image: &TempImage,
    ) -> Result<StoredObject, Traced<Error>> {
        let bytes = tokio::fs::read(image.path())
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        let timestamp = DateTime::now().unix_timestamp().to_string();
        let signature = self.sign(&[
            ("folder", &self.config.folder),
            ("timestamp", &timestamp),
        ]);

        let file = multipart::Part::bytes(bytes)
            .file_name(image.file_name().to_owned())
            .mime_str(image.content_type())
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        let form = multipart::Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("folder", self.config.folder.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .part("file", file);

        let resp = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(tracerr::new!(Error::Rejected { status, message }));
        }

        let uploaded: Uploaded = resp
            .json()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        let url = image::Url::new(&uploaded.secure_url).ok_or_else(|| {
            tracerr::new!(Error::Rejected {
                status: 200,
                message: format!("malformed `secure_url`: {}",
                                 uploaded.secure_url),
            })
        })?;
        let object_id =
            image::ObjectId::new(&uploaded.public_id).ok_or_else(|| {
                tracerr::new!(Error::Rejected {
                    status: 200,
                    message: format!("malformed `public_id`: {}",
                                     uploaded.public_id),
                })
            })?;

        Ok(StoredObject { url, object_id })
    }

    async fn delete(
        &self,
        id: &image::ObjectId,
    ) -> Result<(), Traced<Error>> {
        let timestamp = DateTime::now().unix_timestamp().to_string();
        let signature = self.sign(&[
            ("public_id", id.as_ref()),
            ("timestamp", &timestamp),
        ]);

        let form = multipart::Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("public_id", id.to_string())
            .text("timestamp", timestamp)
            .text("signature", signature);

        let resp = self
            .client
            .post(self.endpoint("destroy"))
            .multipart(form)
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(tracerr::new!(Error::Rejected { status, message }));
        }

        Ok(())
    }
}

/// Response of a successful Cloudinary upload.
#[derive(Debug, Deserialize)]
struct Uploaded {
    /// HTTPS URL the uploaded object is served from.
    secure_url: String,

    /// Identifier of the uploaded object.
    public_id: String,
}
