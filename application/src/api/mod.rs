//! REST API definitions.

pub mod favorite;
pub mod inquiry;
pub mod property;
pub mod user;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::define_error;

/// Builds the [`Router`] serving the `/api/v1` surface.
///
/// The [`Service`] is expected to be provided as an [`Extension`] layer.
///
/// [`Extension`]: axum::Extension
/// [`Service`]: crate::Service
pub fn router() -> Router {
    Router::new().nest(
        "/api/v1",
        Router::new()
            .route("/signup", post(user::signup))
            .route("/login", post(user::login))
            .route("/user/:id", get(user::profile))
            .route("/list-property", post(property::list))
            .route("/find-properties", get(property::find))
            .route("/findPropertyById/:id", get(property::by_id))
            .route("/property/:id", put(property::update))
            .route("/deletePropertyById/:id", delete(property::remove))
            .route("/favorites", get(favorite::of_user))
            .route(
                "/favorites/:id",
                post(favorite::create)
                    .get(favorite::by_id)
                    .delete(favorite::remove),
            )
            .route(
                "/properties/:id/inquiries",
                post(inquiry::create).get(inquiry::of_property),
            )
            .route(
                "/inquiries/:id",
                put(inquiry::update).delete(inquiry::remove),
            ),
    )
}

define_error! {
    enum NotFoundError {
        #[code = "USER_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`User` doesn't exist"]
        User,

        #[code = "PROPERTY_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`Property` doesn't exist"]
        Property,

        #[code = "FAVORITE_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`Favorite` doesn't exist"]
        Favorite,

        #[code = "INQUIRY_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`Inquiry` doesn't exist"]
        Inquiry,
    }
}

define_error! {
    enum PrivilegeError {
        #[code = "NOT_OWNER"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must own the entity"]
        Owner,
    }
}
