//! [`Command`] definition.

pub mod authorize_user_session;
pub mod create_favorite;
pub mod create_inquiry;
pub mod create_property;
pub mod create_user;
pub mod create_user_session;
pub mod delete_favorite;
pub mod delete_inquiry;
pub mod delete_property;
pub mod update_inquiry;
pub mod update_property;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    create_favorite::CreateFavorite, create_inquiry::CreateInquiry,
    create_property::CreateProperty, create_user::CreateUser,
    create_user_session::CreateUserSession, delete_favorite::DeleteFavorite,
    delete_inquiry::DeleteInquiry, delete_property::DeleteProperty,
    update_inquiry::UpdateInquiry, update_property::UpdateProperty,
};
