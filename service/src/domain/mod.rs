//! Domain definitions.

pub mod favorite;
pub mod image;
pub mod inquiry;
pub mod property;
pub mod user;

pub use self::{
    favorite::Favorite, image::Image, inquiry::Inquiry, property::Property,
    user::User,
};
