//! Domain entities - the core business objects.

mod post;
mod user;

pub use post::{
    Comment, CreateRules, DATE_FORMAT, NewPost, Post, PostCollection, PostUpdate, parse_date,
};
pub use user::User;
