mod article;
mod comment;
mod user;

pub use article::*;
pub use comment::*;
pub use user::*;
