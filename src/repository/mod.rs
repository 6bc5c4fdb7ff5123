mod article;
mod comment;
mod favorite;
mod follow;
mod tag;
mod user;

pub use article::{ArticleChanges, ArticleRepository};
pub use comment::CommentRepository;
pub use favorite::FavoriteRepository;
pub use follow::FollowRepository;
pub use tag::TagRepository;
pub use user::{UserChanges, UserRepository};
