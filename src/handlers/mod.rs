mod articles;
mod comments;
mod health;
mod profiles;
mod tags;
mod users;

pub use articles::{
    create_article, delete_article, favorite_article, feed_articles, get_article, list_articles,
    unfavorite_article, update_article,
};
pub use comments::{add_comment, delete_comment, list_comments};
pub use health::health_check;
pub use profiles::{follow_user, get_profile, unfollow_user};
pub use tags::list_tags;
pub use users::{current_user, login, register, update_user};
