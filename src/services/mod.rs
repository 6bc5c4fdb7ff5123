mod article;
mod auth;
mod comment;
mod profile;

pub use article::{ArticleService, generate_slug};
pub use auth::{AuthService, Claims, hash_password, issue_token, verify_password, verify_token};
pub use comment::CommentService;
pub use profile::ProfileService;
