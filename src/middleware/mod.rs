mod auth;
mod trace;

pub use auth::{AuthUser, OptionalAuthUser};
pub use trace::{HttpMakeSpan, HttpOnResponse, X_REQUEST_ID};
