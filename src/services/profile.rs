use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{Profile, ProfileResponse, User},
    repository::{FollowRepository, UserRepository},
    telemetry::{FOLLOWS_ADDED, FOLLOWS_REMOVED},
    validation::ValidationErrors,
};

#[derive(Clone)]
pub struct ProfileService {
    user_repo: UserRepository,
    follow_repo: FollowRepository,
}

impl ProfileService {
    pub fn new(user_repo: UserRepository, follow_repo: FollowRepository) -> Self {
        Self {
            user_repo,
            follow_repo,
        }
    }

    #[instrument(name = "profile.get", skip(self))]
    pub async fn get(&self, username: &str, viewer_id: Option<i32>) -> AppResult<ProfileResponse> {
        let user = self.find(username).await?;

        let following = match viewer_id {
            Some(viewer_id) => self.follow_repo.exists(viewer_id, user.id).await?,
            None => false,
        };

        Ok(ProfileResponse {
            profile: Profile::from_user(user, following),
        })
    }

    #[instrument(name = "profile.follow", skip(self))]
    pub async fn follow(&self, username: &str, follower_id: i32) -> AppResult<ProfileResponse> {
        let user = self.find(username).await?;

        if user.id == follower_id {
            return Err(ValidationErrors::single("profile", "cannot follow yourself").into());
        }

        if self.follow_repo.create(follower_id, user.id).await? {
            FOLLOWS_ADDED.add(1, &[]);
            tracing::info!(follower_id, followee_id = user.id, "User followed");
        }

        Ok(ProfileResponse {
            profile: Profile::from_user(user, true),
        })
    }

    #[instrument(name = "profile.unfollow", skip(self))]
    pub async fn unfollow(&self, username: &str, follower_id: i32) -> AppResult<ProfileResponse> {
        let user = self.find(username).await?;

        if self.follow_repo.delete(follower_id, user.id).await? {
            FOLLOWS_REMOVED.add(1, &[]);
            tracing::info!(follower_id, followee_id = user.id, "User unfollowed");
        }

        Ok(ProfileResponse {
            profile: Profile::from_user(user, false),
        })
    }

    async fn find(&self, username: &str) -> AppResult<User> {
        self.user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(AppError::profile_not_found)
    }
}
