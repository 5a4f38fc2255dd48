use async_trait::async_trait;
use reqwest::Url;

use super::{
    RestAdapter,
    rest::{is_rejection, send_json},
};
use crate::domain::{Adapter, PasswordDigest, RepositoryError, User, UserBackend, Username};

/// User backend over the remote user collection.
///
/// Adds the two custom endpoints of the user API on top of the generic
/// collection surface:
///
/// ```text
/// POST {base}/auth/{username}/{md5(password)}  -> [User]
/// GET  {base}/by-username/{username}           -> [User]
/// ```
pub struct RemoteUserBackend {
    users: RestAdapter<User>,
}

impl RemoteUserBackend {
    pub fn new(users: RestAdapter<User>) -> Self {
        Self { users }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RepositoryError> {
        let mut url = Url::parse(self.users.base_url())
            .map_err(|e| RepositoryError::Transport(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| {
                RepositoryError::Transport(format!(
                    "base URL cannot have a path: {}",
                    self.users.base_url()
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl UserBackend for RemoteUserBackend {
    async fn authenticate(
        &self,
        username: &Username,
        password: &str,
    ) -> Result<User, RepositoryError> {
        let digest = PasswordDigest::from_password(password)
            .map_err(|_| RepositoryError::InvalidCredentials(username.to_string()))?;
        let url = self.endpoint(&["auth", username.as_str(), digest.as_str()])?;

        let users: Vec<User> = send_json(self.users.client().post(url))
            .await
            .map_err(|e| match e {
                RepositoryError::Status { status, .. } if is_rejection(status) => {
                    RepositoryError::InvalidCredentials(username.to_string())
                }
                other => other,
            })?;

        users
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::InvalidCredentials(username.to_string()))
    }

    async fn get_by_username(&self, username: &Username) -> Result<Option<User>, RepositoryError> {
        let url = self.endpoint(&["by-username", username.as_str()])?;

        match send_json::<Vec<User>>(self.users.client().get(url)).await {
            Ok(users) => Ok(users.into_iter().next()),
            Err(RepositoryError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn add_users(&self, users: Vec<User>) -> Result<Vec<User>, RepositoryError> {
        self.users.add(users).await
    }
}
