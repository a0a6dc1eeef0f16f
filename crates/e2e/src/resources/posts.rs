//! `/posts`

use serde::{Deserialize, Serialize};

use super::{Resource, ResourceApi};

/// Body sent when creating or updating a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPayload {
    pub title: String,
    pub body: String,
    pub user_id: i64,
}

impl PostPayload {
    pub fn new(title: impl Into<String>, body: impl Into<String>, user_id: i64) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            user_id,
        }
    }
}

/// A post as returned by the API. `id` is absent when a server merely echoes
/// the request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(default)]
    pub id: Option<u64>,
    pub title: String,
    pub body: String,
    pub user_id: i64,
}

pub struct Posts;

impl Resource for Posts {
    const PATH: &'static str = "/posts";
    type Payload = PostPayload;
    type Model = Post;
}

pub type PostsApi = ResourceApi<Posts>;
