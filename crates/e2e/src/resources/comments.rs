//! `/comments`

use serde::{Deserialize, Serialize};

use super::{Resource, ResourceApi};

/// Body sent when creating or updating a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPayload {
    pub post_id: i64,
    pub name: String,
    pub email: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub id: Option<u64>,
    pub post_id: i64,
    pub name: String,
    pub email: String,
    pub body: String,
}

pub struct Comments;

impl Resource for Comments {
    const PATH: &'static str = "/comments";
    type Payload = CommentPayload;
    type Model = Comment;
}

pub type CommentsApi = ResourceApi<Comments>;
