//! `/comments` cases

use crate::expect::{expect_email, expect_eq, expect_status};
use crate::resources::Comment;
use crate::runner::{CaseFuture, TestCase, TestContext};

/// Email of comment 2 on the reference API
pub const EXPECTED_COMMENT_EMAIL: &str = "Jayne_Kuhic@sydney.com";

pub const CASES: &[TestCase] = &[
    TestCase { name: "get_comment_returns_200", tags: &["comments"], run: get_comment_returns_200 },
    TestCase { name: "create_valid_comment_succeeds", tags: &["comments"], run: create_valid_comment_succeeds },
    TestCase { name: "create_invalid_comment_is_rejected", tags: &["comments", "negative"], run: create_invalid_comment_is_rejected },
    TestCase { name: "update_comment_returns_200", tags: &["comments"], run: update_comment_returns_200 },
    TestCase { name: "delete_comment_returns_200", tags: &["comments"], run: delete_comment_returns_200 },
];

fn get_comment_returns_200(ctx: TestContext) -> CaseFuture {
    Box::pin(async move {
        let response = ctx.comments.get(2).await?;
        expect_status(&response, 200)?;
        ctx.info(&format!("Raw response body: {}", response.body));

        let comment: Comment = response.json()?;
        ctx.info(&format!("Validating email format: {}", comment.email));
        expect_email(&comment.email)?;
        expect_eq("email", EXPECTED_COMMENT_EMAIL, comment.email.as_str())
    })
}

fn create_valid_comment_succeeds(ctx: TestContext) -> CaseFuture {
    Box::pin(async move {
        let valid = ctx.data.test_data.comments.valid_comment.clone();
        ctx.info(&format!("Creating comment for post {}", valid.post_id));

        let created = ctx.comments.create(valid.clone()).await?;
        let comment = created.resource;
        expect_eq("postId", &valid.post_id, &comment.post_id)?;
        expect_eq("name", &valid.name, &comment.name)?;
        expect_eq("email", &valid.email, &comment.email)?;
        expect_eq("body", &valid.body, &comment.body)
    })
}

fn create_invalid_comment_is_rejected(ctx: TestContext) -> CaseFuture {
    Box::pin(async move {
        let invalid = ctx.data.test_data.comments.invalid_comment.clone();
        ctx.info("Attempting to create invalid comment with invalid email");
        super::expect_rejected(&ctx, &ctx.comments, invalid, "comment_schema").await
    })
}

fn update_comment_returns_200(ctx: TestContext) -> CaseFuture {
    Box::pin(async move {
        let update = ctx.data.test_data.comments.valid_comment.clone();
        let response = ctx.comments.update(1, update).await?;
        expect_status(&response, 200)
    })
}

fn delete_comment_returns_200(ctx: TestContext) -> CaseFuture {
    Box::pin(async move {
        let response = ctx.comments.delete(1).await?;
        expect_status(&response, 200)
    })
}
