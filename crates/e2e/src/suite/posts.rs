//! `/posts` cases

use crate::expect::{expect_eq, expect_status};
use crate::resources::PostPayload;
use crate::runner::{CaseFuture, TestCase, TestContext};

pub const CASES: &[TestCase] = &[
    TestCase { name: "get_post_returns_200", tags: &["posts"], run: get_post_returns_200 },
    TestCase { name: "get_post_matches_schema", tags: &["posts", "schema"], run: get_post_matches_schema },
    TestCase { name: "create_post_returns_201", tags: &["posts"], run: create_post_returns_201 },
    TestCase { name: "create_post_matches_schema", tags: &["posts", "schema"], run: create_post_matches_schema },
    TestCase { name: "create_valid_post_succeeds", tags: &["posts"], run: create_valid_post_succeeds },
    TestCase { name: "create_invalid_post_is_rejected", tags: &["posts", "negative"], run: create_invalid_post_is_rejected },
    TestCase { name: "update_post_returns_200", tags: &["posts"], run: update_post_returns_200 },
    TestCase { name: "delete_post_returns_200", tags: &["posts"], run: delete_post_returns_200 },
];

fn sample_post() -> PostPayload {
    PostPayload::new("foo", "bar", 1)
}

fn get_post_returns_200(ctx: TestContext) -> CaseFuture {
    Box::pin(async move {
        let response = ctx.posts.get(1).await?;
        expect_status(&response, 200)
    })
}

fn get_post_matches_schema(ctx: TestContext) -> CaseFuture {
    Box::pin(async move {
        let response = ctx.posts.get(1).await?;
        expect_status(&response, 200)?;
        ctx.check_schema("post_schema", &response.body)
    })
}

fn create_post_returns_201(ctx: TestContext) -> CaseFuture {
    Box::pin(async move {
        let response = ctx.posts.create_response(sample_post()).await?;
        expect_status(&response, 201)
    })
}

fn create_post_matches_schema(ctx: TestContext) -> CaseFuture {
    Box::pin(async move {
        let response = ctx.posts.create_response(sample_post()).await?;
        expect_status(&response, 201)?;
        ctx.check_schema("post_schema", &response.body)
    })
}

fn create_valid_post_succeeds(ctx: TestContext) -> CaseFuture {
    Box::pin(async move {
        let valid = ctx.data.test_data.posts.valid_post.clone();
        ctx.info(&format!("Creating post with title: {}", valid.title));

        let created = ctx.posts.create(valid.clone()).await?;
        let post = created.resource;
        expect_eq("title", &valid.title, &post.title)?;
        expect_eq("body", &valid.body, &post.body)?;
        expect_eq("userId", &valid.user_id, &post.user_id)
    })
}

fn create_invalid_post_is_rejected(ctx: TestContext) -> CaseFuture {
    Box::pin(async move {
        let invalid = ctx.data.test_data.posts.invalid_post.clone();
        ctx.info("Attempting to create invalid post with empty title");
        super::expect_rejected(&ctx, &ctx.posts, invalid, "post_schema").await
    })
}

fn update_post_returns_200(ctx: TestContext) -> CaseFuture {
    Box::pin(async move {
        let update = PostPayload::new("updated title", "updated body", 1);
        let response = ctx.posts.update(1, update).await?;
        expect_status(&response, 200)
    })
}

fn delete_post_returns_200(ctx: TestContext) -> CaseFuture {
    Box::pin(async move {
        let response = ctx.posts.delete(1).await?;
        expect_status(&response, 200)
    })
}
