//! Built-in test cases for the posts/comments API

pub mod comments;
pub mod posts;

use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::resources::{Resource, ResourceApi};
use crate::runner::{TestCase, TestContext};

/// Every built-in case, posts first.
pub fn all() -> Vec<TestCase> {
    posts::CASES.iter().chain(comments::CASES).copied().collect()
}

/// Look up a built-in case by exact name.
pub fn find(name: &str) -> Option<TestCase> {
    all().into_iter().find(|case| case.name == name)
}

/// Create `payload` and require that the API refuses it, either with a
/// non-2xx status or by echoing a resource that violates `schema`.
async fn expect_rejected<R: Resource>(
    ctx: &TestContext,
    api: &ResourceApi<R>,
    payload: R::Payload,
    schema: &str,
) -> E2eResult<()> {
    let response = api.create_response(payload).await?;
    if !response.is_success() {
        ctx.info(&format!(
            "Invalid payload rejected with status {}",
            response.status
        ));
        return Ok(());
    }

    let outcome = ctx.schemas.validate(schema, &response.body)?;
    debug!("Echoed payload validation: {:?}", outcome.errors);
    if outcome.valid {
        return Err(E2eError::Assertion(format!(
            "Invalid payload was accepted with status {} and a valid {}",
            response.status, schema
        )));
    }
    ctx.info(&format!(
        "Server accepted the payload but the echo is invalid: {}",
        outcome.summary()
    ));
    Ok(())
}
