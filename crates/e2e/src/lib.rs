//! apicheck API test suite
//!
//! This crate drives a posts/comments REST API end to end:
//! - A bearer-authenticated JSON client over a pluggable [`http::Transport`]
//! - Typed resource clients for `/posts` and `/comments`
//! - Per-environment fixture documents and JSON schema checks
//! - A concurrent runner reporting into [`apicheck_report::Aggregator`]
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SuiteRunner (tokio tasks)                │
//! │    ├── TestCase { name, tags, run(TestContext) }            │
//! │    ├── on Err/panic: screenshot + attach_failure + fail     │
//! │    └── SuiteResult { total, passed, failed, outcomes }      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestContext (one per case)                                 │
//! │    ├── TestReporter ──────────────▶ Aggregator (shared)     │
//! │    ├── PostsApi / CommentsApi                               │
//! │    │     └── ApiClient ──▶ Transport (reqwest | scripted)   │
//! │    ├── TestDataDocument (fixtures/<env>.json)               │
//! │    └── SchemaStore (schemas/*.json)                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod expect;
pub mod fixtures;
pub mod http;
pub mod resources;
pub mod runner;
pub mod schema;
pub mod screenshot;
pub mod suite;

pub use config::SuiteConfig;
pub use error::{DataLoadError, E2eError, E2eResult};
pub use http::{ApiClient, ApiResponse, HttpMethod, ReqwestTransport, Transport};
pub use resources::{Comment, CommentPayload, CommentsApi, Payload, Post, PostPayload, PostsApi};
pub use runner::{CaseFilter, SuiteResult, SuiteRunner, TestCase, TestContext};
