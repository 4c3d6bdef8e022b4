use std::future::Future;
use std::pin::Pin;

use crate::error::CoreError;
use crate::models::artifact::Artifact;
use crate::models::request::TypedRequest;
use crate::models::team::TeamInfo;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Produces the report files and email content for one report type.
///
/// Methods return boxed futures for dyn compatibility.
pub trait ReportGenerator: Send + Sync {
    fn generate<'a>(
        &'a self,
        team: &'a TeamInfo,
        request: &'a TypedRequest,
    ) -> BoxFuture<'a, Result<Artifact, CoreError>>;
}
