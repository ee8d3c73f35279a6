//! Data provider contract.
//!
//! The engine never knows where nodes come from. It asks a [`DataProvider`]
//! for the children of a node (or of the root) and for search results, and
//! treats every answer as fire-and-forget: results land in the store when the
//! request settles.

mod memory;

pub use memory::*;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::LoadError;
use crate::node::TreeNode;

/// Answers "list children of X" and "search for Q".
///
/// Called with:
/// - `parent_id = None`, `query = ""` once at startup (root level),
/// - `parent_id = Some(id)`, `query = ""` when a node without cached children
///   is expanded,
/// - `parent_id = None`, non-empty `query` for search. Search answers are
///   expected to be full matching subtrees (nested `children`), not flat lists.
///
/// There is no timeout: a call that never completes leaves its node loading.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use treecombo::{DataProvider, LoadError, TreeNode};
///
/// struct Departments;
///
/// #[async_trait]
/// impl DataProvider for Departments {
///     async fn load(
///         &self,
///         parent_id: Option<&str>,
///         query: &str,
///     ) -> Result<Vec<TreeNode>, LoadError> {
///         fetch_departments(parent_id, query)
///             .await
///             .map_err(|e| LoadError::provider(e.to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Loads children of `parent_id` (root when `None`), or search results
    /// when `query` is non-empty.
    async fn load(&self, parent_id: Option<&str>, query: &str)
        -> Result<Vec<TreeNode>, LoadError>;
}

#[async_trait]
impl<P: DataProvider + ?Sized> DataProvider for Arc<P> {
    async fn load(
        &self,
        parent_id: Option<&str>,
        query: &str,
    ) -> Result<Vec<TreeNode>, LoadError> {
        (**self).load(parent_id, query).await
    }
}

/// A provider backed by an async closure. See [`provider_fn`].
pub struct FnProvider<F> {
    f: F,
}

/// Wraps an async closure `(parent_id, query) -> Result<Vec<TreeNode>, LoadError>`
/// as a [`DataProvider`].
///
/// # Example
///
/// ```ignore
/// let provider = provider_fn(|parent_id, query| async move {
///     backend.list(parent_id, query).await
/// });
/// ```
pub fn provider_fn<F, Fut>(f: F) -> FnProvider<F>
where
    F: Fn(Option<String>, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<TreeNode>, LoadError>> + Send + 'static,
{
    FnProvider { f }
}

#[async_trait]
impl<F, Fut> DataProvider for FnProvider<F>
where
    F: Fn(Option<String>, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<TreeNode>, LoadError>> + Send + 'static,
{
    async fn load(
        &self,
        parent_id: Option<&str>,
        query: &str,
    ) -> Result<Vec<TreeNode>, LoadError> {
        (self.f)(parent_id.map(str::to_owned), query.to_owned()).await
    }
}
