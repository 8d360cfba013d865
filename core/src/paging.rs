//! Cursor paging parameters shared by every listing endpoint.

use crate::error::{ApiError, ApiResult};
use crate::http::Query;

/// `limit` plus at most one of the `after` / `before` cursors.
///
/// Cursors are opaque strings taken from a previous response's
/// `paging.cursors` object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paging {
    pub limit: Option<u32>,
    pub after: Option<String>,
    pub before: Option<String>,
}

impl Paging {
    /// No paging parameters; the query string is omitted entirely.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    #[must_use]
    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.after.is_none() && self.before.is_none()
    }

    /// Render the supplied fields as query pairs, in `limit`, `after`,
    /// `before` order.
    ///
    /// Fails with `InvalidArgument` when both cursors are set or when
    /// `limit` is zero.
    pub fn to_query(&self) -> ApiResult<Query> {
        let mut query = Query::new();
        self.append_to(&mut query)?;
        Ok(query)
    }

    pub(crate) fn append_to(&self, query: &mut Query) -> ApiResult<()> {
        if self.after.is_some() && self.before.is_some() {
            return Err(ApiError::invalid_argument(
                "specify only one of 'after' or 'before'",
            ));
        }
        if let Some(limit) = self.limit {
            if limit == 0 {
                return Err(ApiError::invalid_argument("'limit' must be positive"));
            }
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(after) = &self.after {
            query.push(("after".to_string(), after.clone()));
        }
        if let Some(before) = &self.before {
            query.push(("before".to_string(), before.clone()));
        }
        Ok(())
    }
}

impl From<u32> for Paging {
    fn from(limit: u32) -> Self {
        Self::limit(limit)
    }
}
