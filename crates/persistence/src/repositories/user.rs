//! User repository.

use std::sync::Arc;

use domain::models::User;

use super::tables::USERS;
use crate::store::{from_rows, Filter, RecordStore, StoreError};

/// Repository for the `Users` table.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn RecordStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Finds the single user with this username (and role, if given).
    ///
    /// Returns `None` when no row or more than one row matches.
    pub async fn find_by_username(
        &self,
        username: &str,
        role: Option<&str>,
    ) -> Result<Option<User>, StoreError> {
        let mut filters = vec![Filter::eq("Username", username)];
        if let Some(role) = role {
            filters.push(Filter::eq("Role", role));
        }

        let rows = self
            .store
            .select(USERS, "Username,Password,Role", &filters)
            .await?;
        if rows.len() != 1 {
            return Ok(None);
        }
        Ok(from_rows::<User>(rows)?.pop())
    }
}
