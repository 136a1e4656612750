use crate::{
    db::{DbConnection, DbPool, get_connection},
    domain::{
        generation::{Generation, NewGeneration},
        types::{PublicId, UserId, Username},
        user::{NewUser, User},
    },
    repository::errors::RepositoryResult,
};

pub mod errors;
pub mod generation;
pub mod memory;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod user;

pub use memory::MemoryRepository;

/// Diesel-backed repository sharing a SQLite connection pool.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}

/// Selection of a user's generations, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationListQuery {
    pub user_id: UserId,
    pub limit: Option<usize>,
}

impl GenerationListQuery {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            limit: None,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

pub trait UserReader {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
    fn get_user_by_public_id(&self, public_id: &PublicId) -> RepositoryResult<Option<User>>;
    fn get_user_by_username(&self, username: &Username) -> RepositoryResult<Option<User>>;
}

pub trait UserWriter {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
}

pub trait GenerationReader {
    fn list_generations(&self, query: GenerationListQuery) -> RepositoryResult<Vec<Generation>>;
    fn get_generation_by_public_id(
        &self,
        public_id: &PublicId,
    ) -> RepositoryResult<Option<Generation>>;
}

pub trait GenerationWriter {
    fn create_generation(&self, new_generation: &NewGeneration) -> RepositoryResult<Generation>;
    /// Deletes all but the `keep` newest generations of the user.
    fn prune_generations(&self, user_id: UserId, keep: usize) -> RepositoryResult<usize>;
}

/// Everything the HTTP layer needs from a storage backend.
pub trait Repository:
    UserReader + UserWriter + GenerationReader + GenerationWriter + Send + Sync
{
}

impl<T> Repository for T where
    T: UserReader + UserWriter + GenerationReader + GenerationWriter + Send + Sync
{
}
