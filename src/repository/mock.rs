//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::generation::{Generation, NewGeneration};
use crate::domain::types::{PublicId, UserId, Username};
use crate::domain::user::{NewUser, User};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    GenerationListQuery, GenerationReader, GenerationWriter, UserReader, UserWriter,
};

mock! {
    pub Repository {}

    impl UserReader for Repository {
        fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
        fn get_user_by_public_id(&self, public_id: &PublicId) -> RepositoryResult<Option<User>>;
        fn get_user_by_username(&self, username: &Username) -> RepositoryResult<Option<User>>;
    }

    impl UserWriter for Repository {
        fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
    }

    impl GenerationReader for Repository {
        fn list_generations(&self, query: GenerationListQuery) -> RepositoryResult<Vec<Generation>>;
        fn get_generation_by_public_id(
            &self,
            public_id: &PublicId,
        ) -> RepositoryResult<Option<Generation>>;
    }

    impl GenerationWriter for Repository {
        fn create_generation(&self, new_generation: &NewGeneration) -> RepositoryResult<Generation>;
        fn prune_generations(&self, user_id: UserId, keep: usize) -> RepositoryResult<usize>;
    }
}
