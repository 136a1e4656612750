//! Process-local repository keeping users and generations in maps.
//!
//! Used when the server runs with `storage: memory` and by tests that do not
//! need a database file. State is shared between clones.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::generation::{Generation, NewGeneration};
use crate::domain::types::{GenerationId, PublicId, UserId, Username};
use crate::domain::user::{NewUser, User};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    GenerationListQuery, GenerationReader, GenerationWriter, UserReader, UserWriter,
};

#[derive(Debug, Default)]
struct MemoryState {
    next_user_id: i32,
    next_generation_id: i32,
    users: HashMap<i32, User>,
    generations: HashMap<i32, Generation>,
}

#[derive(Clone, Debug, Default)]
pub struct MemoryRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|e| RepositoryError::Unexpected(format!("Poisoned state lock: {e}")))
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|e| RepositoryError::Unexpected(format!("Poisoned state lock: {e}")))
    }
}

/// Newest first; ids grow with insertion so they break timestamp ties.
fn newest_first(a: &Generation, b: &Generation) -> std::cmp::Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.get().cmp(&a.id.get()))
}

fn user_generations(state: &MemoryState, user_id: UserId) -> Vec<&Generation> {
    let mut items = state
        .generations
        .values()
        .filter(|generation| generation.user_id == user_id)
        .collect::<Vec<_>>();
    items.sort_by(|a, b| newest_first(a, b));
    items
}

impl UserReader for MemoryRepository {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        Ok(self.read()?.users.get(&id.get()).cloned())
    }

    fn get_user_by_public_id(&self, public_id: &PublicId) -> RepositoryResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|user| &user.public_id == public_id)
            .cloned())
    }

    fn get_user_by_username(&self, username: &Username) -> RepositoryResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|user| &user.username == username)
            .cloned())
    }
}

impl UserWriter for MemoryRepository {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User> {
        let mut state = self.write()?;

        if state
            .users
            .values()
            .any(|user| user.username == new_user.username)
        {
            return Err(RepositoryError::ConstraintViolation(format!(
                "Unique constraint violation: username {}",
                new_user.username
            )));
        }

        state.next_user_id += 1;
        let user = User {
            id: UserId::new(state.next_user_id)?,
            public_id: new_user.public_id,
            username: new_user.username.clone(),
            password_hash: new_user.password_hash.clone(),
        };
        state.users.insert(user.id.get(), user.clone());

        Ok(user)
    }
}

impl GenerationReader for MemoryRepository {
    fn list_generations(&self, query: GenerationListQuery) -> RepositoryResult<Vec<Generation>> {
        let state = self.read()?;
        let items = user_generations(&state, query.user_id).into_iter().cloned();

        Ok(match query.limit {
            Some(limit) => items.take(limit).collect(),
            None => items.collect(),
        })
    }

    fn get_generation_by_public_id(
        &self,
        public_id: &PublicId,
    ) -> RepositoryResult<Option<Generation>> {
        Ok(self
            .read()?
            .generations
            .values()
            .find(|generation| &generation.public_id == public_id)
            .cloned())
    }
}

impl GenerationWriter for MemoryRepository {
    fn create_generation(&self, new_generation: &NewGeneration) -> RepositoryResult<Generation> {
        let mut state = self.write()?;

        if !state.users.contains_key(&new_generation.user_id.get()) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "Foreign key constraint violation: user {}",
                new_generation.user_id
            )));
        }

        state.next_generation_id += 1;
        let generation = Generation {
            id: GenerationId::new(state.next_generation_id)?,
            public_id: new_generation.public_id,
            user_id: new_generation.user_id,
            prompt: new_generation.prompt.clone(),
            style: new_generation.style,
            image_url: new_generation.image_url.clone(),
            uploaded_image: new_generation.uploaded_image.clone(),
            created_at: new_generation.created_at,
        };
        state
            .generations
            .insert(generation.id.get(), generation.clone());

        Ok(generation)
    }

    fn prune_generations(&self, user_id: UserId, keep: usize) -> RepositoryResult<usize> {
        let mut state = self.write()?;

        let stale = user_generations(&state, user_id)
            .into_iter()
            .skip(keep)
            .map(|generation| generation.id.get())
            .collect::<Vec<_>>();

        for id in &stale {
            state.generations.remove(id);
        }

        Ok(stale.len())
    }
}
