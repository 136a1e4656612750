//! Repository implementation for generation history.

use diesel::prelude::*;

use crate::{
    domain::{
        generation::{Generation, NewGeneration},
        types::{PublicId, UserId},
    },
    models::generation::{Generation as DbGeneration, NewGeneration as DbNewGeneration},
    repository::{
        DieselRepository, GenerationListQuery, GenerationReader, GenerationWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

impl GenerationReader for DieselRepository {
    fn list_generations(&self, query: GenerationListQuery) -> RepositoryResult<Vec<Generation>> {
        use crate::schema::generations;

        let mut conn = self.conn()?;

        let mut items = generations::table
            .filter(generations::user_id.eq(query.user_id.get()))
            .order((generations::created_at.desc(), generations::id.desc()))
            .into_boxed();

        if let Some(limit) = query.limit {
            items = items.limit(limit as i64);
        }

        items
            .load::<DbGeneration>(&mut conn)?
            .into_iter()
            .map(|db_generation| Generation::try_from(db_generation).map_err(RepositoryError::from))
            .collect()
    }

    fn get_generation_by_public_id(
        &self,
        public_id: &PublicId,
    ) -> RepositoryResult<Option<Generation>> {
        use crate::schema::generations;

        let mut conn = self.conn()?;
        let db_generation = generations::table
            .filter(generations::public_id.eq(public_id.to_string()))
            .first::<DbGeneration>(&mut conn)
            .optional()?;

        match db_generation {
            Some(db_generation) => Ok(Some(
                Generation::try_from(db_generation).map_err(RepositoryError::from)?,
            )),
            None => Ok(None),
        }
    }
}

impl GenerationWriter for DieselRepository {
    fn create_generation(&self, new_generation: &NewGeneration) -> RepositoryResult<Generation> {
        use crate::schema::generations;

        let mut conn = self.conn()?;
        let db_new_generation: DbNewGeneration = new_generation.into();

        let db_generation = diesel::insert_into(generations::table)
            .values(&db_new_generation)
            .get_result::<DbGeneration>(&mut conn)?;

        Generation::try_from(db_generation).map_err(RepositoryError::from)
    }

    fn prune_generations(&self, user_id: UserId, keep: usize) -> RepositoryResult<usize> {
        use crate::schema::generations;

        let mut conn = self.conn()?;

        conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            let kept = generations::table
                .filter(generations::user_id.eq(user_id.get()))
                .order((generations::created_at.desc(), generations::id.desc()))
                .limit(keep as i64)
                .select(generations::id)
                .load::<i32>(conn)?;

            diesel::delete(
                generations::table
                    .filter(generations::user_id.eq(user_id.get()))
                    .filter(generations::id.ne_all(kept)),
            )
            .execute(conn)
        })
        .map_err(RepositoryError::from)
    }
}
