//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use mongodb::{
    bson::{doc, oid::ObjectId},
    Collection, Database,
};
use tracing::instrument;

use crate::error::UserResult;
use crate::models::User;
use crate::repository::UserRepository;

#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<User>("users"),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self), fields(user_id = %id))]
    async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        let user = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let pattern = format!("^{}$", regex::escape(email));
        let user = self
            .collection
            .find_one(doc! { "email": { "$regex": pattern, "$options": "i" } })
            .await?;
        Ok(user)
    }
}
