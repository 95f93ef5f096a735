//! SeaORM-backed repository implementation for the domain port.
//!
//! Generic over `C: ConnectionTrait`, so it can be constructed with a
//! `DatabaseConnection` or a transactional connection.

use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use crate::contract::model::{Contact, ContactPage, NewContact};
use crate::domain::error::DomainError;
use crate::domain::repo::ContactsRepository;
use crate::infra::storage::entity::{ActiveModel as ContactAM, Column, Entity as ContactEntity};
use crate::infra::storage::mapper::entity_to_contract;

pub struct SeaOrmContactsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmContactsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// Wrap a store failure, keeping unique-violations distinguishable.
fn map_db_err(op: &str, email: Option<&str>, e: sea_orm::DbErr) -> DomainError {
    if let Some(SqlErr::UniqueConstraintViolation(_)) = e.sql_err() {
        if let Some(email) = email {
            return DomainError::email_already_exists(email);
        }
    }
    DomainError::database(format!("{op}: {e}"))
}

#[async_trait::async_trait]
impl<C> ContactsRepository for SeaOrmContactsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn insert(&self, new: NewContact) -> Result<Contact, DomainError> {
        let now = Utc::now();
        let model = ContactAM {
            id: Set(Uuid::new_v4()),
            name: Set(new.name),
            email: Set(new.email.clone()),
            phone: Set(new.phone),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model
            .insert(&self.conn)
            .await
            .map_err(|e| map_db_err("insert failed", Some(&new.email), e))?;
        Ok(entity_to_contract(inserted))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Contact>, DomainError> {
        let found = ContactEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(|e| map_db_err("find_by_id failed", None, e))?;
        Ok(found.map(entity_to_contract))
    }

    async fn find_page(
        &self,
        search: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> Result<ContactPage, DomainError> {
        let mut query = ContactEntity::find();

        if let Some(needle) = search {
            let pattern = format!("%{}%", needle.to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(Column::Name)))
                            .like(pattern.clone()),
                    )
                    .add(Expr::expr(Func::lower(Expr::col(Column::Email))).like(pattern)),
            );
        }

        let paginator = query
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .paginate(&self.conn, per_page);

        let counts = paginator
            .num_items_and_pages()
            .await
            .map_err(|e| map_db_err("count failed", None, e))?;

        // fetch_page is 0-based; a page past the end is an empty list.
        let rows = paginator
            .fetch_page(page.max(1) - 1)
            .await
            .map_err(|e| map_db_err("find_page failed", None, e))?;

        Ok(ContactPage {
            items: rows.into_iter().map(entity_to_contract).collect(),
            total: counts.number_of_items,
            page,
            last_page: counts.number_of_pages.max(1),
            per_page,
        })
    }

    async fn update(&self, contact: &Contact) -> Result<(), DomainError> {
        let model = ContactAM {
            id: Set(contact.id),
            name: Set(contact.name.clone()),
            email: Set(contact.email.clone()),
            phone: Set(contact.phone.clone()),
            created_at: Set(contact.created_at),
            updated_at: Set(contact.updated_at),
        };

        model.update(&self.conn).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => DomainError::contact_not_found(contact.id),
            other => map_db_err("update failed", Some(&contact.email), other),
        })?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let res = ContactEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .map_err(|e| map_db_err("delete failed", None, e))?;
        Ok(res.rows_affected > 0)
    }

    async fn email_exists(
        &self,
        email: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, DomainError> {
        let mut query = ContactEntity::find().filter(Column::Email.eq(email));
        if let Some(id) = exclude_id {
            query = query.filter(Column::Id.ne(id));
        }

        let count = query
            .count(&self.conn)
            .await
            .map_err(|e| map_db_err("email_exists failed", None, e))?;
        Ok(count > 0)
    }
}
