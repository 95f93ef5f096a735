use crate::contract::model::{Contact, ContactPage, NewContact};
use crate::domain::error::DomainError;
use async_trait::async_trait;
use uuid::Uuid;

/// Port for the domain layer: the generic collection operations the domain
/// needs from whatever store backs it. Object-safe and async-friendly via
/// `async_trait`.
///
/// Not-found is a typed `None`/`false`, never an error; the store's
/// unique-constraint violation surfaces as
/// [`DomainError::EmailAlreadyExists`] here, at the repository boundary.
#[async_trait]
pub trait ContactsRepository: Send + Sync {
    /// Insert a new contact. The store assigns the identifier and timestamps
    /// and returns the persisted record.
    async fn insert(&self, new: NewContact) -> Result<Contact, DomainError>;

    /// Load a contact by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Contact>, DomainError>;

    /// One page of contacts, optionally filtered by a case-insensitive
    /// substring match against name or email. `page` is 1-based.
    async fn find_page(
        &self,
        search: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> Result<ContactPage, DomainError>;

    /// Persist a fully-applied record (by primary key in `contact.id`).
    async fn update(&self, contact: &Contact) -> Result<(), DomainError>;

    /// Delete by id. Returns true if a record was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Uniqueness probe; `exclude_id` skips the record itself on updates.
    async fn email_exists(
        &self,
        email: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, DomainError>;
}
