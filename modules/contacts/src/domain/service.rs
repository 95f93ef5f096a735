use std::sync::Arc;

use crate::contract::model::{Contact, ContactPage, ContactPatch, NewContact};
use crate::domain::error::DomainError;
use crate::domain::repo::ContactsRepository;
use crate::domain::validate;
use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Domain service with the business rules for contact management.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn ContactsRepository>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub page_size: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

impl Service {
    pub fn new(repo: Arc<dyn ContactsRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    /// List contacts with an optional name/email substring filter.
    /// `page` is 1-based; anything below 1 is clamped to the first page.
    #[instrument(name = "contacts.service.list", skip(self))]
    pub async fn list_contacts(
        &self,
        search: Option<String>,
        page: Option<u64>,
    ) -> Result<ContactPage, DomainError> {
        debug!("Listing contacts");

        let page = page.unwrap_or(1).max(1);
        let search = search.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let result = self
            .repo
            .find_page(search, page, self.config.page_size)
            .await?;
        debug!("Listed {} contacts on page {}", result.items.len(), page);
        Ok(result)
    }

    #[instrument(name = "contacts.service.get", skip(self), fields(contact_id = %id))]
    pub async fn get_contact(&self, id: Uuid) -> Result<Contact, DomainError> {
        debug!("Getting contact by id");

        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::contact_not_found(id))
    }

    #[instrument(
        name = "contacts.service.create",
        skip(self),
        fields(email = %new.email)
    )]
    pub async fn create_contact(&self, new: NewContact) -> Result<Contact, DomainError> {
        info!("Creating contact");

        first_rule_failure(validate::validate_new_contact(&new))?;

        // Read-then-check; the unique index backs this up under races.
        if self.repo.email_exists(&new.email, None).await? {
            return Err(DomainError::email_already_exists(new.email));
        }

        let contact = self.repo.insert(new).await?;
        info!("Created contact with id={}", contact.id);
        Ok(contact)
    }

    /// Apply a partial update; omitted fields keep their prior values.
    #[instrument(name = "contacts.service.update", skip(self, patch), fields(contact_id = %id))]
    pub async fn update_contact(
        &self,
        id: Uuid,
        patch: ContactPatch,
    ) -> Result<Contact, DomainError> {
        info!("Updating contact");

        let mut current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::contact_not_found(id))?;

        first_rule_failure(validate::validate_contact_patch(&patch))?;

        // Uniqueness excludes the record itself, so keeping the same email
        // on update is always allowed.
        if let Some(ref new_email) = patch.email {
            if self.repo.email_exists(new_email, Some(id)).await? {
                return Err(DomainError::email_already_exists(new_email.clone()));
            }
        }

        if let Some(name) = patch.name {
            current.name = name;
        }
        if let Some(email) = patch.email {
            current.email = email;
        }
        if let Some(phone) = patch.phone {
            current.phone = phone;
        }
        current.updated_at = Utc::now();

        self.repo.update(&current).await?;
        info!("Updated contact");
        Ok(current)
    }

    #[instrument(name = "contacts.service.delete", skip(self), fields(contact_id = %id))]
    pub async fn delete_contact(&self, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting contact");

        let deleted = self.repo.delete(id).await?;
        if !deleted {
            return Err(DomainError::contact_not_found(id));
        }

        info!("Deleted contact");
        Ok(())
    }
}

/// Collapse a validator result into the first failing rule.
fn first_rule_failure(result: Result<(), Vec<validate::FieldError>>) -> Result<(), DomainError> {
    match result {
        Ok(()) => Ok(()),
        Err(errors) => errors
            .into_iter()
            .next()
            .map_or(Ok(()), |first| {
                Err(DomainError::validation(first.field, first.message))
            }),
    }
}
