use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::model::{Contact, ContactPage, ContactPatch, NewContact};

/// Response envelope: every endpoint answers `{message, data}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }

    pub fn success(data: T) -> Self {
        Self::new("Success", data)
    }
}

/// REST DTO for contact representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// REST DTO for creating a new contact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContactReq {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// REST DTO for updating a contact (partial)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateContactReq {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// REST DTO for one listing page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactPageDto {
    pub items: Vec<ContactDto>,
    pub total: u64,
    pub page: u64,
    pub last_page: u64,
    pub per_page: u64,
}

/// REST DTO for list query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct ListContactsQuery {
    pub search: Option<String>,
    pub page: Option<u64>,
}

/// REST DTO for a stored upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFileDto {
    pub path: String,
}

// Conversions between REST DTOs and contract models

impl From<Contact> for ContactDto {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id,
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            created_at: contact.created_at,
            updated_at: contact.updated_at,
        }
    }
}

impl From<CreateContactReq> for NewContact {
    fn from(req: CreateContactReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
            phone: req.phone,
        }
    }
}

impl From<UpdateContactReq> for ContactPatch {
    fn from(req: UpdateContactReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
            phone: req.phone,
        }
    }
}

impl From<ContactPage> for ContactPageDto {
    fn from(page: ContactPage) -> Self {
        Self {
            items: page.items.into_iter().map(ContactDto::from).collect(),
            total: page.total,
            page: page.page,
            last_page: page.last_page,
            per_page: page.per_page,
        }
    }
}
