use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::api::rest::dto::{
    ApiResponse, ContactDto, ContactPageDto, CreateContactReq, ListContactsQuery,
    UpdateContactReq, UploadedFileDto,
};
use crate::api::rest::error::ApiError;
use crate::domain::service::Service;
use crate::domain::validate;
use crate::infra::files::UploadStore;

/// Upload size limit, shared with the router's body-limit layer.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimit {
    pub max_kb: usize,
}

/// Store an uploaded contacts file. The file is only persisted here; the
/// ingestion worker picks it up from the directory.
pub async fn upload_contacts_file(
    Extension(store): Extension<Arc<UploadStore>>,
    Extension(limit): Extension<UploadLimit>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadedFileDto>>, ApiError> {
    info!("Receiving contact file upload");

    let mut file: Option<(Option<String>, Option<String>, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(ApiError::validation(format!("Malformed upload: {e}"))),
        };

        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(ToString::to_string);
        let content_type = field.content_type().map(ToString::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("Malformed upload: {e}")))?;

        file = Some((file_name, content_type, bytes.to_vec()));
        break;
    }

    let Some((file_name, content_type, bytes)) = file else {
        return Err(ApiError::validation("The file field is required"));
    };

    if let Err(errors) = validate::validate_upload(
        file_name.as_deref(),
        content_type.as_deref(),
        bytes.len(),
        limit.max_kb,
    ) {
        // Single aggregate failure: only the first message goes to the wire.
        return Err(ApiError::validation(errors[0].message.clone()));
    }

    let path = store.store(&bytes).await.map_err(|e| {
        error!("Failed to store uploaded file: {e:#}");
        ApiError::internal(format!("File upload failed: {e}"))
    })?;

    Ok(Json(ApiResponse::new(
        "File uploaded successfully",
        UploadedFileDto {
            path: path.to_string_lossy().to_string(),
        },
    )))
}

/// List contacts with optional search filter and pagination
pub async fn list_contacts(
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<ListContactsQuery>,
) -> Result<Json<ApiResponse<ContactPageDto>>, ApiError> {
    info!("Listing contacts with query: {:?}", query);

    match svc.list_contacts(query.search, query.page).await {
        Ok(page) => Ok(Json(ApiResponse::success(page.into()))),
        Err(e) => {
            error!("Failed to list contacts: {}", e);
            Err(ApiError::from_domain("Failed to retrieve contacts", e))
        }
    }
}

/// Get a single contact by ID
pub async fn get_contact(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ContactDto>>, ApiError> {
    info!("Getting contact with id: {}", id);

    let id = parse_contact_id(&id)?;
    match svc.get_contact(id).await {
        Ok(contact) => Ok(Json(ApiResponse::success(contact.into()))),
        Err(e) => {
            error!("Failed to get contact {}: {}", id, e);
            Err(ApiError::from_domain("Failed to retrieve contact", e))
        }
    }
}

/// Create a new contact
pub async fn create_contact(
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<CreateContactReq>,
) -> Result<(StatusCode, Json<ApiResponse<ContactDto>>), ApiError> {
    info!("Creating contact: {:?}", req);

    match svc.create_contact(req.into()).await {
        Ok(contact) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::new(
                "Contact created successfully",
                contact.into(),
            )),
        )),
        Err(e) => {
            error!("Failed to create contact: {}", e);
            Err(ApiError::from_domain("Failed to create contact", e))
        }
    }
}

/// Update an existing contact with a partial payload
pub async fn update_contact(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateContactReq>,
) -> Result<Json<ApiResponse<ContactDto>>, ApiError> {
    info!("Updating contact {} with: {:?}", id, req);

    let id = parse_contact_id(&id)?;
    match svc.update_contact(id, req.into()).await {
        Ok(contact) => Ok(Json(ApiResponse::success(contact.into()))),
        Err(e) => {
            error!("Failed to update contact {}: {}", id, e);
            Err(ApiError::from_domain("Failed to update contact", e))
        }
    }
}

/// Delete a contact by ID
pub async fn delete_contact(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    info!("Deleting contact: {}", id);

    let id = parse_contact_id(&id)?;
    match svc.delete_contact(id).await {
        Ok(()) => Ok(Json(ApiResponse::new(
            "Contact deleted successfully",
            json!([]),
        ))),
        Err(e) => {
            error!("Failed to delete contact {}: {}", id, e);
            Err(ApiError::from_domain("Failed to delete contact", e))
        }
    }
}

/// An identifier that isn't a UUID can't resolve to a record, so it gets
/// the same 404 as an unknown one.
fn parse_contact_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError {
        status: StatusCode::NOT_FOUND,
        message: "Contact not found".to_string(),
    })
}
