use crate::contract::model::Contact;
use crate::infra::storage::entity::Model as ContactEntity;

/// Convert a database entity to a contract model
pub fn entity_to_contract(entity: ContactEntity) -> Contact {
    Contact {
        id: entity.id,
        name: entity.name,
        email: entity.email,
        phone: entity.phone,
        created_at: entity.created_at,
        updated_at: entity.updated_at,
    }
}
