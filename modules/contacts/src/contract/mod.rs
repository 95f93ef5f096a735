pub mod model;

pub use model::{Contact, ContactPage, ContactPatch, NewContact};
