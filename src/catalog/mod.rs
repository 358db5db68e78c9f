pub mod handle;
pub mod registry;
pub mod attachments;
pub mod guard;
pub mod lifecycle;
