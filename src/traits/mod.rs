//! Trait definitions for Hub operations.
//!
//! Each entity type implements the traits it supports. Most behaviour lives
//! in default methods; implementations only say where the resource lives and
//! which media type it speaks.

mod create;
mod delete;
mod get;
mod list;
mod update;

pub use create::Create;
pub use delete::{delete_href, Delete};
pub use get::Get;
pub use list::List;
pub use update::Update;
