//! Repository areas
//!
//! Each area owns one on-disk surface: the object database, the staging
//! area, the reference store, and the working tree. [`repository::Repository`]
//! ties them together and is the entry point commands operate on.

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
