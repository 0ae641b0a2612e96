//! # Jot Architecture
//!
//! Jot is the storage core of a self-hosted scratch-note service. Notes get a
//! short generated name, are edited as plain text, and live as flat files in
//! date-partitioned directories. Partitions nobody touched for a week move to
//! a backup tier; a note can carry an inline lock token.
//!
//! Like any UI-agnostic library, it has a thin CLI client, and the same API
//! could sit behind HTTP routes.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, owns limits and config        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Locks, limits and reporting on top of the store          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - NoteStore trait: FileStore, InMemoryStore                │
//! │  - Name generator, existence cache, path index              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The [`sweep::Sweeper`] runs beside these layers on its own thread and
//! talks to the same store.
//!
//! ## Concurrency
//!
//! Stores take `&self` everywhere and are shared through `Arc`. The existence
//! cache and the path index are concurrent maps; side-car index writes go
//! through one mutex; saves to the same note are serialized per name. Each
//! global limit has its own `RwLock`.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business logic for each command
//! - [`store`]: Storage abstraction and implementations
//! - [`names`]: Name safety and generation
//! - [`cache`]: Existence cache
//! - [`index`]: Name to partition index with its JSON side-car
//! - [`lock`]: Inline lock marker codec
//! - [`sweep`]: Archival sweep and its background thread
//! - [`limits`]: Global write limits
//! - [`broadcast`]: Change notifications
//! - [`clock`]: Injectable time source
//! - [`model`]: The `Note` value type
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod broadcast;
pub mod cache;
pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod index;
pub mod limits;
pub mod lock;
pub mod model;
pub mod names;
pub mod store;
pub mod sweep;
