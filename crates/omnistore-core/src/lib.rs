//! Omnistore Core Library
//!
//! This crate provides a uniform storage-adapter abstraction: one contract
//! for key-based object operations (read, write, delete, rename, existence,
//! listing, metadata, checksum) over heterogeneous object-store backends.
//!
//! The pieces:
//!
//! - [`StorageAdapter`]: the uniform operation set, written once against the
//!   capability interface.
//! - [`client::ObjectClient`]: the minimal primitive set a backend client
//!   must expose, with S3-compatible, filesystem and in-memory clients.
//! - [`ContainerLifecycle`]: lazy, memoized resolve-or-create of the
//!   backing container.
//! - [`Error`]: the canonical error taxonomy every operation surfaces.

pub mod adapter;
pub mod client;
pub mod config;
pub mod container;
pub mod error;
mod mime;

pub use adapter::StorageAdapter;
pub use client::{
    create_client, ClientConfig, ClientError, ClientResult, FilesystemClient, MemoryClient,
    ObjectClient, ObjectStat, ObjectSummary, PutOptions, S3Client, S3Config,
};
pub use config::{AccessPolicy, AdapterConfig};
pub use container::{ContainerHandle, ContainerLifecycle};
pub use error::{Error, Operation, Result};
