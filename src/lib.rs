//! # Cdnvend Core Library
//!
//! This crate contains the core logic of the `cdnvend` tool – a mirror of
//! CDN-hosted frontend libraries into a local vendor directory.
//!
//! `cdnvend` asks a package-registry API (cdnjs by default) for library
//! metadata, caches the answers locally, and downloads complete version
//! file sets into `<vendor_dir>/<library>/<version>/`. Downloads are staged
//! and only promoted once every file is present, so the vendor tree never
//! holds a half-installed version.
//!
//! This library is built for the `cdnvend` CLI, but you can also reuse it as
//! a backend in other tools.
//!
//! ## Modules Overview
//! - [`config`] – Parsing and serialization of `cdnvend.toml` config files
//! - [`metadata`] – Canonical typed registry metadata and its normalization
//! - [`cache`] – TTL-gated metadata cache (memory, disk, registry)
//! - [`downloader`] – Staged, batched asset downloads and version removal
//! - [`index`] – The aggregate local-library index (full rescan, snapshot)
//! - [`paths`] – Vendor tree layout (versions, staging, cache entry files)


pub mod config;
pub mod metadata;
pub mod cache;
pub mod downloader;
pub mod index;
pub mod paths;

pub use cache::*;
pub use config::*;
pub use downloader::*;
pub use index::*;
pub use metadata::*;
pub use paths::*;
