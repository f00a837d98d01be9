//! Foldersync Core - Domain types, configuration and ports
//!
//! This crate contains the pure core of the one-way mirroring engine:
//! - **Domain types** - `MirrorRoots` (path mapping), `EntryState`
//!   (classification), `MutationRecord` (mutation outcomes)
//! - **Port definitions** - Traits for adapters: `IMirrorFileSystem`, `IOutcomeReporter`
//! - **Configuration** - YAML-backed settings with validation
//!
//! # Architecture
//!
//! The domain module performs no I/O. Ports define the trait interfaces
//! that the reconciliation engine depends on; the adapters live in
//! `foldersync-sync`.

pub mod config;
pub mod domain;
pub mod ports;
