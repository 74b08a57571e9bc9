//! # Tagsort Architecture
//!
//! Tagsort sorts and renames files according to the tags embedded in their
//! names. A rule file (the *schema*) describes where files go and what they
//! are called; group files describe which tags belong together. Tagsort is a
//! library that happens to ship a CLI.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs)                               │
//! │  - Parses arguments, merges the config file, starts logging │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, owns the loaded rules         │
//! │  - Returns structured Result types                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - scan, destination, naming, relocate, clean               │
//! │  - Operates on FileRecords, returns CmdResult               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Rule Engine (filter/, format/, groups.rs, schema.rs)       │
//! │  - Pure evaluation of filters and format strings            │
//! │  - No file system access beyond loading rule files          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules in Brief
//!
//! A *filter* is a list of condition sets, any of which may match. A
//! condition set joins conditions with `/&|`, all of which must match. A
//! condition is a tag, `/G|group`, `/C|category`, `/*|` or a negation `/!|`
//! of one of those.
//!
//! A *format string* builds a name or folder from text and operators such as
//! `/FILE|`, `/TAGS|` and `/EXT|`. See [`format`] for the whole grammar.
//!
//! The *movement schema* is a tree of filters with subfolders. A file walks
//! the tree and ends up in the deepest folder it fully matches; see
//! [`commands::destination`]. Renaming rules are tried in order and the first
//! match names the file; see [`commands::naming`].
//!
//! ## Testing Strategy
//!
//! 1. **Rule engine and commands**: unit tests next to the code. This is
//!    where most testing lives.
//! 2. **API**: dispatch and pipeline tests in `api.rs`, scenario tests in
//!    `tests/scenarios.rs`.
//! 3. **CLI**: end-to-end runs of the binary in `tests/cli.rs`.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Scanning, placing, naming, moving and cleaning
//! - [`filter`]: Conditions, condition sets and filters
//! - [`format`]: Format string lexer and evaluator
//! - [`groups`]: Tag groups and the [`groups::GroupResolver`] trait
//! - [`schema`]: Schema files and rule types
//! - [`model`]: [`model::FileRecord`] and tag formats
//! - [`config`]: `.tagsortrc` files
//! - [`settings`]: Merging command line and config file
//! - [`logging`]: Tracing setup
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod file_version;
pub mod filter;
pub mod format;
pub mod groups;
pub mod logging;
pub mod model;
pub mod pattern;
pub mod schema;
pub mod settings;
