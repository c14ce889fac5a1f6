// Allow pre-existing clippy lints across the codebase
#![allow(
    clippy::collapsible_if,
    clippy::unnecessary_map_or,
    clippy::redundant_closure,
    clippy::manual_strip,
    clippy::needless_range_loop,
    clippy::identity_op,
    clippy::len_without_is_empty,
    clippy::doc_lazy_continuation,
    clippy::empty_line_after_doc_comments,
    clippy::implicit_saturating_sub,
    clippy::manual_div_ceil,
    clippy::manual_range_contains,
    clippy::needless_borrows_for_generic_args,
    clippy::needless_lifetimes,
    clippy::needless_return,
    clippy::too_many_arguments,
    clippy::unnecessary_cast,
    clippy::write_literal,
    clippy::io_other_error
)]

/// Use mimalloc as the global allocator.
/// 2-3x faster than glibc malloc for small allocations, better thread-local
/// caching, and reduced fragmentation — matters here since every engine
/// allocates one small String/struct per record.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod config;
pub mod context;
pub mod deletion;
pub mod driver;
pub mod engine;
pub mod error;
pub mod fileset;
pub mod hasher;
pub mod logging;
pub mod model;
pub mod normalizer;
pub mod report;
pub mod scanner;
pub mod strategy;
