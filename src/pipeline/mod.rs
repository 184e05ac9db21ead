//! Pipeline stages for one field-extraction submission.
//!
//! Each submodule implements exactly one step, so each can be tested without
//! the others.
//!
//! ## Data Flow
//!
//! ```text
//! capture ──▶ submit ──▶ validate ──▶ render
//! (image/*)   (POST)     (JSON)       (table + stats)
//! ```
//!
//! 1. [`capture`]: accept an image upload, reject anything else, build the
//!    preview; no I/O beyond reading a picked file
//! 2. [`submit`]: multipart POST to `<endpoint>/analyze` with timeout and
//!    at most one retry; the only stage with network I/O
//! 3. [`validate`]: check the response shape, salvage good records, reject
//!    bad ones individually
//! 4. [`render`]: labels, confidence tiers, statistics and the text table

pub mod capture;
pub mod render;
pub mod submit;
pub mod validate;
