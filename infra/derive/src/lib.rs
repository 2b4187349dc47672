#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the FarmHub workspace.
//!
//! * [`farm_error`] turns a plain enum into a context-aware `thiserror` error.
//! * [`main`] wraps an `async fn main` in a runtime built by `farm-runtime`.
//!
//! Examples are `ignore`d here because a proc-macro crate cannot use its own macros;
//! the consuming crates exercise them in their tests.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, parse_macro_input};

/// Bootstraps a `farm-runtime` Tokio runtime around an `async fn main`.
///
/// # Arguments
///
/// * `event_loop` - Current-thread runtime. Mirrors the single-threaded UI model (default).
/// * `background` - Multi-threaded runtime for sync-heavy tooling.
///
/// # Examples
///
/// ```rust,ignore
/// #[farm_runtime::main(event_loop)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Defines a crate error enum with context support.
///
/// Every variant uses named fields. A variant may carry a `context: Option<Cow<'static, str>>`
/// field; a variant wrapping an upstream error names it `source` (or marks it with
/// `#[source]`/`#[from]`) and must then carry `context` as well.
///
/// # Generated items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `<Name>Ext` with `.context(..)` for `Result<T, Name>` and for `Result<T, Source>`.
/// * `From<Source>` for every variant with a source.
/// * `From<&'static str>` / `From<String>` when an `Internal { message, context }` variant exists.
/// * A private `format_context` helper for use inside `#[error(..)]` strings.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[farm_derive::farm_error]
/// pub enum StoreError {
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal store error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load() -> Result<Vec<u8>, StoreError> {
///     std::fs::read("data.json").context("Reading snapshot")
/// }
/// ```
#[proc_macro_attribute]
pub fn farm_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}
