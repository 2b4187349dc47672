use std::borrow::Cow;

/// A specialized [`FeedError`] enum of this crate.
#[farm_derive::farm_error]
pub enum FeedError {
    #[error("Invalid feed record{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal feed error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
