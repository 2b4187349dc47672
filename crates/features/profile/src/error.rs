use std::borrow::Cow;

/// A specialized [`ProfileError`] enum of this crate.
#[farm_derive::farm_error]
pub enum ProfileError {
    #[error("Invalid profile{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Profile sync failed{}: {source}", format_context(.context))]
    Remote { source: farm_kernel::remote::RemoteError, context: Option<Cow<'static, str>> },
}
