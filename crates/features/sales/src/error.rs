use std::borrow::Cow;

/// A specialized [`SalesError`] enum of this crate.
#[farm_derive::farm_error]
pub enum SalesError {
    #[error("Invalid sale{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal sales error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
