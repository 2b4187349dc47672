use farm_derive::farm_error;
use std::borrow::Cow;

#[farm_error]
pub enum LedgerError {
    #[error("I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Ledger is closed")]
    Closed {},

    #[error("Internal ledger error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn open() -> Result<(), LedgerError> {
    Err(std::io::Error::other("disk gone")).context("Opening ledger")
}

fn main() {
    let err = open().unwrap_err();
    assert!(err.to_string().contains("(Opening ledger)"));

    let internal: LedgerError = "boom".into();
    assert!(matches!(internal, LedgerError::Internal { .. }));
}
