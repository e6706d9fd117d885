use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("{0} is an invalid title")]
    InvalidTitle(String),

    #[error("{0} is not a valid age, expected something like 12h, 3d or 1w2d")]
    InvalidAge(String),

    #[error("{0} is not a valid language")]
    InvalidLanguage(String),
}
