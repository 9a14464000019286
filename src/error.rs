use std::{io,num};

use thiserror::Error;


pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error,Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    IO(#[from] io::Error),
    #[error("CSV error: {0}")]
    CSV(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JSON(#[from] serde_json::Error),
    #[error("Request error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("HTTP error: {0}")]
    HttpError(reqwest::StatusCode),
    #[error("Integer parse error: {value:?}: {source}")]
    ParseInt { value: String, source: num::ParseIntError },
    #[error("Date parse error: {0}")]
    ParseDate(#[from] chrono::format::ParseError),
    #[error("Missing column: {0}")]
    MissingColumn(String),
    #[error("No source for dataset {0}")]
    MissingSource(&'static str),
    #[error("No data!")]
    MissingData,
}
