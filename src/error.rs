/// Possible errors to occur while building a revenue report
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not access the file")]
    Io(#[from] std::io::Error),
    #[error("the input is not valid delimited text")]
    Csv(#[from] csv::Error),
    #[error("the required column `{column}` does not exist")]
    MissingColumn { column: &'static str },
    #[error("the value `{value}` in column `{column}` is not a number")]
    InvalidNumber { column: &'static str, value: String },
    #[error("the value `{value}` is not a recognized date-time")]
    InvalidDate { value: String },
    #[error("`{token}` is not a recognized time grain")]
    UnknownGrain { token: String },
    #[error("could not render the chart: {message}")]
    Chart { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
