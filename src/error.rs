use thiserror::Error;

#[derive(Error, Debug)]
pub enum RdkError {
    #[error("Data not loaded: {0}")]
    NotLoaded(String),

    #[error("Unsupported file format: '{0}'. Use .csv or .xlsx.")]
    UnsupportedFormat(String),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "python")]
impl From<RdkError> for pyo3::PyErr {
    fn from(err: RdkError) -> pyo3::PyErr {
        pyo3::exceptions::PyRuntimeError::new_err(err.to_string())
    }
}
