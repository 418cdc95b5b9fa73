use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    ArrowError(String),

    /// 快照中出现无法解析的日期，整张表构建失败
    #[error("Malformed date: {date:?}")]
    MalformedDate { date: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Column {column} is not numeric")]
    NotNumeric { column: String },

    #[error("Data error: {0}")]
    DataError(String),
}

pub type Result<T> = std::result::Result<T, FlowError>;

impl From<arrow::error::ArrowError> for FlowError {
    fn from(e: arrow::error::ArrowError) -> Self {
        FlowError::ArrowError(e.to_string())
    }
}

// 用于从字符串创建错误
impl From<String> for FlowError {
    fn from(s: String) -> Self {
        FlowError::DataError(s)
    }
}

impl From<&str> for FlowError {
    fn from(s: &str) -> Self {
        FlowError::DataError(s.to_string())
    }
}
