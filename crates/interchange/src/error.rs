use thiserror::Error;

/// Markup could not be turned into a document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("malformed markup at {row}:{col}: {message}")]
    Malformed { row: u32, col: u32, message: String },

    #[error("invalid {attribute}=\"{value}\" on <{element}> at {row}:{col}: {reason}")]
    InvalidAttribute {
        row: u32,
        col: u32,
        element: String,
        attribute: String,
        value: String,
        reason: String,
    },

    #[error("root element is <{0}>, expected <svg>")]
    NotSvg(String),
}

/// A document could not be written as markup.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write markup: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("markup is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Something in the markup was dropped or changed while reading it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseWarning {
    pub row: u32,
    pub col: u32,
    pub message: String,
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.row, self.col, self.message)
    }
}
