use thiserror::Error;

#[derive(Error, Debug)]
pub enum OreganoError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Not recognized as a valid account id, alias or transaction id: {0}")]
    NotFound(String),

    #[error("Alias already assigned to another account: {0}")]
    DuplicateAlias(String),

    #[error("Alias must start with a letter or underscore and contain only letters, numbers, or underscore: {0}")]
    InvalidAlias(String),

    #[error("Unrecognized flag: {0}")]
    UnrecognizedFlag(String),

    #[error("{flag} expects {expected} argument(s), found {found}")]
    MissingArguments {
        flag: String,
        expected: usize,
        found: usize,
    },

    #[error("Missing required arguments")]
    MissingRequiredPositional,

    #[error("No item {0} in the working list")]
    InvalidHandle(String),

    #[error("Could not parse {what} from '{input}'")]
    Parse { what: &'static str, input: String },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

impl OreganoError {
    pub fn parse(what: &'static str, input: &str) -> Self {
        Self::Parse {
            what,
            input: input.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OreganoError>;
