// MIT License - Copyright (c) 2026 hekit authors

use crate::connection::ConnectionOp;
use crate::install::Stage;

/// All errors that can occur in the hekit library.
#[derive(Debug, thiserror::Error)]
pub enum KitError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error while parsing config file {path}: {reason}")]
    ConfigFile { path: String, reason: String },

    #[error("Config key '{key}' must not be empty")]
    EmptyConfigValue { key: &'static str },

    #[error("HOME environment variable is not set")]
    NoHomeDir,

    #[error("Wrong syntax for range given '{input}'.")]
    RangeSyntax { input: String },

    #[error("backward range '{input}'")]
    BackwardRange { input: String },

    #[error("Cannot process number higher than {max}")]
    PrimeTableExceeded { max: u64 },

    #[error("Invalid prime table line '{line}' in {path}")]
    PrimeTableParse { path: String, line: String },

    #[error("{p}^{d} - 1 does not fit in 64 bits")]
    PowerOverflow { p: u64, d: u64 },

    #[error("Error while parsing recipe file {path}: {reason}")]
    RecipeFile { path: String, reason: String },

    #[error("Wrong format for {parts:?}. Expected key=value")]
    RecipeArgFormat { parts: Vec<String> },

    #[error("Unknown symbol '%{symbol}%' in recipe command")]
    RecipeSymbol { symbol: String },

    #[error("Unterminated '%' symbol in recipe command '{command}'")]
    RecipeSymbolUnterminated { command: String },

    #[error("Unknown stage '{name}' (expected setup, fetch, build or install)")]
    UnknownStage { name: String },

    #[error("Stage {stage} failed for {component}/{instance}: {reason}")]
    StageFailed {
        stage: Stage,
        component: String,
        instance: String,
        reason: String,
    },

    #[error("Connection failure during {op}: {source}")]
    Connection {
        op: ConnectionOp,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl KitError {
    /// Wrap an implementation-specific failure of one of the five
    /// data-connection operations.
    pub fn connection(
        op: ConnectionOp,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        KitError::Connection {
            op,
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KitError>;
