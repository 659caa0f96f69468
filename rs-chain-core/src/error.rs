use thiserror::Error;

/// Errors raised while building, persisting or walking a chain.
///
/// Running off the end of known data mid-walk and finding no sentence
/// boundary to truncate at are normal outcomes, not errors.
#[derive(Debug, Error)]
pub enum ChainError {
	#[error("prefix length must be >= 1, got {0}")]
	InvalidPrefixLength(usize),

	#[error("no seed available: no prefix starting with an uppercase letter after {attempts} attempts")]
	NoSeed { attempts: usize },

	#[error("custom seed cannot be empty")]
	EmptySeed,

	#[error("seed attempts must be >= 1")]
	InvalidSeedAttempts,

	#[error("no corpus to build from: {0}")]
	NoCorpus(String),

	#[error("corrupt model: {0}")]
	CorruptModel(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Codec(#[from] postcard::Error),
}

pub type Result<T> = std::result::Result<T, ChainError>;
