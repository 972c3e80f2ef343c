use thiserror::Error;

/// Errors raised while reading an org chart team list.
#[derive(Debug, Error)]
pub enum OrgChartError {
	/// The team list is not valid JSON for the expected shape.
	#[error("failed to parse org chart data: {0}")]
	Parse(#[from] serde_json::Error),
	/// The same team id appears more than once.
	#[error("duplicate team id `{0}`")]
	DuplicateTeam(String),
}
