//! Error types for gateways.

use thiserror::Error;

/// Errors that can occur when talking to a cluster.
///
/// Cancellation of a consumption is not an error; gateways return `Ok(())`
/// when their cancellation token fires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Could not reach the brokers or build a client.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// A metadata request (topics, groups, watermarks) failed.
    #[error("Metadata request failed: {0}")]
    Metadata(String),

    /// The consumer failed while streaming messages.
    #[error("Consume failed: {0}")]
    Consume(String),

    /// No context with this name is configured.
    #[error("Unknown context: {0}")]
    UnknownContext(String),

    /// The topic does not exist in the current context.
    #[error("Unknown topic: {0}")]
    UnknownTopic(String),

    /// Timeout waiting for the cluster.
    #[error("Request timed out")]
    Timeout,
}

#[cfg(feature = "kafka")]
impl From<rdkafka::error::KafkaError> for GatewayError {
    fn from(err: rdkafka::error::KafkaError) -> Self {
        use rdkafka::error::{KafkaError, RDKafkaErrorCode};

        match err {
            KafkaError::ClientCreation(e) => GatewayError::Connection(e),
            KafkaError::MetadataFetch(RDKafkaErrorCode::OperationTimedOut)
            | KafkaError::GroupListFetch(RDKafkaErrorCode::OperationTimedOut) => {
                GatewayError::Timeout
            }
            KafkaError::MetadataFetch(code) | KafkaError::GroupListFetch(code) => {
                GatewayError::Metadata(code.to_string())
            }
            other => GatewayError::Consume(other.to_string()),
        }
    }
}
