//! Local request validation

use validator::Validate;

use crate::error::ApiContractResult;

/// Validate a request before it leaves the process.
///
/// Requests that fail here never reach the network.
pub fn validate_request<T: Validate>(request: &T) -> ApiContractResult<()> {
    request.validate()?;
    Ok(())
}
