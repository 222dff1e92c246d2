//! Exit code constants for the depot CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, malformed request or config)
//! - 2: Validation failure (request names descriptors the catalog lacks)
//! - 3: Catalog failure (catalog missing or malformed)
//! - 4: Action failure (fetch/remove or playbook run failed)
//! - 5: Task store failure

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, malformed request, or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// Validation failure: the request references tools the catalog does not carry.
pub const VALIDATION_FAILURE: i32 = 2;

/// Catalog failure: the catalog document could not be read or parsed.
pub const CATALOG_FAILURE: i32 = 3;

/// Action failure: a transfer, deletion, or playbook run failed.
pub const ACTION_FAILURE: i32 = 4;

/// Store failure: a task record could not be written, read, or evicted.
pub const STORE_FAILURE: i32 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            SUCCESS,
            USER_ERROR,
            VALIDATION_FAILURE,
            CATALOG_FAILURE,
            ACTION_FAILURE,
            STORE_FAILURE,
        ];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }
}
