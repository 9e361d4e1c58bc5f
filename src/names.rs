pub const OTP_LENGTH: usize = 6;
pub const PARENT_ROLE: &str = "parent";

pub const LOCK_REASON_PAYMENT: &str = "Payment required to unlock this chapter";
pub const LOCK_REASON_PREVIOUS_CHAPTER: &str = "Complete previous chapter to unlock";

pub const PAYMENT_STATUS_SUCCESS: &str = "success";

// Fallback transaction id prefix when the gateway id is missing.
pub const PLACEHOLDER_TRANSACTION_PREFIX: &str = "TEMP_";

pub const DEFAULT_QUESTION_MARKS: i64 = 1;
pub const MIN_QUESTION_OPTIONS: usize = 2;

pub const MSG_NO_TOKEN: &str = "No token provided. You have to log in to continue";
pub const MSG_INVALID_TOKEN: &str = "Invalid or expired token. Please log in again.";
