/// Defect type codes are positive integers.
pub type DefectCode = i32;

/// Identifier of the supervisor or operator acting on a board.
pub type ActorId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
