pub mod candidate;
pub mod job;
pub mod match_row;

pub use candidate::CandidateRow;
pub use job::JobRow;
pub use match_row::MatchRow;
