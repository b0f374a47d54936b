/// CSV and JSON export of finished runs.
pub mod export;
