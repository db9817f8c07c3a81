/// Connection setup and migrated schema
pub mod db_tests;

/// Entity helpers and cascading deletes
pub mod crud_tests;

/// Rollback behavior
pub mod transaction_tests;
