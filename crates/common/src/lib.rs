//! Shared helpers used by every crate in the workspace: logging setup,
//! pagination arithmetic and small response types.

pub mod types;
pub mod utils;
pub mod pagination;
pub mod env;

pub use pagination::Pagination;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }
}
