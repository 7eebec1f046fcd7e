//! Workspace-level policy invariant tests. See `policy_consistency.rs`.
