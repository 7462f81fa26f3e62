pub mod test_duplicate_join_is_idempotent;
pub mod test_join_assigns_offerer_roles;
pub mod test_three_members_join;
