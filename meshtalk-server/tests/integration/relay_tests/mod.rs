pub mod test_ice_candidate_passthrough;
pub mod test_session_description_passthrough;
pub mod test_update_user_data_self_only;
