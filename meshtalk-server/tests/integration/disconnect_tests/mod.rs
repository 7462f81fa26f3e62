pub mod test_disconnect_notifies_both_sides;
pub mod test_empty_channel_is_deleted;
