mod test_disconnect_notifies_peer;
