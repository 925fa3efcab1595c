
mod test_bucket_state;
