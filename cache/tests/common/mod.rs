use std::sync::Arc;

pub fn key(name: &str) -> Arc<String> {
  Arc::new(name.to_owned())
}
