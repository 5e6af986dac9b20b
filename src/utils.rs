use std::env::var;

/// Get the value of ENV var
///
/// Only when:
/// - It is set
/// - It is not empty
pub fn env_var(var_name: &'static str) -> Option<String> {
    var(var_name).ok().filter(|value| !value.is_empty())
}

/// Get the value of ENV var, or a default
pub fn env_var_or_else<F>(var_name: &'static str, or_else: F) -> String
where
    F: FnOnce() -> String,
{
    env_var(var_name).unwrap_or_else(or_else)
}
