use std::env;

#[derive(Clone, Debug)]
pub struct SecurityConfig {
    /// bcrypt work factor. 10 matches the usual production default; tests use
    /// a lower cost to stay fast.
    pub bcrypt_cost: u32,
}

impl SecurityConfig {
    pub fn from_env() -> Self {
        Self {
            bcrypt_cost: env::var("BCRYPT_COST")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self { bcrypt_cost: 10 }
    }
}
