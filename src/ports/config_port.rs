//! Configuration access port trait.
//!
//! Lookups are by `[section] key`. Numeric getters fall back to `default`
//! when the key is absent or does not parse; validation catches the latter
//! before anything reads the config for real.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
}
