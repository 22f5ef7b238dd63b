use std::fmt;

use futures::future::BoxFuture;
use serde::{Deserialize, Deserializer, Serialize};

use crate::adapter::{attempt_async, attempt_async_with};
use crate::outcome::{Directive, Outcome};
use crate::retry::{attempt, attempt_with, Retrying};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// 0 以下の値は 0 として扱い、操作を一度も実行しない。
    #[serde(deserialize_with = "non_negative_attempts")]
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// YAML 文字列から設定を読み込む。省略したキーはデフォルト値になる。
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn attempt<'a, T, E, Op>(&self, operation: Op) -> Retrying<'a, T, E>
    where
        T: Send + 'a,
        E: fmt::Display + Send + 'a,
        Op: FnMut() -> Outcome<'a, T, E> + Send + 'a,
    {
        attempt(self.max_attempts, operation)
    }

    pub fn attempt_with<'a, T, E, Op, Cb>(&self, operation: Op, on_error: Cb) -> Retrying<'a, T, E>
    where
        T: Send + 'a,
        E: fmt::Display + Send + 'a,
        Op: FnMut() -> Outcome<'a, T, E> + Send + 'a,
        Cb: FnMut(&E, u32, u32) -> Outcome<'a, Directive, E> + Send + 'a,
    {
        attempt_with(self.max_attempts, operation, on_error)
    }

    pub fn attempt_async<'a, T, E, Op>(
        &self,
        operation: Op,
    ) -> BoxFuture<'a, crate::retry::RetryResult<T, E>>
    where
        T: Send + 'a,
        E: fmt::Display + Send + 'a,
        Op: FnMut() -> Outcome<'a, T, E> + Send + 'a,
    {
        attempt_async(self.max_attempts, operation)
    }

    pub fn attempt_async_with<'a, T, E, Op, Cb>(
        &self,
        operation: Op,
        on_error: Cb,
    ) -> BoxFuture<'a, crate::retry::RetryResult<T, E>>
    where
        T: Send + 'a,
        E: fmt::Display + Send + 'a,
        Op: FnMut() -> Outcome<'a, T, E> + Send + 'a,
        Cb: FnMut(&E, u32, u32) -> Outcome<'a, Directive, E> + Send + 'a,
    {
        attempt_async_with(self.max_attempts, operation, on_error)
    }
}

fn non_negative_attempts<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    if raw <= 0 {
        return Ok(0);
    }
    u32::try_from(raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        assert_eq!(RetryConfig::default().max_attempts, 3);
        assert_eq!(RetryConfig::new(5).max_attempts, 5);
        assert_eq!(RetryConfig::new(5).with_max_attempts(1).max_attempts, 1);
    }

    #[test]
    fn test_from_yaml() {
        let config = RetryConfig::from_yaml("max_attempts: 7").unwrap();
        assert_eq!(config, RetryConfig::new(7));
    }

    #[test]
    fn test_from_yaml_missing_key_uses_default() {
        let config = RetryConfig::from_yaml("{}").unwrap();
        assert_eq!(config, RetryConfig::default());
    }

    #[test]
    fn test_from_yaml_negative_budget_clamps_to_zero() {
        let config = RetryConfig::from_yaml("max_attempts: -2").unwrap();
        assert_eq!(config.max_attempts, 0);
    }

    #[test]
    fn test_from_yaml_rejects_out_of_range_budget() {
        assert!(RetryConfig::from_yaml("max_attempts: 99999999999").is_err());
    }

    #[test]
    fn test_config_runs_with_its_budget() {
        let mut invocations = 0;
        let result = RetryConfig::new(2)
            .attempt(|| {
                invocations += 1;
                Outcome::<u32, String>::err("fail".to_string())
            })
            .wait();

        assert_eq!(result.unwrap_err().attempts(), Some(2));
        assert_eq!(invocations, 2);
    }
}
