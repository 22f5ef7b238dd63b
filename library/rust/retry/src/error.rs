use std::fmt;

use thiserror::Error;

/// 試行回数を使い切ったときに一度だけ生成される終端エラー。
///
/// 試行回数と、最後の試行で操作が返したエラー (直接の原因) を保持する。
/// メッセージは試行回数のみから組み立てる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptsExhausted<E> {
    attempts: u32,
    cause: E,
}

impl<E> AttemptsExhausted<E> {
    pub fn new(attempts: u32, cause: E) -> Self {
        Self { attempts, cause }
    }

    /// 諦めるまでに操作を試行した回数。
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// 最後の試行で発生したエラー。
    pub fn cause(&self) -> &E {
        &self.cause
    }

    pub fn into_cause(self) -> E {
        self.cause
    }
}

impl<E> fmt::Display for AttemptsExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} 回の試行後も操作が失敗しました", self.attempts)
    }
}

impl<E> std::error::Error for AttemptsExhausted<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

/// リトライシーケンスが返すエラー。
///
/// `E` に `std::error::Error` を要求しないため、`Exhausted` の原因は
/// `source()` からは辿れない。最後の試行のエラーは `cause()` かパターンマッチで取得する。
#[derive(Debug, Error)]
pub enum RetryError<E> {
    #[error("{0}")]
    Exhausted(AttemptsExhausted<E>),
    /// エラーハンドラ自身が返したエラー。ラップせずそのまま保持する。
    #[error("エラーハンドラが失敗しました: {0}")]
    Callback(E),
    #[error("遅延シーケンス (Stream) はリトライできません")]
    UnsupportedResult,
}

impl<E> RetryError<E> {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted(_))
    }

    /// 試行回数を使い切った場合のみ、その回数を返す。
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::Exhausted(exhausted) => Some(exhausted.attempts()),
            _ => None,
        }
    }

    /// `Exhausted` なら最後の試行のエラー、`Callback` ならエラーハンドラのエラーを返す。
    pub fn cause(&self) -> Option<&E> {
        match self {
            Self::Exhausted(exhausted) => Some(exhausted.cause()),
            Self::Callback(error) => Some(error),
            Self::UnsupportedResult => None,
        }
    }
}

impl<E> From<AttemptsExhausted<E>> for RetryError<E> {
    fn from(exhausted: AttemptsExhausted<E>) -> Self {
        Self::Exhausted(exhausted)
    }
}
