use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{FutureExt, Stream, StreamExt};

/// 操作またはエラーハンドラが 1 回の呼び出しで返す値。
///
/// 同期的な結果 (`Ready`) と、後で確定する結果 (`Pending`) のどちらも返せる。
/// `Lazy` は遅延シーケンスで、操作の成功結果として返された場合は
/// 再実行のたびに未消費のシーケンスが捨てられるためリトライできない。
pub enum Outcome<'a, T, E> {
    Ready(Result<T, E>),
    Pending(BoxFuture<'a, Result<T, E>>),
    Lazy(BoxStream<'a, T>),
}

impl<'a, T, E> Outcome<'a, T, E> {
    pub fn ok(value: T) -> Self {
        Self::Ready(Ok(value))
    }

    pub fn err(error: E) -> Self {
        Self::Ready(Err(error))
    }

    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'a,
    {
        Self::Pending(future.boxed())
    }

    pub fn lazy<S>(stream: S) -> Self
    where
        S: Stream<Item = T> + Send + 'a,
    {
        Self::Lazy(stream.boxed())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

impl<T, E> From<Result<T, E>> for Outcome<'_, T, E> {
    fn from(result: Result<T, E>) -> Self {
        Self::Ready(result)
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for Outcome<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// エラーハンドラの判定。`Abort` のときだけリトライを打ち切る。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Directive {
    #[default]
    Retry,
    Abort,
}

/// `false` のみが中断を意味する。
impl From<bool> for Directive {
    fn from(proceed: bool) -> Self {
        if proceed {
            Self::Retry
        } else {
            Self::Abort
        }
    }
}

impl From<()> for Directive {
    fn from((): ()) -> Self {
        Self::Retry
    }
}

impl<E> Outcome<'_, Directive, E> {
    pub fn retry() -> Self {
        Self::Ready(Ok(Directive::Retry))
    }

    pub fn abort() -> Self {
        Self::Ready(Ok(Directive::Abort))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_false_converts_to_abort() {
        assert_eq!(Directive::from(false), Directive::Abort);
        assert_eq!(Directive::from(true), Directive::Retry);
        assert_eq!(Directive::from(()), Directive::Retry);
        assert_eq!(Directive::default(), Directive::Retry);
    }

    #[test]
    fn test_outcome_constructors() {
        let ready: Outcome<'_, u32, String> = Outcome::ok(5);
        assert!(matches!(ready, Outcome::Ready(Ok(5))));

        let failed: Outcome<'_, u32, String> = Outcome::err("e".to_string());
        assert!(matches!(failed, Outcome::Ready(Err(ref e)) if e == "e"));

        let pending: Outcome<'_, u32, String> = Outcome::pending(async { Ok(1) });
        assert!(pending.is_pending());
        assert_eq!(format!("{pending:?}"), "Pending(..)");

        let lazy: Outcome<'_, u32, String> = Outcome::lazy(futures::stream::iter(vec![1, 2]));
        assert!(!lazy.is_pending());
        assert_eq!(format!("{lazy:?}"), "Lazy(..)");
    }
}
