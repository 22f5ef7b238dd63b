//! 常に `BoxFuture` を返すリトライ API。
//!
//! 非同期の合成を前提とする呼び出し側が、待機が実際に発生したかどうかで
//! 分岐しなくて済むようにする。

use std::fmt;
use std::future::IntoFuture;

use futures::future::BoxFuture;

use crate::outcome::{Directive, Outcome};
use crate::retry::{attempt, attempt_with, RetryResult};

/// `attempt` の結果を常に `BoxFuture` として返す。
///
/// 最初の試行は返り値を `.await` した時点ではなく、この関数を呼び出した時点で実行される。
/// そのため `tokio::time::sleep` などランタイムを必要とする値を返す操作は、
/// ランタイムの内側から呼び出すこと。
pub fn attempt_async<'a, T, E, Op>(budget: u32, operation: Op) -> BoxFuture<'a, RetryResult<T, E>>
where
    T: Send + 'a,
    E: fmt::Display + Send + 'a,
    Op: FnMut() -> Outcome<'a, T, E> + Send + 'a,
{
    attempt(budget, operation).into_future()
}

/// `attempt_with` の結果を常に `BoxFuture` として返す。
///
/// `attempt_async` と同じく、最初の試行 (と必要ならエラーハンドラ) は呼び出し時点で実行される。
pub fn attempt_async_with<'a, T, E, Op, Cb>(
    budget: u32,
    operation: Op,
    on_error: Cb,
) -> BoxFuture<'a, RetryResult<T, E>>
where
    T: Send + 'a,
    E: fmt::Display + Send + 'a,
    Op: FnMut() -> Outcome<'a, T, E> + Send + 'a,
    Cb: FnMut(&E, u32, u32) -> Outcome<'a, Directive, E> + Send + 'a,
{
    attempt_with(budget, operation, on_error).into_future()
}
