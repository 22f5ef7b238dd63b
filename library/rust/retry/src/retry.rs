use std::fmt;
use std::future::IntoFuture;
use std::task::{Context, Poll};

use futures::future::{self, BoxFuture};
use futures::task::noop_waker_ref;
use futures::FutureExt;

use crate::error::{AttemptsExhausted, RetryError};
use crate::outcome::{Directive, Outcome};

/// 成功時の値 (`None` は試行回数 0 またはエラーハンドラによる中断) か、リトライのエラー。
pub type RetryResult<T, E> = Result<Option<T>, RetryError<E>>;

type NoHandler<'a, E> = fn(&E, u32, u32) -> Outcome<'a, Directive, E>;

/// リトライシーケンスの実行結果。
///
/// 一度も待機が発生しなければ `Settled` として即座に結果を返す。
/// 操作またはエラーハンドラが未確定の値を返して待機が必要になった場合は、
/// 実行途中のタスクを `Suspended` として返す。`.await` するか `wait()` で完了させる。
#[must_use = "リトライシーケンスは待機しないと完了しない場合がある"]
pub enum Retrying<'a, T, E> {
    Settled(RetryResult<T, E>),
    Suspended(BoxFuture<'a, RetryResult<T, E>>),
}

impl<'a, T, E> Retrying<'a, T, E> {
    /// タスクを一度だけ進める。no-op waker で poll するため、
    /// `Suspended` を受け取った側が次に poll した時点で本来の waker が登録される。
    fn start(mut task: BoxFuture<'a, RetryResult<T, E>>) -> Self {
        let mut cx = Context::from_waker(noop_waker_ref());
        match task.poll_unpin(&mut cx) {
            Poll::Ready(result) => Self::Settled(result),
            Poll::Pending => {
                tracing::debug!("リトライシーケンスが未確定の値を待機しています");
                Self::Suspended(task)
            }
        }
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self, Self::Suspended(_))
    }

    /// 待機なしで完了していれば結果を返し、そうでなければ自身をそのまま返す。
    pub fn into_settled(self) -> Result<RetryResult<T, E>, Self> {
        match self {
            Self::Settled(result) => Ok(result),
            suspended @ Self::Suspended(_) => Err(suspended),
        }
    }

    /// 同期コンテキストから結果を取得する。待機中のタスクは現在のスレッドで完了させる。
    /// 非同期ランタイムのワーカースレッド上では `.await` を使うこと。
    pub fn wait(self) -> RetryResult<T, E> {
        match self {
            Self::Settled(result) => result,
            Self::Suspended(task) => futures::executor::block_on(task),
        }
    }
}

impl<'a, T, E> IntoFuture for Retrying<'a, T, E>
where
    T: Send + 'a,
    E: Send + 'a,
{
    type Output = RetryResult<T, E>;
    type IntoFuture = BoxFuture<'a, RetryResult<T, E>>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Self::Settled(result) => future::ready(result).boxed(),
            Self::Suspended(task) => task,
        }
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for Retrying<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Settled(result) => f.debug_tuple("Settled").field(result).finish(),
            Self::Suspended(_) => f.write_str("Suspended(..)"),
        }
    }
}

/// 操作を最大 `budget` 回試行する。
///
/// `budget` が 0 の場合は操作を実行せず `Ok(None)` を返す。
/// すべての試行が失敗した場合は `RetryError::Exhausted` を返す。
pub fn attempt<'a, T, E, Op>(budget: u32, operation: Op) -> Retrying<'a, T, E>
where
    T: Send + 'a,
    E: fmt::Display + Send + 'a,
    Op: FnMut() -> Outcome<'a, T, E> + Send + 'a,
{
    Retrying::start(drive(budget, operation, None::<NoHandler<'a, E>>).boxed())
}

/// `attempt` と同様だが、最後の試行以外の失敗のたびに `on_error` を呼び出す。
///
/// `on_error` には失敗したエラー、これまでの試行回数 (1 始まり)、`budget` が渡される。
/// `Directive::Abort` を返すとリトライを打ち切って `Ok(None)` を返す。
/// `on_error` 自身のエラーはリトライせず `RetryError::Callback` としてそのまま返す。
pub fn attempt_with<'a, T, E, Op, Cb>(budget: u32, operation: Op, on_error: Cb) -> Retrying<'a, T, E>
where
    T: Send + 'a,
    E: fmt::Display + Send + 'a,
    Op: FnMut() -> Outcome<'a, T, E> + Send + 'a,
    Cb: FnMut(&E, u32, u32) -> Outcome<'a, Directive, E> + Send + 'a,
{
    Retrying::start(drive(budget, operation, Some(on_error)).boxed())
}

async fn drive<'a, T, E, Op, Cb>(
    budget: u32,
    mut operation: Op,
    mut on_error: Option<Cb>,
) -> RetryResult<T, E>
where
    E: fmt::Display,
    Op: FnMut() -> Outcome<'a, T, E>,
    Cb: FnMut(&E, u32, u32) -> Outcome<'a, Directive, E>,
{
    if budget == 0 {
        tracing::debug!("試行回数が 0 のため操作を実行しません");
        return Ok(None);
    }

    tracing::debug!(budget, "リトライシーケンスを開始します");
    let mut attempts = 0;
    loop {
        let outcome = operation();
        let result = match outcome {
            Outcome::Ready(result) => result,
            Outcome::Pending(pending) => pending.await,
            Outcome::Lazy(_) => return Err(RetryError::UnsupportedResult),
        };

        let failure = match result {
            Ok(value) => return Ok(Some(value)),
            Err(e) => e,
        };

        attempts += 1;
        tracing::warn!(
            "リトライ試行 {}/{}: {}",
            attempts,
            budget,
            failure
        );

        if attempts == budget {
            tracing::error!(attempts, "すべてのリトライが失敗しました");
            return Err(AttemptsExhausted::new(attempts, failure).into());
        }

        if let Some(handler) = on_error.as_mut() {
            let reply = handler(&failure, attempts, budget);
            let directive = match reply {
                Outcome::Ready(directive) => directive,
                Outcome::Pending(pending) => pending.await,
                // 中断の判定は Directive::Abort のみ
                Outcome::Lazy(_) => Ok(Directive::Retry),
            }
            .map_err(RetryError::Callback)?;

            if directive == Directive::Abort {
                tracing::info!(attempts, budget, "エラーハンドラがリトライを中断しました");
                return Ok(None);
            }
        }
    }
}
