//! retry-engine: 同期・非同期のどちらの操作も同じ試行ループで扱うリトライライブラリ。
//!
//! 操作を最大試行回数まで繰り返し、試行の合間にエラーハンドラを呼び出す。
//! エラーハンドラは `Directive::Abort` を返してリトライを打ち切ることができる。
//! 操作やエラーハンドラが未確定の値 (`Outcome::Pending`) を返した場合のみ待機が発生し、
//! それ以外は呼び出し元のスレッド上で即座に完了する。
//!
//! 待機が発生したタスクはスレッドをまたいで実行できるよう、操作・エラーハンドラ・
//! 成功値・エラーのすべてに `Send` を要求する。同期的にしか使わない場合でも同じ制約がかかるため、
//! `Rc<RefCell<_>>` を捕捉するクロージャは渡せない。`Arc<Mutex<_>>` などを使うこと。
//!
//! ```compile_fail
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use retry_engine::{attempt, Outcome};
//!
//! let calls = Rc::new(RefCell::new(0));
//! let counter = calls.clone();
//! let _ = attempt(1, move || {
//!     *counter.borrow_mut() += 1;
//!     Outcome::<u32, String>::ok(1)
//! });
//! ```
//!
//! ```
//! use retry_engine::{attempt_with, Outcome};
//!
//! let mut calls = 0;
//! let result = attempt_with(
//!     3,
//!     || {
//!         calls += 1;
//!         if calls < 3 {
//!             Outcome::err("not yet".to_string())
//!         } else {
//!             Outcome::ok("ok")
//!         }
//!     },
//!     |_, _, _| Outcome::retry(),
//! )
//! .wait();
//!
//! assert_eq!(result.unwrap(), Some("ok"));
//! ```

pub mod adapter;
pub mod error;
pub mod outcome;
pub mod policy;
pub mod retry;

pub use adapter::{attempt_async, attempt_async_with};
pub use error::{AttemptsExhausted, RetryError};
pub use outcome::{Directive, Outcome};
pub use policy::RetryConfig;
pub use retry::{attempt, attempt_with, RetryResult, Retrying};
