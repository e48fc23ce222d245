//! Random 5-digit identifiers for catalogue entries and accounts.
//!
//! An id is claimed by inserting the record with it: the primary key rejects
//! a taken id and the insert is retried with a fresh draw. There is no separate
//! existence check, so concurrent allocations cannot both claim the same id.

use std::fmt;
use std::future::Future;
use std::ops::RangeInclusive;

use rand::Rng;
use tracing::debug;

use crate::db::is_unique_violation;

pub const ID_RANGE: RangeInclusive<i64> = 10_000..=99_999;

/// Target collection of an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Catalogue,
    Accounts,
}

impl Collection {
    pub fn table(self) -> &'static str {
        match self {
            Collection::Catalogue => "catalogo",
            Collection::Accounts => "usuarios",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Source of candidate identifiers.
pub trait IdSource: fmt::Debug + Send + Sync {
    /// Next candidate, always within [`ID_RANGE`].
    fn draw(&self) -> i64;
}

/// Uniform draws from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn draw(&self) -> i64 {
        rand::thread_rng().gen_range(ID_RANGE)
    }
}

/// Insert a record under a freshly drawn id, redrawing for as long as the
/// storage layer reports the id as taken. Returns the id that was written.
///
/// `insert` receives the candidate id and must perform the whole insert in a
/// single statement. Errors other than a uniqueness violation end the loop.
pub async fn insert_with_fresh_id<F, Fut, T>(
    ids: &dyn IdSource,
    collection: Collection,
    mut insert: F,
) -> Result<i64, sqlx::Error>
where
    F: FnMut(i64) -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut attempts: u64 = 0;
    loop {
        let id = ids.draw();
        attempts += 1;
        match insert(id).await {
            Ok(_) => {
                debug!(%collection, id, attempts, "identifier allocated");
                return Ok(id);
            }
            Err(error) if is_unique_violation(&error) => {
                debug!(%collection, id, attempts, "identifier taken; drawing again");
            }
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::{IdSource, RandomIds};

    /// Replays a fixed sequence of draws, then falls back to random ones.
    #[derive(Debug, Default)]
    pub struct ScriptedIds {
        queue: Mutex<VecDeque<i64>>,
    }

    impl ScriptedIds {
        pub fn new(draws: impl IntoIterator<Item = i64>) -> Self {
            Self {
                queue: Mutex::new(draws.into_iter().collect()),
            }
        }
    }

    impl IdSource for ScriptedIds {
        fn draw(&self) -> i64 {
            let next = self
                .queue
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .pop_front();
            next.unwrap_or_else(|| RandomIds.draw())
        }
    }
}
