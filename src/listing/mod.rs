//! Query-keyed listing cache for a single paginated resource.
//!
//! A `Listing<R>` owns the current query, the last fetched page, loading and
//! error state, and an optional TTL cache of pages keyed by canonical query.
//! Fetching goes through an injected fetcher so the listing never knows the
//! transport.
//!
//! Only the most recently started fetch may commit. Starting a fetch aborts
//! the previous task and bumps a generation token; an outcome carrying an
//! older token is dropped on arrival.
//!
//! # Example
//!
//! ```ignore
//! let api = api_client.clone();
//! let mut listing = Listing::new(api.fetcher::<Product>(), ListingOptions::default());
//!
//! // In event loop tick
//! if listing.poll() {
//!     // State changed, trigger re-render
//! }
//!
//! listing.set_query(ListQuery::new().with("page", 1))?;
//! ```

mod cache;
mod page;
mod query;

pub use page::Page;
pub use query::{ListQuery, QueryValue};

use cache::ListingCache;
use color_eyre::{eyre::eyre, Report, Result};
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A factory producing one fetch per query
type FetcherFn<R> = Box<dyn Fn(ListQuery) -> BoxFuture<'static, Result<Page<R>>> + Send + Sync>;

/// Coarse state of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStatus {
  /// Nothing requested yet
  Idle,
  /// A fetch is in flight
  Loading,
  /// Last fetch succeeded
  Success,
  /// Last fetch failed; data keeps the previous page, if any
  Failed,
}

/// Outcome of a local mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Mutation {
  /// The page (and its cache entry, if any) changed
  Applied,
  /// Nothing to do: no data yet, or nothing matched
  Unchanged,
  /// A fetch is in flight; its result would overwrite the edit, so nothing changed
  Busy,
}

/// Construction options for a listing.
#[derive(Debug, Clone)]
pub struct ListingOptions {
  pub initial_query: ListQuery,
  pub enable_cache: bool,
  pub cache_ttl: Duration,
  /// Query fields accepted by `set_query` besides the paging fields.
  /// `None` accepts anything.
  pub allowed_fields: Option<&'static [&'static str]>,
}

impl Default for ListingOptions {
  fn default() -> Self {
    Self {
      initial_query: ListQuery::new().with("page", 0).with("limit", 10),
      enable_cache: false,
      cache_ttl: Duration::from_secs(5 * 60),
      allowed_fields: None,
    }
  }
}

impl ListingOptions {
  pub fn with_initial_query(mut self, query: ListQuery) -> Self {
    self.initial_query = query;
    self
  }

  pub fn with_cache(mut self, enabled: bool) -> Self {
    self.enable_cache = enabled;
    self
  }

  pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
    self.cache_ttl = ttl;
    self
  }

  pub fn with_allowed_fields(mut self, fields: &'static [&'static str]) -> Self {
    self.allowed_fields = Some(fields);
    self
  }
}

/// Identifies one fetch; only the token matching the listing's current
/// generation may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FetchToken(u64);

struct InFlight<R> {
  token: FetchToken,
  key: String,
  receiver: oneshot::Receiver<Result<Page<R>>>,
  task: JoinHandle<()>,
}

/// Paginated listing with query-keyed caching and stale-response suppression.
pub struct Listing<R> {
  fetcher: FetcherFn<R>,
  query: ListQuery,
  data: Option<Page<R>>,
  error: Option<Report>,
  loading: bool,
  cache: Option<ListingCache<R>>,
  allowed_fields: Option<&'static [&'static str]>,
  generation: u64,
  in_flight: Option<InFlight<R>>,
}

impl<R: Clone + Send + 'static> Listing<R> {
  /// Create a listing and start fetching its initial query.
  ///
  /// Must be called from within a tokio runtime.
  pub fn new<F, Fut>(fetcher: F, options: ListingOptions) -> Self
  where
    F: Fn(ListQuery) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Page<R>>> + Send + 'static,
  {
    let mut listing = Self {
      fetcher: Box::new(move |query| fetcher(query).boxed()),
      query: options.initial_query,
      data: None,
      error: None,
      loading: false,
      cache: options
        .enable_cache
        .then(|| ListingCache::new(options.cache_ttl)),
      allowed_fields: options.allowed_fields,
      generation: 0,
      in_flight: None,
    };
    listing.start_fetch(false);
    listing
  }

  pub fn data(&self) -> Option<&Page<R>> {
    self.data.as_ref()
  }

  /// Items of the current page, empty before the first success.
  pub fn content(&self) -> &[R] {
    self.data.as_ref().map(|p| p.content.as_slice()).unwrap_or(&[])
  }

  pub fn is_loading(&self) -> bool {
    self.loading
  }

  pub fn error(&self) -> Option<&Report> {
    self.error.as_ref()
  }

  pub fn query(&self) -> &ListQuery {
    &self.query
  }

  pub fn status(&self) -> ListingStatus {
    if self.loading {
      ListingStatus::Loading
    } else if self.error.is_some() {
      ListingStatus::Failed
    } else if self.data.is_some() {
      ListingStatus::Success
    } else {
      ListingStatus::Idle
    }
  }

  /// Merge `partial` into the current query and fetch if it changed.
  ///
  /// Fields outside the allow-list are rejected and nothing changes.
  pub fn set_query(&mut self, partial: ListQuery) -> Result<()> {
    if let Some(allowed) = self.allowed_fields {
      partial.validate(allowed)?;
    }

    let mut next = self.query.clone();
    next.merge(partial);
    if next == self.query {
      return Ok(());
    }

    self.query = next;
    self.start_fetch(false);
    Ok(())
  }

  /// Fetch the current query again, skipping the cache lookup.
  ///
  /// The result is observed through `poll()` or awaited with `settled()`.
  pub fn refetch(&mut self) {
    self.start_fetch(true);
  }

  /// Commit the outcome of the active fetch if it has arrived.
  ///
  /// Returns `true` if the state changed. Call this in the event loop tick.
  pub fn poll(&mut self) -> bool {
    let Some(in_flight) = self.in_flight.as_mut() else {
      return false;
    };

    let outcome = match in_flight.receiver.try_recv() {
      Ok(outcome) => outcome,
      Err(oneshot::error::TryRecvError::Empty) => return false,
      Err(oneshot::error::TryRecvError::Closed) => Err(eyre!("Fetch ended without a result")),
    };

    match self.in_flight.take() {
      Some(in_flight) => self.commit(in_flight.token, in_flight.key, outcome),
      None => false,
    }
  }

  /// Wait for the active fetch, if any, and return the resulting page.
  ///
  /// Returns `None` when the last fetch failed or nothing was ever fetched.
  pub async fn settled(&mut self) -> Option<&Page<R>> {
    if let Some(in_flight) = self.in_flight.as_mut() {
      let outcome = (&mut in_flight.receiver)
        .await
        .unwrap_or_else(|_| Err(eyre!("Fetch ended without a result")));

      if let Some(in_flight) = self.in_flight.take() {
        self.commit(in_flight.token, in_flight.key, outcome);
      }
    }

    if self.error.is_some() {
      None
    } else {
      self.data.as_ref()
    }
  }

  /// Append items to the current page.
  pub fn append(&mut self, items: impl IntoIterator<Item = R>) -> Mutation {
    let items: Vec<R> = items.into_iter().collect();
    self.mutate(|page| page.push_items(items))
  }

  /// Remove the first item matching `predicate` from the current page.
  pub fn remove(&mut self, predicate: impl FnMut(&R) -> bool) -> Mutation {
    self.mutate(|page| page.remove_first(predicate))
  }

  /// Replace every item matching `predicate` with `updater(item)`.
  pub fn update(
    &mut self,
    predicate: impl FnMut(&R) -> bool,
    updater: impl FnMut(&R) -> R,
  ) -> Mutation {
    self.mutate(|page| page.update_matching(predicate, updater))
  }

  pub fn clear_cache(&mut self) {
    if let Some(cache) = self.cache.as_mut() {
      cache.clear();
    }
  }

  /// Drop the cached page for `query`, or for the current query.
  pub fn clear_cache_for_query(&mut self, query: Option<&ListQuery>) {
    let key = query.unwrap_or(&self.query).cache_key();
    if let Some(cache) = self.cache.as_mut() {
      cache.remove(&key);
    }
  }

  fn mutate(&mut self, op: impl FnOnce(&mut Page<R>) -> bool) -> Mutation {
    // An outcome may be waiting unobserved; commit it before deciding.
    self.poll();
    if self.in_flight.is_some() {
      return Mutation::Busy;
    }

    let Some(page) = self.data.as_mut() else {
      return Mutation::Unchanged;
    };
    if !op(page) {
      return Mutation::Unchanged;
    }

    if let Some(cache) = self.cache.as_mut() {
      cache.write_through(&self.query.cache_key(), page);
    }
    Mutation::Applied
  }

  fn start_fetch(&mut self, force: bool) {
    self.cancel_in_flight();
    self.generation += 1;
    let token = FetchToken(self.generation);

    self.loading = true;
    self.error = None;

    let key = self.query.cache_key();
    if !force {
      if let Some(page) = self.cache.as_mut().and_then(|cache| cache.lookup(&key)) {
        debug!(key = %key, "listing cache hit");
        self.data = Some(page.clone());
        self.loading = false;
        return;
      }
    }

    debug!(key = %key, generation = token.0, force, "starting listing fetch");
    let (tx, rx) = oneshot::channel();
    let future = (self.fetcher)(self.query.clone());
    let task = tokio::spawn(async move {
      // Ignore send errors - the listing may have moved on
      let _ = tx.send(future.await);
    });

    self.in_flight = Some(InFlight {
      token,
      key,
      receiver: rx,
      task,
    });
  }

  fn commit(&mut self, token: FetchToken, key: String, outcome: Result<Page<R>>) -> bool {
    if token != FetchToken(self.generation) {
      debug!(generation = token.0, "discarding stale listing response");
      return false;
    }

    match outcome {
      Ok(page) => {
        if let Some(cache) = self.cache.as_mut() {
          cache.store(key, page.clone());
        }
        self.data = Some(page);
      }
      Err(e) => {
        warn!(error = %e, "listing fetch failed");
        self.error = Some(e);
      }
    }
    self.loading = false;
    true
  }
}

impl<R> Listing<R> {
  fn cancel_in_flight(&mut self) {
    if let Some(in_flight) = self.in_flight.take() {
      debug!(generation = in_flight.token.0, "cancelling superseded fetch");
      in_flight.task.abort();
    }
  }
}

impl<R> Drop for Listing<R> {
  fn drop(&mut self) {
    self.cancel_in_flight();
  }
}

impl<R: std::fmt::Debug> std::fmt::Debug for Listing<R> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Listing")
      .field("query", &self.query)
      .field("data", &self.data)
      .field("error", &self.error)
      .field("loading", &self.loading)
      .field("generation", &self.generation)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::{Arc, Mutex};

  type TestFetcher = Box<dyn Fn(ListQuery) -> BoxFuture<'static, Result<Page<u32>>> + Send + Sync>;

  /// Page `n` holds the single item `n`; 5 items overall, 2 per page.
  fn numbered_page(query: &ListQuery) -> Page<u32> {
    let page = query.page().unwrap_or(0) as u64;
    Page::new(vec![page as u32], page, 2, 5)
  }

  fn counting_fetcher(calls: Arc<AtomicUsize>) -> TestFetcher {
    Box::new(move |query: ListQuery| {
      calls.fetch_add(1, Ordering::SeqCst);
      async move { Ok::<_, Report>(numbered_page(&query)) }.boxed()
    })
  }

  /// Page 0 takes `first` to resolve, every other page takes `rest`.
  fn delayed_fetcher(first: u64, rest: u64) -> TestFetcher {
    Box::new(move |query: ListQuery| {
      let delay = if query.page() == Some(0) { first } else { rest };
      async move {
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok::<_, Report>(numbered_page(&query))
      }
      .boxed()
    })
  }

  fn cached() -> ListingOptions {
    ListingOptions::default().with_cache(true)
  }

  fn page_query(page: i64) -> ListQuery {
    ListQuery::new().with("page", page)
  }

  #[tokio::test]
  async fn test_mount_fetches_initial_query() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut listing = Listing::new(counting_fetcher(calls.clone()), ListingOptions::default());

    assert!(listing.is_loading());
    assert_eq!(listing.status(), ListingStatus::Loading);

    let page = listing.settled().await.cloned();
    assert_eq!(page.map(|p| p.content), Some(vec![0]));
    assert_eq!(listing.status(), ListingStatus::Success);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_poll_commits_when_ready() {
    let mut listing = Listing::new(
      counting_fetcher(Arc::new(AtomicUsize::new(0))),
      ListingOptions::default(),
    );

    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(listing.poll());
    assert!(!listing.is_loading());
    assert_eq!(listing.content(), &[0]);
    assert!(!listing.poll());
  }

  #[tokio::test]
  async fn test_cache_hit_skips_fetcher() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut listing = Listing::new(counting_fetcher(calls.clone()), cached());
    listing.settled().await;

    listing.set_query(page_query(1)).unwrap();
    listing.settled().await;

    listing.set_query(page_query(0)).unwrap();
    assert!(!listing.is_loading());
    assert_eq!(listing.content(), &[0]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_refetch_bypasses_cache() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut listing = Listing::new(counting_fetcher(calls.clone()), cached());
    listing.settled().await;

    listing.refetch();
    assert!(listing.is_loading());
    assert!(listing.settled().await.is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_cache_disabled_always_fetches() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut listing = Listing::new(counting_fetcher(calls.clone()), ListingOptions::default());
    listing.settled().await;

    listing.set_query(page_query(1)).unwrap();
    listing.settled().await;
    listing.set_query(page_query(0)).unwrap();
    assert!(listing.is_loading());
    listing.settled().await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
  }

  #[tokio::test(start_paused = true)]
  async fn test_cache_entry_expires() {
    let calls = Arc::new(AtomicUsize::new(0));
    let options = cached().with_cache_ttl(Duration::from_secs(1));
    let mut listing = Listing::new(counting_fetcher(calls.clone()), options);
    listing.settled().await;

    listing.set_query(page_query(1)).unwrap();
    listing.settled().await;

    tokio::time::advance(Duration::from_secs(2)).await;

    listing.set_query(page_query(0)).unwrap();
    assert!(listing.is_loading());
    listing.settled().await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    // The refreshed entry is fresh again
    listing.set_query(page_query(1)).unwrap();
    listing.settled().await;
    listing.set_query(page_query(0)).unwrap();
    assert!(!listing.is_loading());
    assert_eq!(calls.load(Ordering::SeqCst), 4);
  }

  #[tokio::test(start_paused = true)]
  async fn test_slow_stale_response_is_ignored() {
    let mut listing = Listing::new(delayed_fetcher(50, 10), ListingOptions::default());
    listing.set_query(page_query(1)).unwrap();

    let page = listing.settled().await.cloned();
    assert_eq!(page.map(|p| p.content), Some(vec![1]));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!listing.poll());
    assert_eq!(listing.content(), &[1]);
  }

  #[tokio::test(start_paused = true)]
  async fn test_fast_stale_response_is_ignored() {
    let mut listing = Listing::new(delayed_fetcher(10, 50), ListingOptions::default());
    listing.set_query(page_query(1)).unwrap();

    // Page 0 would have resolved by now
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!listing.poll());
    assert!(listing.data().is_none());
    assert!(listing.is_loading());

    let page = listing.settled().await.cloned();
    assert_eq!(page.map(|p| p.content), Some(vec![1]));
  }

  #[tokio::test]
  async fn test_commit_with_old_token_is_dropped() {
    let mut listing = Listing::new(
      counting_fetcher(Arc::new(AtomicUsize::new(0))),
      ListingOptions::default(),
    );
    listing.settled().await;
    let key = listing.query().cache_key();

    assert!(!listing.commit(FetchToken(0), key.clone(), Ok(Page::new(vec![99], 0, 2, 1))));
    assert!(!listing.commit(FetchToken(0), key, Err(eyre!("late failure"))));

    assert_eq!(listing.content(), &[0]);
    assert!(listing.error().is_none());
  }

  #[tokio::test]
  async fn test_failure_keeps_previous_data() {
    let fetcher = |query: ListQuery| async move {
      if query.page() == Some(1) {
        Err(eyre!("backend unavailable"))
      } else {
        Ok(numbered_page(&query))
      }
    };
    let mut listing = Listing::new(fetcher, ListingOptions::default());
    listing.settled().await;

    listing.set_query(page_query(1)).unwrap();
    assert!(listing.settled().await.is_none());
    assert_eq!(listing.status(), ListingStatus::Failed);
    assert_eq!(
      listing.error().map(|e| e.to_string()),
      Some("backend unavailable".to_string())
    );
    assert_eq!(listing.content(), &[0]);

    // Error clears as soon as the next fetch starts
    listing.set_query(page_query(0)).unwrap();
    assert!(listing.error().is_none());
    assert!(listing.is_loading());
  }

  #[tokio::test]
  async fn test_set_query_round_trip() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_by_fetcher = seen.clone();
    let fetcher = move |query: ListQuery| {
      seen_by_fetcher.lock().unwrap().push(query.clone());
      async move {
        let page = query.page().unwrap_or(0) as u64;
        let items = if page == 0 { vec!["a", "b"] } else { vec!["c", "d"] };
        Ok(Page::new(items, page, 2, 5))
      }
    };
    let options =
      ListingOptions::default().with_initial_query(ListQuery::new().with("page", 0).with("size", 2));

    let mut listing = Listing::new(fetcher, options);
    let first = listing.settled().await.cloned().unwrap();
    assert_eq!(first.total_pages, 3);

    listing.set_query(page_query(1)).unwrap();
    let second = listing.settled().await.cloned().unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1], ListQuery::new().with("page", 1).with("size", 2));
    assert_eq!(second.content, vec!["c", "d"]);
    assert_eq!(second.page, 1);
  }

  #[tokio::test]
  async fn test_unchanged_query_does_not_fetch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut listing = Listing::new(counting_fetcher(calls.clone()), ListingOptions::default());
    listing.settled().await;

    listing.set_query(ListQuery::new().with("limit", 10).with("page", 0)).unwrap();
    assert!(!listing.is_loading());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_allow_list_rejects_unknown_fields() {
    let calls = Arc::new(AtomicUsize::new(0));
    let options = ListingOptions::default().with_allowed_fields(&["search"]);
    let mut listing = Listing::new(counting_fetcher(calls.clone()), options);
    listing.settled().await;
    let before = listing.query().clone();

    assert!(listing.set_query(ListQuery::new().with("colour", "red")).is_err());
    assert_eq!(listing.query(), &before);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    listing.set_query(ListQuery::new().with("search", "bolt")).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_append_updates_totals() {
    let fetcher = |_query: ListQuery| async { Ok(Page::new(vec![1u32, 2], 0, 2, 5)) };
    let mut listing = Listing::new(fetcher, ListingOptions::default());
    listing.settled().await;

    assert_eq!(listing.append([3, 4]), Mutation::Applied);

    let page = listing.data().unwrap();
    assert_eq!(page.content, vec![1, 2, 3, 4]);
    assert_eq!(page.total_elements, 7);
    assert_eq!(page.total_pages, 4);
  }

  #[tokio::test]
  async fn test_append_without_data_is_noop() {
    let fetcher = |_query: ListQuery| async { Err::<Page<u32>, _>(eyre!("down")) };
    let mut listing = Listing::new(fetcher, ListingOptions::default());
    listing.settled().await;

    assert_eq!(listing.append([1]), Mutation::Unchanged);
    assert!(listing.data().is_none());
  }

  #[tokio::test]
  async fn test_remove_first_match() {
    let fetcher = |_query: ListQuery| async { Ok(Page::new(vec![1u32, 2, 2, 3], 0, 4, 5)) };
    let mut listing = Listing::new(fetcher, ListingOptions::default());
    listing.settled().await;

    assert_eq!(listing.remove(|v| *v == 2), Mutation::Applied);

    let page = listing.data().unwrap();
    assert_eq!(page.content, vec![1, 2, 3]);
    assert_eq!(page.total_elements, 4);
    assert_eq!(page.total_pages, 1);
  }

  #[tokio::test]
  async fn test_remove_without_match_leaves_state() {
    let fetcher = |_query: ListQuery| async { Ok(Page::new(vec![1u32, 2], 0, 2, 5)) };
    let mut listing = Listing::new(fetcher, ListingOptions::default());
    listing.settled().await;
    let before = listing.data().cloned();

    assert_eq!(listing.remove(|v| *v == 42), Mutation::Unchanged);
    assert_eq!(listing.data().cloned(), before);
  }

  #[tokio::test]
  async fn test_update_leaves_other_items_untouched() {
    let items: Vec<Arc<String>> = ["bolt", "nut", "washer"]
      .iter()
      .map(|s| Arc::new(s.to_string()))
      .collect();
    let served = items.clone();
    let fetcher = move |_query: ListQuery| {
      let content = served.clone();
      async move { Ok(Page::new(content, 0, 10, 3)) }
    };
    let mut listing = Listing::new(fetcher, ListingOptions::default());
    listing.settled().await;

    let outcome = listing.update(
      |item| item.as_str() == "nut",
      |item| Arc::new(item.to_uppercase()),
    );
    assert_eq!(outcome, Mutation::Applied);

    let content = listing.content();
    assert_eq!(content[1].as_str(), "NUT");
    assert!(Arc::ptr_eq(&content[0], &items[0]));
    assert!(Arc::ptr_eq(&content[2], &items[2]));
    assert_eq!(listing.data().unwrap().total_elements, 3);
  }

  #[tokio::test]
  async fn test_identity_update_keeps_content() {
    let mut listing = Listing::new(
      counting_fetcher(Arc::new(AtomicUsize::new(0))),
      ListingOptions::default(),
    );
    listing.settled().await;
    let before = listing.data().cloned();

    assert_eq!(listing.update(|_| true, |item| *item), Mutation::Applied);
    assert_eq!(listing.data().cloned(), before);
  }

  #[tokio::test]
  async fn test_mutation_while_fetching_is_busy() {
    let mut listing = Listing::new(delayed_fetcher(10, 10), ListingOptions::default());
    listing.settled().await;

    listing.refetch();
    assert_eq!(listing.append([7]), Mutation::Busy);
    assert_eq!(listing.remove(|_| true), Mutation::Busy);
    assert_eq!(listing.content(), &[0]);

    listing.settled().await;
    assert_eq!(listing.append([7]), Mutation::Applied);
  }

  #[tokio::test]
  async fn test_mutation_writes_through_to_cache() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut listing = Listing::new(counting_fetcher(calls.clone()), cached());
    listing.settled().await;

    assert_eq!(listing.append([42]), Mutation::Applied);

    listing.set_query(page_query(1)).unwrap();
    listing.settled().await;
    listing.set_query(page_query(0)).unwrap();

    assert!(!listing.is_loading());
    assert_eq!(listing.content(), &[0, 42]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  /// Two items per page so removal and update have something to act on.
  fn pair_fetcher(calls: Arc<AtomicUsize>) -> TestFetcher {
    Box::new(move |query: ListQuery| {
      calls.fetch_add(1, Ordering::SeqCst);
      let page = query.page().unwrap_or(0) as u64;
      let first = page as u32 * 10;
      async move { Ok::<_, Report>(Page::new(vec![first, first + 1], page, 2, 6)) }.boxed()
    })
  }

  #[tokio::test]
  async fn test_remove_writes_through_to_cache() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut listing = Listing::new(pair_fetcher(calls.clone()), cached());
    listing.settled().await;

    assert_eq!(listing.remove(|v| *v == 0), Mutation::Applied);

    listing.set_query(page_query(1)).unwrap();
    listing.settled().await;
    listing.set_query(page_query(0)).unwrap();

    assert!(!listing.is_loading());
    assert_eq!(listing.content(), &[1]);
    assert_eq!(listing.data().unwrap().total_elements, 5);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_update_writes_through_to_cache() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut listing = Listing::new(pair_fetcher(calls.clone()), cached());
    listing.settled().await;

    assert_eq!(listing.update(|v| *v == 1, |v| v + 100), Mutation::Applied);

    listing.set_query(page_query(1)).unwrap();
    listing.settled().await;
    listing.set_query(page_query(0)).unwrap();

    assert!(!listing.is_loading());
    assert_eq!(listing.content(), &[0, 101]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_cleared_search_reuses_unfiltered_entry() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut listing = Listing::new(counting_fetcher(calls.clone()), cached());
    listing.settled().await;
    let mount_key = listing.query().cache_key();

    listing
      .set_query(ListQuery::new().with("search", "x").with("page", 0))
      .unwrap();
    listing.settled().await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    listing
      .set_query(ListQuery::new().with("search", None::<String>).with("page", 0))
      .unwrap();
    assert_eq!(listing.query().cache_key(), mount_key);
    assert!(!listing.is_loading());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_clear_cache_for_current_query() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut listing = Listing::new(counting_fetcher(calls.clone()), cached());
    listing.settled().await;
    listing.set_query(page_query(1)).unwrap();
    listing.settled().await;

    listing.clear_cache_for_query(Some(&ListQuery::new().with("page", 0).with("limit", 10)));
    listing.set_query(page_query(0)).unwrap();
    assert!(listing.is_loading());
    listing.settled().await;

    // Page 1 is still cached
    listing.set_query(page_query(1)).unwrap();
    assert!(!listing.is_loading());
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    listing.clear_cache();
    listing.clear_cache_for_query(None);
    listing.set_query(page_query(0)).unwrap();
    assert!(listing.is_loading());
  }

  #[tokio::test(start_paused = true)]
  async fn test_drop_cancels_in_flight_fetch() {
    let finished = Arc::new(AtomicUsize::new(0));
    let finished_by_fetcher = finished.clone();
    let fetcher = move |query: ListQuery| {
      let finished = finished_by_fetcher.clone();
      async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        finished.fetch_add(1, Ordering::SeqCst);
        Ok(numbered_page(&query))
      }
    };

    let listing = Listing::new(fetcher, ListingOptions::default());
    drop(listing);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(finished.load(Ordering::SeqCst), 0);
  }
}
