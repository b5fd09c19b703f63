//! `nextLink` pagination over ARM list operations.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use futures_util::{StreamExt, TryStreamExt};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ArmError;
use crate::pipeline::ArmPipeline;
use crate::response_error::ensure_status;

/// One page of a list response.
pub trait Page {
    type Item;

    /// URL of the following page; `None` or empty ends the listing.
    fn next_link(&self) -> Option<&str>;

    fn into_items(self) -> Vec<Self::Item>;
}

type PageFuture<P> = Pin<Box<dyn Future<Output = Result<P, ArmError>> + Send>>;
type Fetch<P> = Box<dyn FnMut(Option<String>) -> PageFuture<P> + Send>;

enum State<P> {
    /// Next call fetches the first page (`None`) or the given link.
    Ready(Option<String>),
    Fetching(PageFuture<P>),
    Done,
}

/// Stream of pages.
///
/// The fetch function receives `None` for the first page and the previous
/// page's `nextLink` afterwards. An error is yielded once and ends the stream.
#[must_use = "pagers do nothing unless polled"]
pub struct Pager<P> {
    fetch: Fetch<P>,
    state: State<P>,
}

impl<P> Pager<P>
where
    P: Page + Send + 'static,
{
    pub fn new<F, Fut>(mut fetch: F) -> Self
    where
        F: FnMut(Option<String>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<P, ArmError>> + Send + 'static,
    {
        Self {
            fetch: Box::new(move |link| Box::pin(fetch(link))),
            state: State::Ready(None),
        }
    }

    /// Fetch the next page, `None` once the listing is exhausted.
    ///
    /// # Errors
    /// The page request's error; the pager is finished afterwards.
    pub async fn next_page(&mut self) -> Option<Result<P, ArmError>> {
        self.next().await
    }

    /// `true` until the last page has been returned.
    #[must_use]
    pub fn more(&self) -> bool {
        !matches!(self.state, State::Done)
    }

    /// Flatten pages into their items.
    pub fn items(self) -> impl Stream<Item = Result<P::Item, ArmError>> + Send
    where
        P::Item: Send + 'static,
    {
        self.map_ok(|page| {
            futures_util::stream::iter(page.into_items().into_iter().map(Ok::<P::Item, ArmError>))
        })
        .try_flatten()
    }

    /// Drain every page into one vector.
    ///
    /// # Errors
    /// The first page request that fails.
    pub async fn collect_all(self) -> Result<Vec<P::Item>, ArmError>
    where
        P::Item: Send + 'static,
    {
        self.items().try_collect().await
    }
}

impl<P> Pager<P>
where
    P: Page + DeserializeOwned + Send + 'static,
{
    /// Pager issuing `GET` requests: `first` for the initial page, then each
    /// `nextLink` verbatim. An error in `first` surfaces from the first poll.
    pub fn get_pages(pipeline: ArmPipeline, first: Result<Url, ArmError>) -> Self {
        let mut first = Some(first);
        Self::new(move |link: Option<String>| {
            let pipeline = pipeline.clone();
            let target = match link {
                Some(link) => Url::parse(&link)
                    .map_err(|e| ArmError::InvalidUrl(format!("nextLink {link}: {e}"))),
                None => first
                    .take()
                    .unwrap_or_else(|| Err(ArmError::Pager("first page requested twice".into()))),
            };
            fetch_page(pipeline, target)
        })
    }
}

async fn fetch_page<P: DeserializeOwned>(
    pipeline: ArmPipeline,
    target: Result<Url, ArmError>,
) -> Result<P, ArmError> {
    let url = target?;
    tracing::debug!(url = %url, "fetching page");
    let response = pipeline.request(Method::GET, &url).send().await?;
    let response = ensure_status(&Method::GET, url.as_str(), response, &[StatusCode::OK]).await?;
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

impl<P> Stream for Pager<P>
where
    P: Page + Send + 'static,
{
    type Item = Result<P, ArmError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match &mut this.state {
                State::Done => return Poll::Ready(None),
                State::Ready(link) => {
                    let link = link.take();
                    this.state = State::Fetching((this.fetch)(link));
                }
                State::Fetching(fut) => {
                    let result = match fut.as_mut().poll(cx) {
                        Poll::Pending => return Poll::Pending,
                        Poll::Ready(result) => result,
                    };
                    this.state = match &result {
                        Ok(page) => match page.next_link() {
                            Some(next) if !next.is_empty() => State::Ready(Some(next.to_owned())),
                            _ => State::Done,
                        },
                        Err(_) => State::Done,
                    };
                    return Poll::Ready(Some(result));
                }
            }
        }
    }
}

impl<P> std::fmt::Debug for Pager<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            State::Ready(None) => "not started",
            State::Ready(Some(_)) => "more pages",
            State::Fetching(_) => "fetching",
            State::Done => "done",
        };
        f.debug_struct("Pager").field("state", &state).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Numbers {
        values: Vec<u32>,
        next: Option<String>,
    }

    impl Page for Numbers {
        type Item = u32;

        fn next_link(&self) -> Option<&str> {
            self.next.as_deref()
        }

        fn into_items(self) -> Vec<u32> {
            self.values
        }
    }

    fn three_pages(calls: Arc<AtomicUsize>) -> Pager<Numbers> {
        Pager::new(move |link: Option<String>| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok::<_, ArmError>(match link.as_deref() {
                    None => Numbers {
                        values: vec![1, 2],
                        next: Some("p2".into()),
                    },
                    Some("p2") => Numbers {
                        values: vec![3],
                        next: Some("p3".into()),
                    },
                    Some(_) => Numbers {
                        values: vec![4, 5],
                        next: Some(String::new()),
                    },
                })
            }
        })
    }

    #[tokio::test]
    async fn test_follows_links_until_empty() {
        let calls = Arc::new(AtomicUsize::new(0));
        let items = three_pages(calls.clone()).collect_all().await.unwrap();
        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_next_page_and_more() {
        let mut pager = three_pages(Arc::new(AtomicUsize::new(0)));
        assert!(pager.more());
        let mut pages = 0;
        while let Some(page) = pager.next_page().await {
            page.unwrap();
            pages += 1;
        }
        assert_eq!(pages, 3);
        assert!(!pager.more());
        assert!(pager.next_page().await.is_none());
    }

    #[tokio::test]
    async fn test_error_is_yielded_once() {
        let mut pager: Pager<Numbers> = Pager::new(|link: Option<String>| async move {
            match link {
                None => Ok(Numbers {
                    values: vec![1],
                    next: Some("broken".into()),
                }),
                Some(_) => Err(ArmError::Pager("boom".into())),
            }
        });
        assert!(pager.next_page().await.unwrap().is_ok());
        assert!(pager.next_page().await.unwrap().is_err());
        assert!(pager.next_page().await.is_none());
    }

    #[tokio::test]
    async fn test_collect_all_stops_at_error() {
        let pager: Pager<Numbers> =
            Pager::new(|_| async { Err(ArmError::MissingParameter("serviceName".into())) });
        let err = pager.collect_all().await.unwrap_err();
        assert_eq!(err.to_string(), "parameter serviceName cannot be empty");
    }
}
