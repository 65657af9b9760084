//! Page-range correction.
//!
//! Providers report totals that can be approximate or unbounded. The
//! reported total is clamped to a per-provider ceiling, and a request for a
//! page past the end is re-issued once against the last valid page.

use std::future::Future;

use medialog_metadata::{MetadataError, RawPage};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub total: u64,
    pub total_pages: u32,
}

/// Clamp `reported_total` to `ceiling` and derive the page count, never
/// below one page. A provider-reported last page narrows it further.
pub fn page_window(
    reported_total: u64,
    ceiling: u64,
    page_size: u32,
    last_page: Option<u32>,
) -> PageWindow {
    let total = reported_total.min(ceiling);
    let page_size = u64::from(page_size.max(1));
    let computed = total.div_ceil(page_size).clamp(1, u64::from(u32::MAX)) as u32;

    let total_pages = match last_page {
        Some(last) if last >= 1 => computed.min(last),
        _ => computed,
    };

    PageWindow { total, total_pages }
}

#[derive(Debug)]
pub struct CorrectedPage<T> {
    pub page: RawPage<T>,
    pub total: u64,
    pub total_pages: u32,
    pub current_page: u32,
    /// A second fetch was needed because the requested page was out of range.
    pub refetched: bool,
}

/// Fetch `requested_page`; if it lies past the provider's bounds, fetch the
/// last valid page instead. At most two calls to `fetch`, except when the
/// provider rejects the page outright: then page 1 supplies the totals and
/// the last page is fetched only if it is not page 1.
pub async fn fetch_corrected<T, F, Fut>(
    requested_page: u32,
    page_size: u32,
    ceiling: u64,
    mut fetch: F,
) -> Result<CorrectedPage<T>, MetadataError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<RawPage<T>, MetadataError>>,
{
    let requested = requested_page.max(1);
    let (first, fetched_page) = match fetch(requested).await {
        Ok(page) => (page, requested),
        Err(MetadataError::PageOutOfRange(_)) if requested > 1 => {
            debug!(requested, "provider rejected page, reading totals from page 1");
            (fetch(1).await?, 1)
        }
        Err(e) => return Err(e),
    };
    let window = page_window(first.total_results, ceiling, page_size, first.last_page);

    if fetched_page == requested && requested <= window.total_pages {
        return Ok(CorrectedPage {
            page: first,
            total: window.total,
            total_pages: window.total_pages,
            current_page: requested,
            refetched: false,
        });
    }

    if fetched_page == window.total_pages {
        return Ok(CorrectedPage {
            page: first,
            total: window.total,
            total_pages: window.total_pages,
            current_page: window.total_pages,
            refetched: true,
        });
    }

    debug!(
        requested,
        total_pages = window.total_pages,
        "requested page out of range, fetching last page"
    );
    let corrected = fetch(window.total_pages).await?;

    Ok(CorrectedPage {
        page: corrected,
        total: window.total,
        total_pages: window.total_pages,
        current_page: window.total_pages,
        refetched: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn page_of(total: u64) -> RawPage<u32> {
        RawPage {
            items: vec![1, 2, 3],
            total_results: total,
            last_page: None,
        }
    }

    #[test]
    fn window_rounds_up_and_floors_at_one() {
        assert_eq!(page_window(45, 10_000, 20, None).total_pages, 3);
        assert_eq!(page_window(40, 10_000, 20, None).total_pages, 2);
        assert_eq!(page_window(0, 10_000, 20, None).total_pages, 1);
    }

    #[test]
    fn window_applies_ceiling() {
        let w = page_window(5_000, 20, 20, None);
        assert_eq!(w.total, 20);
        assert_eq!(w.total_pages, 1);

        let w = page_window(900_000, 10_000, 20, None);
        assert_eq!(w.total, 10_000);
        assert_eq!(w.total_pages, 500);
    }

    #[test]
    fn window_respects_reported_last_page() {
        assert_eq!(page_window(1_000, u64::MAX, 20, Some(7)).total_pages, 7);
        assert_eq!(page_window(45, u64::MAX, 20, Some(0)).total_pages, 3);
    }

    #[tokio::test]
    async fn in_range_page_is_fetched_once() {
        let calls = Mutex::new(Vec::new());
        let result = fetch_corrected(2, 20, 10_000, |p| {
            calls.lock().unwrap().push(p);
            async { Ok(page_of(45)) }
        })
        .await
        .unwrap();

        assert_eq!(result.total_pages, 3);
        assert_eq!(result.current_page, 2);
        assert!(!result.refetched);
        assert_eq!(*calls.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn out_of_range_page_refetches_last() {
        let calls = Mutex::new(Vec::new());
        let result = fetch_corrected(99, 20, 10_000, |p| {
            calls.lock().unwrap().push(p);
            async { Ok(page_of(45)) }
        })
        .await
        .unwrap();

        assert_eq!(result.current_page, 3);
        assert!(result.refetched);
        assert_eq!(*calls.lock().unwrap(), vec![99, 3]);
    }

    #[tokio::test]
    async fn first_fetch_error_propagates() {
        let result: Result<CorrectedPage<u32>, _> = fetch_corrected(1, 20, 10_000, |_| async {
            Err(MetadataError::Network("down".into()))
        })
        .await;
        assert!(matches!(result, Err(MetadataError::Network(_))));
    }

    /// Stub that rejects every page past `last` the way RAWG does.
    fn rejecting(
        last: u32,
        total: u64,
    ) -> impl FnMut(u32) -> std::future::Ready<Result<RawPage<u32>, MetadataError>> {
        move |p| {
            if p > last {
                std::future::ready(Err(MetadataError::PageOutOfRange(p)))
            } else {
                std::future::ready(Ok(page_of(total)))
            }
        }
    }

    #[tokio::test]
    async fn rejected_page_is_corrected_through_first_page() {
        let calls = Mutex::new(Vec::new());
        let mut stub = rejecting(3, 45);
        let result = fetch_corrected(9999, 20, 10_000, |p| {
            calls.lock().unwrap().push(p);
            stub(p)
        })
        .await
        .unwrap();

        assert_eq!(result.total_pages, 3);
        assert_eq!(result.current_page, 3);
        assert!(result.refetched);
        assert_eq!(*calls.lock().unwrap(), vec![9999, 1, 3]);
    }

    #[tokio::test]
    async fn rejected_page_with_single_page_catalog_serves_page_one() {
        let calls = Mutex::new(Vec::new());
        let mut stub = rejecting(1, 7);
        let result = fetch_corrected(4, 20, 10_000, |p| {
            calls.lock().unwrap().push(p);
            stub(p)
        })
        .await
        .unwrap();

        assert_eq!(result.current_page, 1);
        assert_eq!(result.total_pages, 1);
        assert_eq!(result.page.items, vec![1, 2, 3]);
        assert_eq!(*calls.lock().unwrap(), vec![4, 1]);
    }

    #[tokio::test]
    async fn rejected_first_page_propagates() {
        let result = fetch_corrected(1, 20, 10_000, rejecting(0, 0)).await;
        assert!(matches!(result, Err(MetadataError::PageOutOfRange(1))));
    }
}
