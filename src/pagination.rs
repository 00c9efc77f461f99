//! Page-by-page accumulation of provider lists

use std::future::Future;

use crate::provider::Error;
use crate::provider::Page;

/// Fetch every page of a list, starting at page 1
///
/// Stops once the last page (based on `total_count` and `per_page` of the fetched page) has been
/// consumed. The first error aborts the walk: partially accumulated items are dropped and the
/// error is returned as-is.
pub async fn fetch_all<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, Error>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, Error>>,
{
    let mut items = Vec::new();
    let mut page_number = 1;

    loop {
        let page = fetch_page(page_number).await?;
        let is_last = page.is_last();

        items.extend(page.items);

        if is_last {
            break;
        }

        page_number += 1;
    }

    tracing::trace!("Fetched {} items over {page_number} pages", items.len());

    Ok(items)
}
