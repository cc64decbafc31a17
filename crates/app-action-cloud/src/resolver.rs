use crate::api::{App, AppsApi, PageRequest};
use crate::error::ApiError;

/// Find the app whose spec name equals `name` exactly.
///
/// Pages through the account's apps and stops at the first match, so the
/// number of list calls never exceeds the number of pages.
pub async fn find_app_by_name<A: AppsApi>(api: &A, name: &str) -> Result<Option<App>, ApiError> {
    let mut page = PageRequest::default();
    loop {
        let listing = api.list_apps(page).await?;
        if let Some(app) = listing
            .items
            .into_iter()
            .find(|app| app.spec_name() == Some(name))
        {
            tracing::debug!(app_id = %app.id, name, "found app");
            return Ok(Some(app));
        }
        if listing.is_last {
            return Ok(None);
        }
        page = page.next();
    }
}
