//! Asynchronous view responses.
//!
//! An ajax view request rebuilds the selected view's query from the posted
//! form, runs it through the event source and answers with a JSON payload:
//!
//! ```json
//! {"html":"...","success":true,"view":"list","max_pages":3,"total_count":27,"hash":"..."}
//! ```
//!
//! The `hash` fingerprints the query's primary arguments. Clients post it
//! back with the next request; when the arguments have changed since (a
//! filter was applied, say), pagination restarts at page 1.

use almanac_dispatch::{to_json, to_value, Response};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::StatusPolicy;
use crate::error::EngineError;
use crate::request::PostedParams;
use crate::scope::RequestScope;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Arguments of an event query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryArgs {
    #[serde(rename = "eventDisplay")]
    pub event_display: String,
    pub post_type: String,
    pub post_status: Vec<String>,
    pub paged: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
    #[serde(
        rename = "tribe_events_cat",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
    #[serde(rename = "eventDate", default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
}

impl QueryArgs {
    /// Builds the query for `view` from posted parameters.
    ///
    /// A posted display of `past` lists past events newest first; `all`
    /// lists every occurrence.
    pub fn from_posted(
        view: &str,
        posted: &PostedParams,
        post_type: &str,
        statuses: &StatusPolicy,
        logged_in: bool,
    ) -> Self {
        let mut args = Self {
            event_display: view.to_string(),
            post_type: post_type.to_string(),
            post_status: statuses.statuses(logged_in).to_vec(),
            paged: posted.page(),
            order: None,
            category: posted.category.clone(),
            event_date: posted.event_date.clone(),
        };

        match posted.display.as_deref() {
            Some("past") => {
                args.event_display = "past".into();
                args.order = Some(SortOrder::Desc);
            }
            Some("all") => args.event_display = "all".into(),
            _ => {}
        }
        args
    }

    /// Fingerprint of the primary arguments. The page is not part of it.
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();
        let mut field = |name: &str, value: &str| {
            hasher.update(name.as_bytes());
            hasher.update(b"\x1f");
            hasher.update(value.as_bytes());
            hasher.update(b"\x1e");
        };

        field("eventDisplay", &self.event_display);
        field("post_type", &self.post_type);
        field("post_status", &self.post_status.join(","));
        field("order", self.order.map_or("", SortOrder::as_str));
        field("category", self.category.as_deref().unwrap_or(""));
        field("eventDate", self.event_date.as_deref().unwrap_or(""));

        hex::encode(hasher.finalize())
    }

    /// Restarts pagination when the client's fingerprint is stale.
    ///
    /// Returns the fresh fingerprint.
    pub fn reconcile_page(&mut self, posted_hash: Option<&str>) -> String {
        let fresh = self.hash();
        if let Some(seen) = posted_hash.filter(|h| !h.is_empty()) {
            if seen != fresh {
                tracing::debug!(page = self.paged, "query changed, back to page 1");
                self.paged = 1;
            }
        }
        fresh
    }
}

/// Result of an event query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub items: Vec<serde_json::Value>,
    pub max_pages: u32,
    pub total_count: u64,
}

/// Runs event queries. Implemented by the host's data layer.
pub trait EventSource {
    fn query(&self, args: &QueryArgs) -> anyhow::Result<QueryResult>;
}

impl<F> EventSource for F
where
    F: Fn(&QueryArgs) -> anyhow::Result<QueryResult>,
{
    fn query(&self, args: &QueryArgs) -> anyhow::Result<QueryResult> {
        self(args)
    }
}

/// The structured body of a successful ajax response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AjaxPayload {
    pub html: String,
    pub success: bool,
    pub view: String,
    pub max_pages: u32,
    pub total_count: u64,
    pub hash: String,
}

impl RequestScope<'_> {
    /// Builds the terminal response of an ajax view request.
    ///
    /// Without a selected view the body is empty (before the raw filter) and
    /// no content type is set.
    pub fn ajax_response(&self, source: &dyn EventSource) -> Result<Response, EngineError> {
        let hooks = self.engine().hooks();
        let hook_ctx = self.hook_context();

        let Some(selected) = self.selected() else {
            let body = hooks.run_response_raw(&hook_ctx, String::new())?;
            return Ok(Response {
                body,
                ..Response::empty()
            });
        };

        let args = self.query_args(&selected.id);
        let filtered = hooks.run_query_args(&hook_ctx, to_value(&args)?)?;
        let mut args: QueryArgs =
            serde_json::from_value(filtered).map_err(EngineError::QueryArgs)?;
        // The client echoes the hash of what ran, so compare after the filter.
        args.reconcile_page(self.context().posted.hash.as_deref());

        let result = source.query(&args).map_err(EngineError::Query)?;
        let payload = AjaxPayload {
            html: self.render_inner(selected, &args, &result)?,
            success: true,
            view: selected.id.clone(),
            max_pages: result.max_pages,
            total_count: result.total_count,
            hash: args.hash(),
        };
        tracing::debug!(
            view = %payload.view,
            page = args.paged,
            total = payload.total_count,
            "ajax response built"
        );

        let value = hooks.run_response(&hook_ctx, to_value(&payload)?)?;
        let body = hooks.run_response_raw(&hook_ctx, to_json(&value)?)?;
        Ok(Response::json(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posted(pairs: &[(&str, &str)]) -> PostedParams {
        PostedParams::from_pairs(pairs.iter().copied())
    }

    fn args_for(pairs: &[(&str, &str)], logged_in: bool) -> QueryArgs {
        QueryArgs::from_posted(
            "list",
            &posted(pairs),
            "tribe_events",
            &StatusPolicy::default(),
            logged_in,
        )
    }

    #[test]
    fn test_base_args() {
        let args = args_for(&[("tribe_paged", "4")], false);
        assert_eq!(args.event_display, "list");
        assert_eq!(args.post_type, "tribe_events");
        assert_eq!(args.post_status, vec!["private"]);
        assert_eq!(args.paged, 4);
        assert_eq!(args.order, None);

        let args = args_for(&[], true);
        assert_eq!(args.post_status, vec!["publish", "private"]);
        assert_eq!(args.paged, 1);
    }

    #[test]
    fn test_display_modes() {
        let past = args_for(&[("tribe_event_display", "past")], false);
        assert_eq!(past.event_display, "past");
        assert_eq!(past.order, Some(SortOrder::Desc));

        let all = args_for(&[("tribe_event_display", "all")], false);
        assert_eq!(all.event_display, "all");
        assert_eq!(all.order, None);
    }

    #[test]
    fn test_optional_filters() {
        let args = args_for(
            &[("tribe_event_category", "music"), ("eventDate", "2024-05-01")],
            false,
        );
        assert_eq!(args.category.as_deref(), Some("music"));
        assert_eq!(args.event_date.as_deref(), Some("2024-05-01"));

        let json = serde_json::to_value(&args).unwrap();
        assert_eq!(json["tribe_events_cat"], "music");
        assert_eq!(json["eventDate"], "2024-05-01");
    }

    #[test]
    fn test_hash_ignores_page() {
        let first = args_for(&[("tribe_paged", "1")], false);
        let fifth = args_for(&[("tribe_paged", "5")], false);
        assert_eq!(first.hash(), fifth.hash());
        assert_eq!(first.hash().len(), 64);

        let filtered = args_for(&[("tribe_event_category", "music")], false);
        assert_ne!(first.hash(), filtered.hash());
    }

    #[test]
    fn test_stale_hash_resets_page() {
        let mut args = args_for(&[("tribe_paged", "5")], false);
        let fresh = args.reconcile_page(Some("abc"));
        assert_eq!(args.paged, 1);
        assert_eq!(fresh, args.hash());
    }

    #[test]
    fn test_matching_or_missing_hash_keeps_page() {
        let mut args = args_for(&[("tribe_paged", "5")], false);
        let hash = args.hash();
        args.reconcile_page(Some(&hash));
        assert_eq!(args.paged, 5);

        args.reconcile_page(None);
        assert_eq!(args.paged, 5);
        args.reconcile_page(Some(""));
        assert_eq!(args.paged, 5);
    }

    #[test]
    fn test_closure_event_source() {
        let source = |args: &QueryArgs| -> anyhow::Result<QueryResult> {
            Ok(QueryResult {
                items: vec![],
                max_pages: args.paged,
                total_count: 0,
            })
        };
        let args = args_for(&[("tribe_paged", "2")], false);
        assert_eq!(source.query(&args).unwrap().max_pages, 2);
    }
}
