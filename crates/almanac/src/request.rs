//! Per-request facts supplied by the host.
//!
//! The host answers a few questions about the current request before the
//! engine runs: what the main query is, whether this is an asynchronous view
//! request, and what was posted. [`RequestContext`] carries those answers;
//! the engine never inspects host globals itself.

/// Structural facts about the main query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFlags {
    /// The main query targets calendar events.
    pub event_query: bool,
    /// View discriminator carried by the query (`list`, `month`, `day`,
    /// `single-event`, ...).
    pub event_display: Option<String>,
    /// The query being processed is the host's main query.
    pub main_query: bool,
    pub single: bool,
    pub not_found: bool,
    pub embed: bool,
    pub feed: bool,
    /// The single item is password protected and no password was supplied.
    pub password_required: bool,
    /// A single recurring item is being shown with all its occurrences.
    pub showing_all: bool,
    /// Post type the query was made for.
    pub post_type: Option<String>,
    /// Slug of the event category being browsed.
    pub category: Option<String>,
}

impl QueryFlags {
    /// Flags for an event query showing `view`.
    pub fn events(view: impl Into<String>) -> Self {
        Self {
            event_query: true,
            event_display: Some(view.into()),
            main_query: true,
            ..Self::default()
        }
    }

    /// True if the query displays `view`.
    pub fn displays(&self, view: &str) -> bool {
        self.event_display.as_deref() == Some(view)
    }
}

/// Form parameters of an asynchronous view request.
///
/// Empty values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostedParams {
    /// `action`: the ajax hook name.
    pub action: Option<String>,
    /// `tribe_event_display`: `past` or `all` switch the listing mode.
    pub display: Option<String>,
    /// `tribe_paged`, as posted.
    pub paged: Option<String>,
    /// `tribe_event_category`.
    pub category: Option<String>,
    /// `eventDate`.
    pub event_date: Option<String>,
    /// `hash`: fingerprint of the query the client last saw.
    pub hash: Option<String>,
}

impl PostedParams {
    /// Collects the known parameters from form pairs. Later duplicates win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let value: String = value.into();
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_ref() {
                "action" => &mut params.action,
                "tribe_event_display" => &mut params.display,
                "tribe_paged" => &mut params.paged,
                "tribe_event_category" => &mut params.category,
                "eventDate" => &mut params.event_date,
                "hash" => &mut params.hash,
                _ => continue,
            };
            *slot = Some(value);
        }
        params
    }

    /// The requested page. Missing, malformed and non-positive values mean page 1.
    pub fn page(&self) -> u32 {
        self.paged
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1)
    }
}

/// Everything the engine knows about one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub query: QueryFlags,
    /// Served as an asynchronous view request.
    pub ajax: bool,
    pub posted: PostedParams,
    pub logged_in: bool,
    /// Served in the host's admin area.
    pub admin: bool,
}

impl RequestContext {
    /// A regular page request for the given query.
    pub fn page(query: QueryFlags) -> Self {
        Self {
            query,
            ..Self::default()
        }
    }

    /// An asynchronous view request with the given form parameters.
    pub fn ajax(posted: PostedParams) -> Self {
        Self {
            ajax: true,
            posted,
            ..Self::default()
        }
    }

    pub fn logged_in(mut self) -> Self {
        self.logged_in = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs() {
        let params = PostedParams::from_pairs([
            ("action", "tribe_list"),
            ("tribe_paged", "3"),
            ("tribe_event_display", ""),
            ("unrelated", "x"),
            ("hash", "abc"),
        ]);
        assert_eq!(params.action.as_deref(), Some("tribe_list"));
        assert_eq!(params.display, None);
        assert_eq!(params.hash.as_deref(), Some("abc"));
        assert_eq!(params.page(), 3);
    }

    #[test]
    fn test_page_defaults_to_one() {
        for raw in ["", "0", "-2", "abc", "2.5"] {
            let params = PostedParams::from_pairs([("tribe_paged", raw)]);
            assert_eq!(params.page(), 1, "for {:?}", raw);
        }
    }

    #[test]
    fn test_query_flags_displays() {
        let flags = QueryFlags::events("month");
        assert!(flags.displays("month"));
        assert!(!flags.displays("list"));
        assert!(flags.main_query);
    }
}
