use tracing::{debug, warn};

use url::form_urlencoded;

use crate::theme::Theme;

pub const DEFAULT_COUNT: usize = 10;

/// Selects which articles end up on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryType {
    /// The newest articles, in feed order.
    #[default]
    Latest,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Latest => "latest",
        }
    }

    pub fn from_param(s: Option<&str>) -> Self {
        match s {
            None | Some("latest") => Self::Latest,

            Some(s) => {
                debug!("Unrecognized query type `{s}`, using `{}`", Self::default().as_str());

                Self::default()
            }
        }
    }
}

/// Raw query parameters of a card request.
#[derive(Debug, Clone, Default)]
pub struct CardParams {
    pub kind: Option<String>,
    pub count: Option<String>,
    pub theme: Option<String>,
}

impl CardParams {
    /// Parses a URL query string. A repeated key keeps its first value; unknown keys are ignored.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();

        for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            let field = match key.as_ref() {
                "type" => &mut params.kind,
                "count" => &mut params.count,
                "theme" => &mut params.theme,
                _ => continue,
            };

            field.get_or_insert_with(|| value.into_owned());
        }

        params
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardOptions {
    pub kind: QueryType,
    pub count: usize,
    pub theme: Theme,
}

impl CardOptions {
    pub fn from_params(params: &CardParams, default_theme: Theme) -> Self {
        Self {
            kind: QueryType::from_param(params.kind.as_deref()),
            count: parse_count(params.count.as_deref()),
            theme: parse_theme(params.theme.as_deref(), default_theme),
        }
    }
}

impl Default for CardOptions {
    fn default() -> Self {
        Self {
            kind: Default::default(),
            count: DEFAULT_COUNT,
            theme: Default::default(),
        }
    }
}

/// Parses the requested article count. Anything that is not a positive integer yields
/// [`DEFAULT_COUNT`].
pub fn parse_count(s: Option<&str>) -> usize {
    let Some(s) = s.filter(|s| !s.is_empty()) else {
        return DEFAULT_COUNT;
    };

    match s.parse::<i64>() {
        Ok(count) if count > 0 => usize::try_from(count).unwrap_or(DEFAULT_COUNT),

        _ => {
            debug!("Invalid count `{s}`, using {DEFAULT_COUNT}");

            DEFAULT_COUNT
        }
    }
}

pub fn parse_theme(s: Option<&str>, default: Theme) -> Theme {
    let Some(s) = s else {
        return default;
    };

    s.parse().unwrap_or_else(|e| {
        warn!("{e}; falling back to `{default}`");

        default
    })
}
