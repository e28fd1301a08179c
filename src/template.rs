use std::fmt::{self, Display};

use anyhow::{anyhow, Context, Result};
use handlebars::Handlebars;

use crate::text::escape_xml;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Index,
    Card,
}

impl Template {
    pub const ALL: [Template; 2] = [Self::Index, Self::Card];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Card => "card",
        }
    }

    fn source(&self) -> &'static str {
        match self {
            Self::Index => include_str!("template/index.hbs"),
            Self::Card => include_str!("template/card.svg.hbs"),
        }
    }
}

impl Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

pub fn new() -> Result<Handlebars<'static>> {
    let mut tt = Handlebars::new();
    tt.register_escape_fn(escape_xml);

    for template in Template::ALL {
        tt.register_template_string(template.as_str(), template.source())
            .with_context(|| anyhow!("could not compile the `{template}` template"))?;
    }

    Ok(tt)
}
