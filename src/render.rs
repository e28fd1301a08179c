use std::borrow::Cow;

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::{debug, trace};

use crate::feed::{Article, Feed};
use crate::html::plain_text;
use crate::query::{CardOptions, QueryType};
use crate::template::Template;
use crate::text::truncate;
use crate::theme::ThemeColors;

const WIDTH: i64 = 800;
const HEADER_HEIGHT: i64 = 110;
const FOOTER_HEIGHT: i64 = 50;
const CARD_HEIGHT: i64 = 100;
const CARD_SPACING: i64 = 15;

const MAX_TITLE_LEN: usize = 85;
const MAX_DESCRIPTION_LEN: usize = 90;

const FALLBACK_AVATAR: &str = "https://cdn-icons-png.flaticon.com/512/5968/5968885.png";

static DISPLAY_DATE_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[month repr:short] [day padding:none], [year]");

#[derive(Serialize, Debug)]
struct CardContext<'a> {
    width: i64,
    height: i64,
    header_height: i64,
    card_height: i64,
    colors: &'static ThemeColors,
    avatar: &'a str,
    author: &'a str,
    cards: Vec<ArticleCard<'a>>,
}

#[derive(Serialize, Debug)]
struct ArticleCard<'a> {
    y: i64,
    link: &'a str,
    title: Cow<'a, str>,
    date: Cow<'a, str>,
    category: Option<String>,
    description: Option<String>,
}

/// Height of a card listing `article_count` articles.
pub fn svg_height(article_count: usize) -> i64 {
    let n = article_count as i64;

    n * CARD_HEIGHT + (n - 1) * CARD_SPACING + HEADER_HEIGHT + FOOTER_HEIGHT
}

fn select_articles<'a>(feed: &'a Feed, options: &CardOptions) -> &'a [Article] {
    match options.kind {
        QueryType::Latest => &feed.items[..options.count.min(feed.items.len())],
    }
}

fn display_date(article: &Article) -> Cow<'_, str> {
    article
        .parsed_pub_date()
        .ok()
        .and_then(|date| date.format(DISPLAY_DATE_FORMAT).ok())
        .map(Cow::Owned)
        .unwrap_or(Cow::Borrowed(article.pub_date.as_str()))
}

fn description(article: &Article) -> Option<String> {
    let text = plain_text(&article.description);
    let text = truncate(&text, MAX_DESCRIPTION_LEN);
    trace!(title = %article.title, description = %text, "Extracted the description");

    (!text.is_empty()).then(|| text.into_owned())
}

fn article_card<'a>(idx: usize, article: &'a Article) -> ArticleCard<'a> {
    ArticleCard {
        y: idx as i64 * (CARD_HEIGHT + CARD_SPACING),
        link: &article.link,
        title: truncate(&article.title, MAX_TITLE_LEN),
        date: display_date(article),
        category: article
            .categories
            .first()
            .map(|category| format!("#{category}")),
        description: description(article),
    }
}

/// Renders the SVG card for `feed`.
///
/// Text is escaped by the template registry, so every field is passed in raw.
pub fn render(tt: &Handlebars<'_>, feed: &Feed, options: &CardOptions) -> Result<String> {
    let articles = select_articles(feed, options);
    debug!(
        kind = options.kind.as_str(),
        theme = %options.theme,
        "Rendering {} of {} articles",
        articles.len(),
        feed.items.len(),
    );

    let info = &feed.feed;
    let avatar: &str = if info.image.is_empty() {
        FALLBACK_AVATAR
    } else {
        &info.image
    };
    let author: &str = if info.author.is_empty() {
        &info.title
    } else {
        &info.author
    };

    let ctx = CardContext {
        width: WIDTH,
        height: svg_height(articles.len()),
        header_height: HEADER_HEIGHT,
        card_height: CARD_HEIGHT,
        colors: options.theme.colors(),
        avatar,
        author,
        cards: articles
            .iter()
            .enumerate()
            .map(|(idx, article)| article_card(idx, article))
            .collect(),
    };

    tt.render(Template::Card.as_str(), &ctx)
        .context("could not render the SVG template")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::feed::tests::{article, feed};
    use crate::query::CardParams;
    use crate::template;
    use crate::theme::Theme;

    fn options(count: usize, theme: Theme) -> CardOptions {
        CardOptions {
            kind: QueryType::Latest,
            count,
            theme,
        }
    }

    fn render_feed(feed: &Feed, options: &CardOptions) -> String {
        render(&template::new().unwrap(), feed, options).unwrap()
    }

    fn card_count(svg: &str) -> usize {
        svg.matches(r#"filter="url(#cardShadow)""#).count()
    }

    #[test]
    fn height_formula() {
        assert_eq!(svg_height(1), 260);
        assert_eq!(svg_height(5), 720);
        assert_eq!(svg_height(10), 1310);
    }

    #[test]
    fn height_attribute_matches_the_article_count() {
        let one = render_feed(&feed(&["A"]), &options(10, Theme::Nord));
        assert!(one.starts_with(r#"<svg width="800" height="260""#), "{one}");

        let five = render_feed(&feed(&["A", "B", "C", "D", "E"]), &options(10, Theme::Nord));
        assert!(five.starts_with(r#"<svg width="800" height="720""#), "{five}");
    }

    #[test]
    fn takes_the_first_articles_in_order() {
        let svg = render_feed(&feed(&["First", "Second", "Third"]), &options(2, Theme::default()));

        assert_eq!(card_count(&svg), 2);
        let first = svg.find(">First<").unwrap();
        let second = svg.find(">Second<").unwrap();
        assert!(first < second);
        assert!(!svg.contains("Third"));
        assert!(svg.contains(r#"transform="translate(0, 0)""#));
        assert!(svg.contains(r#"transform="translate(0, 115)""#));
    }

    #[test]
    fn count_larger_than_the_feed_takes_everything() {
        let svg = render_feed(&feed(&["A", "B", "C"]), &options(50, Theme::default()));

        assert_eq!(card_count(&svg), 3);
    }

    #[test]
    fn unknown_theme_uses_the_default_palette() {
        let params = CardParams {
            theme: Some("unknownvalue".into()),
            ..Default::default()
        };
        let svg = render_feed(
            &feed(&["A"]),
            &CardOptions::from_params(&params, Theme::GithubLight),
        );

        let colors = Theme::GithubLight.colors();
        assert!(svg.contains(&format!(r#"stop-color="{}""#, colors.background)));
        assert!(svg.contains(&format!(r#"stop-color="{}""#, colors.secondary)));
        assert!(svg.contains(&format!(r#"fill="{}">Alice</text>"#, colors.primary)));
        assert!(svg.contains(&format!(r#"fill="{}">📝 Latest from Medium"#, colors.text)));
    }

    #[test]
    fn card_contents() {
        let mut article = article("Ownership & Borrowing");
        article.pub_date = "2024-03-05 10:15:00".into();
        article.categories = vec!["rust".into()];
        article.description = "<p>Hello</p><script>evil()</script><p>World</p>".into();

        let feed = Feed {
            items: vec![article],
            ..feed(&[])
        };
        let svg = render_feed(&feed, &options(10, Theme::Dracula));

        assert!(svg.contains(">Ownership &amp; Borrowing</text>"), "{svg}");
        assert!(svg.contains("📅 Mar 5, 2024 • #rust</text>"), "{svg}");
        assert!(svg.contains(">Hello\nWorld</text>"), "{svg}");
        assert!(!svg.contains("evil"));
        assert!(svg.contains(r#"<a href="https://medium.com/@alice/ownership-&amp;-borrowing">"#));
    }

    #[test]
    fn unparseable_dates_are_shown_verbatim() {
        let mut article = article("Dates");
        article.pub_date = "sometime in <March>".into();
        article.categories.clear();

        let feed = Feed {
            items: vec![article],
            ..feed(&[])
        };
        let svg = render_feed(&feed, &options(10, Theme::default()));

        assert!(svg.contains("📅 sometime in &lt;March&gt;</text>"), "{svg}");
        assert!(!svg.contains(" • "));
    }

    #[test]
    fn empty_descriptions_are_omitted() {
        let mut article = article("Quiet");
        article.description = "<style>p {}</style><img src=\"x.png\">".into();

        let feed = Feed {
            items: vec![article],
            ..feed(&[])
        };
        let svg = render_feed(&feed, &options(10, Theme::default()));

        assert!(!svg.contains(r#"y="67""#), "{svg}");
    }

    #[test]
    fn long_text_is_truncated() {
        let mut article = article(&"T".repeat(200));
        article.description = format!("<p>{}</p>", "d".repeat(200));

        let feed = Feed {
            items: vec![article],
            ..feed(&[])
        };
        let svg = render_feed(&feed, &options(10, Theme::default()));

        assert!(svg.contains(&format!(">{}...</text>", "T".repeat(82))));
        assert!(svg.contains(&format!(">{}...</text>", "d".repeat(87))));
    }

    #[test]
    fn header_fallbacks() {
        let mut feed = feed(&["A"]);
        feed.feed.author.clear();
        feed.feed.image.clear();
        feed.feed.title = "Stories by Bob".into();

        let svg = render_feed(&feed, &options(10, Theme::default()));

        assert!(svg.contains(&format!(r#"<image href="{FALLBACK_AVATAR}""#)));
        assert!(svg.contains(">Stories by Bob</text>"));
    }

    #[test]
    fn empty_feed_still_renders() {
        let svg = render_feed(&feed(&[]), &options(10, Theme::default()));

        assert_eq!(card_count(&svg), 0);
        assert!(svg.starts_with(r#"<svg width="800" height="145""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
