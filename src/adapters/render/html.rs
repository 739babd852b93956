//! Implements PageRenderer on minijinja. Page bodies come from the
//! built-in templates; the result is placed in the [`PageTemplate`] wrapper.
//! Everything is HTML auto-escaped; only the rendered body is passed to the
//! wrapper as safe.

use super::template::PageTemplate;
use crate::domain::{DomainError, Message, Page, PageBody, Resource, Series, SeriesEntry};
use crate::ports::PageRenderer;
use chrono::NaiveDate;
use minijinja::{context, AutoEscape, Environment, Value};
use serde::Serialize;
use std::sync::Arc;

const WRAPPER: &str = "page.html";
const BODY: &str = "body.html";

pub struct HtmlRenderer {
    env: Environment<'static>,
    skin: String,
}

impl HtmlRenderer {
    pub fn new(template: PageTemplate, skin: Option<String>) -> Result<Self, DomainError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        let templates = [
            ("macros.html", include_str!("templates/macros.html")),
            (BODY, include_str!("templates/body.html")),
        ];
        for (name, source) in templates {
            env.add_template(name, source)
                .map_err(|e| DomainError::Template(format!("{}: {}", name, e)))?;
        }
        env.add_template_owned(WRAPPER, template.into_source())
            .map_err(|e| DomainError::Template(e.to_string()))?;
        Ok(Self {
            env,
            skin: skin.unwrap_or_else(|| "catalog".to_string()),
        })
    }

    fn render_body(&self, page: &Page) -> Result<String, minijinja::Error> {
        let body = self.env.get_template(BODY)?;
        let kind = page.body.kind();
        let title = &page.title;
        let description = &page.description;
        match &page.body {
            PageBody::SeriesIndex { promo, series } => body.render(context! {
                kind, title, description,
                promo => series_views(promo),
                series => series_views(series),
            }),
            PageBody::SeriesDetail { series, messages } => body.render(context! {
                kind, title, description,
                detail => DetailView::new(series),
                messages => message_views(messages, Some(&**series)),
            }),
            PageBody::MessageList(list) => body.render(context! {
                kind, title, description,
                messages => message_views(list, None),
            }),
            PageBody::ResourceList(list) => body.render(context! {
                kind, title, description,
                resources => resource_views(list),
            }),
        }
    }
}

impl PageRenderer for HtmlRenderer {
    fn render(&self, page: &Page) -> Result<String, DomainError> {
        let content = self
            .render_body(page)
            .map_err(|e| DomainError::Render(format!("{}: {}", page.path, e)))?;
        self.env
            .get_template(WRAPPER)
            .and_then(|wrapper| {
                wrapper.render(context! {
                    title => &page.title,
                    skin => &self.skin,
                    content => Value::from_safe_string(content),
                })
            })
            .map_err(|e| DomainError::Render(format!("{}: {}", page.path, e)))
    }
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_default()
}

fn date_range(series: &Series) -> String {
    match (series.start_date, series.end_date) {
        (Some(start), Some(end)) if start == end => fmt_date(Some(start)),
        (Some(_), Some(_)) => format!("{} - {}", fmt_date(series.start_date), fmt_date(series.end_date)),
        (Some(_), None) => format!("{} - in progress", fmt_date(series.start_date)),
        (None, _) => String::new(),
    }
}

#[derive(Serialize)]
struct SeriesView {
    href: String,
    title: String,
    dates: String,
    messages: usize,
}

fn series_views(entries: &[SeriesEntry]) -> Vec<SeriesView> {
    entries
        .iter()
        .map(|entry| SeriesView {
            href: Page::series_path(&entry.series),
            title: entry.series.title.clone().unwrap_or_default(),
            dates: date_range(&entry.series),
            messages: entry.visible_messages,
        })
        .collect()
}

#[derive(Serialize)]
struct DetailView {
    cover_image: Option<String>,
    dates: String,
    speakers: String,
    description: Option<String>,
    resources: Vec<ResourceView>,
    booklets: Vec<ResourceView>,
}

impl DetailView {
    fn new(series: &Series) -> Self {
        Self {
            cover_image: series.cover_image_link.as_ref().map(|u| u.to_string()),
            dates: date_range(series),
            speakers: series.speakers.join(", "),
            description: series.description.clone(),
            resources: resource_views(&series.resources),
            booklets: resource_views(&series.booklets),
        }
    }
}

#[derive(Serialize)]
struct MessageView {
    track: Option<u32>,
    date: String,
    title: String,
    description: Option<String>,
    speakers: String,
    audio: Option<String>,
    video: Option<String>,
    resources: Vec<ResourceView>,
}

fn message_views(messages: &[Arc<Message>], series: Option<&Series>) -> Vec<MessageView> {
    messages
        .iter()
        .map(|message| MessageView {
            track: series
                .and_then(|s| s.title.as_deref())
                .and_then(|t| message.track_number(t)),
            date: fmt_date(message.date),
            title: message.title.clone().unwrap_or_default(),
            description: message.description.clone(),
            speakers: message.speakers.join(", "),
            audio: message.audio_link.as_ref().map(|u| u.to_string()),
            video: message.video_link.as_ref().map(|u| u.to_string()),
            resources: resource_views(&message.resources),
        })
        .collect()
}

#[derive(Serialize)]
struct ResourceView {
    name: String,
    link: String,
    /// "message (series)", "message" or "series".
    source: Option<String>,
}

fn resource_views(list: &[Resource]) -> Vec<ResourceView> {
    list.iter()
        .map(|resource| {
            let from_message = resource.source.message.as_ref().and_then(|m| m.title.as_deref());
            let from_series = resource.source.series.as_ref().and_then(|s| s.title.as_deref());
            let source = match (from_message, from_series) {
                (Some(m), Some(s)) => Some(format!("{} ({})", m, s)),
                (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
                (None, None) => None,
            };
            ResourceView {
                name: resource.name.clone(),
                link: resource.link.to_string(),
                source,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccessLevel, CatalogFilter, FilterChain, SeriesRef};

    fn renderer() -> HtmlRenderer {
        HtmlRenderer::new(PageTemplate::default(), Some("wol".into())).unwrap()
    }

    fn public() -> FilterChain {
        FilterChain::new().with(CatalogFilter::visibility(AccessLevel::Public))
    }

    #[test]
    fn test_text_is_escaped() {
        let page = Page::new(
            "resources.html",
            "Q&A <script>",
            PageBody::ResourceList(vec![Resource::parse("<b>Notes</b>|http://example.com/notes.pdf").unwrap()]),
        );
        let html = renderer().render(&page).unwrap();
        assert!(html.contains("<title>Q&amp;A &lt;script&gt;</title>"));
        assert!(html.contains("&lt;b&gt;Notes&lt;"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_series_index_links_detail_pages() {
        let mut series = Series::new("S1", "Acts & Facts");
        series.start_date = NaiveDate::from_ymd_opt(2015, 3, 1);
        series.visibility = Some(AccessLevel::Public);
        let entry = SeriesEntry::new(Arc::new(series), &public());
        let page = Page::new("index.html", "Catalog", PageBody::series_index(vec![entry]));

        let html = renderer().render(&page).unwrap();
        assert!(html.contains(r#"<body class="wol">"#));
        assert!(html.contains(r#"s1.html">Acts &amp; Facts</a>"#));
        assert!(html.contains("Mar 1, 2015 - in progress"));
        assert!(!html.contains("Current and recent series"));
    }

    #[test]
    fn test_index_counts_only_visible_members() {
        let mut open = Message::new("Open", NaiveDate::from_ymd_opt(2015, 3, 1));
        open.visibility = Some(AccessLevel::Public);
        let mut closed = Message::new("Closed", NaiveDate::from_ymd_opt(2015, 3, 8));
        closed.visibility = Some(AccessLevel::Private);
        let mut series = Series::new("S1", "Mixed");
        series.visibility = Some(AccessLevel::Public);
        series.messages = vec![Arc::new(open), Arc::new(closed)];
        let series = Arc::new(series);

        let page = Page::new(
            "index.html",
            "Catalog",
            PageBody::SeriesIndex {
                promo: vec![SeriesEntry::new(Arc::clone(&series), &public())],
                series: vec![SeriesEntry::new(series, &public())],
            },
        );
        let html = renderer().render(&page).unwrap();
        assert!(html.contains(r#"<span class="count">1 messages</span>"#));
        assert!(!html.contains("2 messages"));
        assert!(html.contains(r#"<ul class="series-promo">"#));
    }

    #[test]
    fn test_series_detail_shows_tracks() {
        let mut msg = Message::new("Easter", NaiveDate::from_ymd_opt(2015, 4, 5));
        msg.set_series(["Hope"]);
        msg.track_numbers = vec![3];
        msg.audio_link = url::Url::parse("http://example.com/easter.mp3").ok();
        let msg = Arc::new(msg);
        let mut series = Series::new("H", "Hope");
        series.messages = vec![Arc::clone(&msg)];
        let series = Arc::new(series);

        let page = Page::new(
            "series/h.html",
            "Hope",
            PageBody::SeriesDetail {
                series,
                messages: vec![msg],
            },
        );
        let html = renderer().render(&page).unwrap();
        assert!(html.contains(r#"<td class="track">3</td>"#));
        assert!(html.contains(r#"<a class="audio" href="#));
        assert!(html.contains("easter.mp3"));
    }

    #[test]
    fn test_resource_list_shows_source() {
        let resource = Resource::parse("Guide|http://example.com/guide.pdf")
            .unwrap()
            .with_series(SeriesRef {
                id: Some("S1".into()),
                title: Some("Acts".into()),
            });
        let page = Page::new("resources.html", "Resources", PageBody::ResourceList(vec![resource]));
        let html = renderer().render(&page).unwrap();
        assert!(html.contains(r#"<span class="source">from Acts</span>"#));
    }

    #[test]
    fn test_custom_wrapper() {
        let template = PageTemplate::parse("<main class=\"{{ skin }}\">{{ content }}</main>").unwrap();
        let renderer = HtmlRenderer::new(template, None).unwrap();
        let page = Page::new("booklets.html", "Booklets", PageBody::ResourceList(vec![]));
        let html = renderer.render(&page).unwrap();
        assert!(html.starts_with(r#"<main class="catalog"><div class="catalog resource_list">"#));
        assert!(html.contains(r#"<p class="empty">No resources.</p>"#));
    }
}
