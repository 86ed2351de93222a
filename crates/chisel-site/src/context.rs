//! Template context for a page.

use std::collections::BTreeMap;

use chisel_config::SiteConfig;
use chisel_template::{Context, Value};

use crate::page::Page;

/// Build the context a layout is rendered with.
///
/// Custom frontmatter fields are inserted last and may shadow built-in
/// names.
#[must_use]
pub fn page_context(page: &Page, site: &SiteConfig, styles: &str) -> Context {
    let meta = &page.meta;
    let date = meta.date.clone().unwrap_or_default();
    let content_classes = meta.classes.join(" ");
    let tags_string = meta.tags.join(", ");
    let tags = Value::from(meta.tags.clone());

    let page_fields: BTreeMap<String, Value> = [
        ("title", Value::from(page.title())),
        ("date", Value::from(date.as_str())),
        ("route", Value::from(page.route.as_str())),
        ("slug", Value::from(page.slug.as_str())),
        ("layout", Value::from(meta.layout.as_str())),
        ("classes", Value::from(meta.classes.clone())),
        ("tags", tags.clone()),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_owned(), value))
    .chain(meta.fields.clone())
    .collect();

    let site_fields: Value = [
        ("name", site.name.as_str()),
        ("base_url", site.base_url.as_str()),
        ("description", site.description.as_str()),
        ("author", site.author.as_str()),
        ("language", site.language.as_str()),
    ]
    .into_iter()
    .collect();

    let mut context = Context::new()
        .with("title", page.title())
        .with("content", page.html.as_str())
        .with("styles", styles)
        .with("site_name", site.name.as_str())
        .with("base_url", site.base_url.as_str())
        .with("site_description", site.description.as_str())
        .with("site_author", site.author.as_str())
        .with("site_language", site.language.as_str())
        .with("date", date)
        .with("route", page.route.as_str())
        .with("slug", page.slug.as_str())
        .with("content_classes", content_classes)
        .with("tags", tags)
        .with("tags_string", tags_string)
        .with("page", page_fields)
        .with("site", site_fields);
    context.extend(meta.fields.clone());
    context
}
