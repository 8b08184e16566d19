//! Shared page shell: navigation, flash messages, escaping

use crate::flash::Flash;

/// Escape text for use in HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape an optional value, rendering `None` as an empty string
pub fn escape_opt(text: Option<&str>) -> String {
    text.map(escape_html).unwrap_or_default()
}

fn render_flashes(flashes: &[Flash]) -> String {
    if flashes.is_empty() {
        return String::new();
    }

    let items: String = flashes
        .iter()
        .map(|flash| {
            format!(
                r#"<div class="flash flash-{}" role="alert">{}</div>"#,
                flash.category.as_str(),
                escape_html(&flash.message)
            )
        })
        .collect();
    format!(r#"<div class="flashes">{}</div>"#, items)
}

/// Wrap page content in the common document shell.
///
/// `body_attrs` is inserted verbatim into the `<body>` tag and must already
/// be escaped.
pub fn render_page(title: &str, flashes: &[Flash], body_attrs: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} | Composer Catalog</title>
    <link rel="stylesheet" href="/static/catalog.css">
</head>
<body{body_attrs}>
    <header>
        <nav>
            <a href="/">Home</a>
            <a href="/index">Catalog</a>
            <a href="/index/add">Add</a>
            <a href="/scales">Scales</a>
            <a href="/composer">Composer</a>
        </nav>
    </header>
    <main>
        {flashes}
        {content}
    </main>
    <footer>composer-catalog v{version}</footer>
</body>
</html>
"#,
        title = escape_html(title),
        body_attrs = body_attrs,
        flashes = render_flashes(flashes),
        content = content,
        version = env!("CARGO_PKG_VERSION"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flash::FlashCategory;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_opt(None), "");
    }

    #[test]
    fn test_flashes_rendered_escaped_with_category() {
        let html = render_page(
            "Test",
            &[Flash::new(FlashCategory::Error, "<bad>")],
            "",
            "<p>content</p>",
        );
        assert!(html.contains(r#"class="flash flash-error""#));
        assert!(html.contains("&lt;bad&gt;"));
        assert!(html.contains("<p>content</p>"));
    }
}
