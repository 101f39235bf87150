use std::{fs, path::Path};

use eyre::{Context as _, Result};

/// Wrap an SVG chart into a standalone HTML document.
pub fn html(title: &str, svg: &str) -> String {
    let title = escape(title);

    format!(
        "<!DOCTYPE html>\n\
        <html lang=\"en\">\n\
        <head>\n\
        <meta charset=\"utf-8\">\n\
        <title>{title}</title>\n\
        <style>body {{ margin: 0; font-family: sans-serif; }} \
        main {{ display: flex; justify-content: center; }} \
        svg {{ max-width: 100%; height: auto; }}</style>\n\
        </head>\n\
        <body>\n\
        <main>\n\
        {svg}\n\
        </main>\n\
        </body>\n\
        </html>\n"
    )
}

pub fn write(path: &Path, title: &str, svg: &str) -> Result<()> {
    fs::write(path, html(title, svg))
        .with_context(|| format!("failed to write report `{}`", path.display()))
}

fn escape(text: &str) -> String {
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
