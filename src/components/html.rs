// Minimal templating: {{name}} placeholders filled with already-rendered text.

const LAYOUT_TEMPLATE: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/layout.html"));

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |html, (name, value)| {
        html.replace(&format!("{{{{{}}}}}", name), value)
    })
}

// Full document around a rendered header and page body
pub fn layout(title: &str, header: &str, content: &str) -> String {
    let title = escape(title);
    fill(
        LAYOUT_TEMPLATE,
        &[("title", title.as_str()), ("header", header), ("content", content)],
    )
}

// Empty string when the condition is false, handy for optional attributes
pub fn when(condition: bool, text: &str) -> &str {
    if condition { text } else { "" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn layout_wraps_fragments() {
        let html = layout("My Account", "<header></header>", "<h1>x</h1>");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>My Account - MusicConnect</title>"));
        assert!(html.contains("<h1>x</h1>"));
    }

    #[test]
    fn fills_every_occurrence() {
        let html = fill(
            "<p>{{name}}</p><i>{{name}}</i>{{other}}",
            &[("name", "x"), ("other", "y")],
        );
        assert_eq!(html, "<p>x</p><i>x</i>y");
    }
}
