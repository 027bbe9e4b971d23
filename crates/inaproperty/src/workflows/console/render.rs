use super::state::{status_badge, ConsoleView};

/// Path the HTML console posts decisions to.
pub const DECIDE_PATH: &str = "/admin/decide";

/// Plain-text rendering used by the command line console.
pub fn render_text(view: &ConsoleView) -> String {
    let mut out = String::new();

    let tabs: Vec<String> = view
        .tabs
        .iter()
        .map(|tab| {
            if tab.active {
                format!("[{}]", tab.label)
            } else {
                tab.label.clone()
            }
        })
        .collect();
    out.push_str(&tabs.join("  "));
    out.push('\n');

    if let Some(message) = view.empty_message {
        out.push_str(message);
        out.push('\n');
        return out;
    }

    for row in &view.rows {
        out.push_str(&format!(
            "{:<10} {}  <{}>  submitted {}",
            status_badge(row.status),
            row.title,
            row.contact,
            row.submitted_on()
        ));
        if let Some(zone) = &row.zone {
            out.push_str(&format!("  zone {zone}"));
        }
        out.push_str(&format!("  id {}", row.id));
        if !row.actions.is_empty() {
            let actions: Vec<&str> = row.actions.iter().map(|action| action.verb()).collect();
            out.push_str(&format!("  [{}]", actions.join("|")));
        }
        out.push('\n');
    }

    out
}

/// Server-rendered admin page. Actions are plain forms so the page works without scripts.
pub fn render_html(view: &ConsoleView) -> String {
    let mut html = String::from(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Admin Dashboard</title>\
         </head><body><h1>Admin Dashboard</h1><nav>",
    );

    for tab in &view.tabs {
        let class = if tab.active { " class=\"active\"" } else { "" };
        html.push_str(&format!(
            "<a href=\"/admin?tab={}\"{}>{}</a> ",
            tab.kind.slug(),
            class,
            escape_html(&tab.label)
        ));
    }
    html.push_str("</nav>");

    if let Some(message) = view.empty_message {
        html.push_str(&format!("<p>{}</p>", escape_html(message)));
    } else {
        html.push_str("<ul>");
        for row in &view.rows {
            html.push_str(&format!(
                "<li><h3>{}</h3><p>{}</p><p>Submitted: {}</p>",
                escape_html(&row.title),
                escape_html(&row.contact),
                row.submitted_on()
            ));
            if let Some(zone) = &row.zone {
                html.push_str(&format!("<p>Zone: {}</p>", escape_html(zone)));
            }
            html.push_str(&format!(
                "<span class=\"status status-{}\">{}</span>",
                row.status.label(),
                status_badge(row.status)
            ));
            for action in &row.actions {
                html.push_str(&format!(
                    "<form method=\"post\" action=\"{DECIDE_PATH}\">\
                     <input type=\"hidden\" name=\"kind\" value=\"{}\">\
                     <input type=\"hidden\" name=\"id\" value=\"{}\">\
                     <input type=\"hidden\" name=\"decision\" value=\"{}\">\
                     <button type=\"submit\">{}</button></form>",
                    row.kind.slug(),
                    escape_html(&row.id.0),
                    action.verb(),
                    capitalize(action.verb())
                ));
            }
            html.push_str("</li>");
        }
        html.push_str("</ul>");
    }

    html.push_str("</body></html>");
    html
}

fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_neutralises_markup() {
        assert_eq!(
            escape_html("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn capitalize_handles_verbs() {
        assert_eq!(capitalize("approve"), "Approve");
        assert_eq!(capitalize(""), "");
    }
}
