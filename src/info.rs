//! HTML shown in a place's info window.

use crate::place::Place;

/// Renders the info window of `place`: its title, its address lines and nearby venues.
pub fn content(place: &Place) -> String {
    let mut html = String::new();
    html.push_str("<h3>");
    escape_into(&place.title, &mut html);
    html.push_str("</h3>");

    if !place.formatted_address.is_empty() {
        html.push_str("<div>");
        for (i, line) in place.formatted_address.iter().enumerate() {
            if i > 0 {
                html.push_str("<br>");
            }
            escape_into(line, &mut html);
        }
        html.push_str("</div>");
    }

    if !place.venues.is_empty() {
        html.push_str("<ul>");
        for venue in &place.venues {
            html.push_str("<li>");
            escape_into(&venue.name, &mut html);
            if !venue.categories.is_empty() {
                html.push_str(" <small>");
                escape_into(&venue.categories.join(", "), &mut html);
                html.push_str("</small>");
            }
            html.push_str("</li>");
        }
        html.push_str("</ul>");
    } else if let Some(ref e) = place.lookup_error {
        html.push_str("<div class=\"error\">Venues unavailable: ");
        escape_into(e, &mut html);
        html.push_str("</div>");
    }

    html
}

fn escape_into(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}
