use url::form_urlencoded;
use uuid::Uuid;

/// Transparent 1x1 GIF served by the open-tracking endpoint.
pub const TRACKING_PIXEL_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xff, 0xff, 0xff, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x01, 0x44, 0x00, 0x3b,
];

pub fn open_pixel_url(base_url: &str, message_id: Uuid) -> String {
    format!(
        "{}/api/v1/track/open/{}",
        base_url.trim_end_matches('/'),
        message_id
    )
}

pub fn click_url(base_url: &str, message_id: Uuid, target: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!(
        "{}/api/v1/track/click/{}?url={}",
        base_url.trim_end_matches('/'),
        message_id,
        encoded
    )
}

/// Generated bodies are plain text; mail clients want markup.
pub fn plain_text_to_html(body: &str) -> String {
    body.replace('\n', "<br>")
}

/// Rewrites every absolute link through the click redirect and appends the
/// open pixel. Relative and mailto targets stay untouched.
pub fn instrument_html(html: &str, base_url: &str, message_id: Uuid) -> String {
    let mut instrumented = rewrite_links(html, base_url, message_id);
    instrumented.push_str(&format!(
        "<img src=\"{}\" width=\"1\" height=\"1\" style=\"display:none\" alt=\"\"/>",
        open_pixel_url(base_url, message_id)
    ));
    instrumented
}

fn rewrite_links(html: &str, base_url: &str, message_id: Uuid) -> String {
    const MARKER: &str = "href=\"";

    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find(MARKER) {
        let after = &rest[start + MARKER.len()..];
        let Some(end) = after.find('"') else {
            break;
        };
        let target = &after[..end];

        out.push_str(&rest[..start + MARKER.len()]);
        if target.starts_with("http://") || target.starts_with("https://") {
            out.push_str(&click_url(base_url, message_id, target));
        } else {
            out.push_str(target);
        }
        out.push('"');
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_URL: &str = "https://app.outreach.test";

    #[test]
    fn pixel_is_a_one_by_one_gif() {
        assert_eq!(&TRACKING_PIXEL_GIF[..6], b"GIF89a");
        assert_eq!(TRACKING_PIXEL_GIF.len(), 42);
        assert_eq!(*TRACKING_PIXEL_GIF.last().unwrap(), 0x3b);
    }

    #[test]
    fn absolute_links_are_rewritten_through_the_click_redirect() {
        let message_id = Uuid::new_v4();
        let html = r#"<p>See <a href="https://acme.io/pricing?ref=1">pricing</a></p>"#;

        let instrumented = instrument_html(html, BASE_URL, message_id);

        let expected_prefix = format!("{}/api/v1/track/click/{}?url=", BASE_URL, message_id);
        assert!(instrumented.contains(&expected_prefix));
        assert!(instrumented.contains("https%3A%2F%2Facme.io%2Fpricing%3Fref%3D1"));
        assert!(!instrumented.contains(r#"href="https://acme.io/pricing?ref=1""#));
    }

    #[test]
    fn relative_and_mailto_links_are_left_alone() {
        let message_id = Uuid::new_v4();
        let html = r##"<a href="/unsubscribe">out</a> <a href="mailto:me@acme.io">mail</a>"##;

        let instrumented = instrument_html(html, BASE_URL, message_id);

        assert!(instrumented.contains(r#"href="/unsubscribe""#));
        assert!(instrumented.contains(r#"href="mailto:me@acme.io""#));
        assert!(!instrumented.contains("track/click"));
    }

    #[test]
    fn pixel_is_appended_exactly_once() {
        let message_id = Uuid::new_v4();
        let instrumented = instrument_html("<p>Hello</p>", BASE_URL, message_id);

        let pixel_src = format!("{}/api/v1/track/open/{}", BASE_URL, message_id);
        assert_eq!(instrumented.matches(&pixel_src).count(), 1);
        assert!(instrumented.starts_with("<p>Hello</p><img src="));
        assert!(instrumented.ends_with(r#"style="display:none" alt=""/>"#));
    }

    #[test]
    fn plain_text_newlines_become_line_breaks() {
        assert_eq!(
            plain_text_to_html("Hi Jordan,\n\nQuick note."),
            "Hi Jordan,<br><br>Quick note."
        );
    }

    #[test]
    fn trailing_slash_on_base_url_does_not_double_up() {
        let message_id = Uuid::new_v4();
        let instrumented = instrument_html("<p>x</p>", "https://app.outreach.test/", message_id);

        assert!(!instrumented.contains(".test//api"));
    }

    #[test]
    fn every_absolute_link_gets_its_own_redirect() {
        let message_id = Uuid::new_v4();
        let html = r#"<a href="https://a.io">a</a><a href="http://b.io">b</a>"#;

        let instrumented = instrument_html(html, BASE_URL, message_id);

        assert_eq!(instrumented.matches("track/click").count(), 2);
        assert!(instrumented.contains("https%3A%2F%2Fa.io"));
        assert!(instrumented.contains("http%3A%2F%2Fb.io"));
    }
}
