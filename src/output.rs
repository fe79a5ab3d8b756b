use crate::types::RenderedItem;
use chrono::{DateTime, Utc};

const CHANNEL_LINK: &str = "https://github.com/";

/// Entity-escape the characters RSS text nodes cannot carry raw.
pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Assemble one RSS 2.0 document for a category. Items arrive in the order
/// the pipeline collected them; descriptions are already HTML and go out
/// CDATA-wrapped, everything else is escaped.
pub fn build_rss(items: &[RenderedItem], category_name: &str, now: DateTime<Utc>) -> String {
    let build_date = format_rfc2822(now);
    let channel_title = format!("日本語要約RSS - {}", category_name);
    let channel_desc = format!("{}の英語記事を日本語要約して配信します。", category_name);

    let mut out = Vec::new();
    out.push(r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string());
    out.push(r#"<rss version="2.0">"#.to_string());
    out.push("<channel>".to_string());
    out.push(format!("<title>{}</title>", xml_escape(&channel_title)));
    out.push(format!("<link>{}</link>", xml_escape(CHANNEL_LINK)));
    out.push(format!("<description>{}</description>", xml_escape(&channel_desc)));
    out.push(format!("<lastBuildDate>{}</lastBuildDate>", build_date));

    for item in items {
        out.push("<item>".to_string());
        out.push(format!("<title>{}</title>", xml_escape(&item.title)));
        out.push(format!("<link>{}</link>", xml_escape(&item.link)));
        out.push(format!(
            "<guid isPermaLink='false'>{}</guid>",
            xml_escape(&item.guid)
        ));
        out.push(format!("<pubDate>{}</pubDate>", xml_escape(&item.pub_date)));
        out.push(format!(
            "<description><![CDATA[{}]]></description>",
            item.description
        ));
        out.push("</item>".to_string());
    }

    out.push("</channel></rss>".to_string());
    out.join("\n")
}

/// RFC 2822 timestamp as RSS readers expect it.
pub fn format_rfc2822(dt: DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S %z").to_string()
}
