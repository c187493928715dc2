use std::io::Cursor;
use std::sync::Arc;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::content::Content;
use crate::text_utils::rfc2822;

/* Example
<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
<channel>
  <title>Notes</title>
  <link>https://example.com/</link>
  <description>Things I write down</description>
  <language>en</language>
  <item>
    <title>Creating a daemon in systemd</title>
    <link>https://example.com/posts/creating-a-daemon/</link>
    <guid isPermaLink="true">https://example.com/posts/creating-a-daemon/</guid>
    <description><![CDATA[<p>So, you created your awesome server-side application</p>]]></description>
    <pubDate>Fri, 16 Feb 2024 08:00:00 +0000</pubDate>
  </item>
</channel>
</rss>
*/

pub struct RssChannel<'a> {
    pub ch_title: &'a str,
    /// Absolute url of the site root, including the path prefix
    pub ch_link: &'a str,
    /// Path prefix every content link starts with
    pub ch_prefix: &'a str,
    pub ch_desc: &'a str,
    pub ch_language: &'a str,
}

impl RssChannel<'_> {
    /// `contents` must already be newest first and cut to the feed size.
    pub fn render(&self, contents: &[Arc<Content>]) -> quick_xml::Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        writer.write_event(Event::Start(rss))?;
        writer.write_event(Event::Start(BytesStart::new("channel")))?;

        push_text(&mut writer, "title", self.ch_title)?;
        push_text(&mut writer, "link", self.ch_link)?;
        push_text(&mut writer, "description", self.ch_desc)?;
        push_text(&mut writer, "language", self.ch_language)?;

        if let Some(newest) = contents.first() {
            push_text(&mut writer, "lastBuildDate", &rfc2822(&newest.header.date))?;
        }

        for content in contents {
            writer.write_event(Event::Start(BytesStart::new("item")))?;

            push_text(&mut writer, "title", &content.header.title)?;

            let link = full_link(self.ch_link, self.ch_prefix, &content.link);
            push_text(&mut writer, "link", &link)?;

            let mut guid_elem = BytesStart::new("guid");
            guid_elem.push_attribute(("isPermaLink", "true"));
            writer.write_event(Event::Start(guid_elem))?;
            writer.write_event(Event::Text(BytesText::new(&link)))?;
            writer.write_event(Event::End(BytesEnd::new("guid")))?;

            let description = match content.header.description {
                Some(ref description) => description.as_str(),
                None => content.excerpt.as_str(),
            };
            push_cdata(&mut writer, "description", description)?;

            for tag in content.header.tags.iter() {
                push_text(&mut writer, "category", tag)?;
            }

            push_text(&mut writer, "pubDate", &rfc2822(&content.header.date))?;

            writer.write_event(Event::End(BytesEnd::new("item")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("channel")))?;
        writer.write_event(Event::End(BytesEnd::new("rss")))?;

        Ok(writer.into_inner().into_inner())
    }
}

/// Absolute url of a site link, on the same base as the channel link
fn full_link(site_link: &str, prefix: &str, link: &str) -> String {
    let rel = link.strip_prefix(prefix).unwrap_or_else(|| link.trim_start_matches('/'));
    format!("{}/{}", site_link.trim_end_matches('/'), rel)
}

fn push_text(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn push_cdata(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    if text.contains("]]>") {
        let new_text = text.replace("]]>", "]] >");
        writer.write_event(Event::CData(BytesCData::new(&new_text)))?;
    } else {
        writer.write_event(Event::CData(BytesCData::new(text)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}
