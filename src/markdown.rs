use crate::link;
use pulldown_cmark::*;

/// Converts markdown to HTML, appending the result to `out`. Relative links
/// to other markdown files are pointed at their rendered `.html` outputs.
pub fn to_html(out: &mut String, markdown: &str) {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    html::push_html(out, Parser::new_ext(markdown, options).map(convert));
}

fn convert_tag(tag: Tag) -> Tag {
    match tag {
        Tag::Link(
            link_type @ (LinkType::Inline
            | LinkType::Reference
            | LinkType::ReferenceUnknown
            | LinkType::Shortcut
            | LinkType::Collapsed
            | LinkType::CollapsedUnknown),
            dest,
            title,
        ) => Tag::Link(
            link_type,
            CowStr::Boxed(link::convert(&dest).into_boxed_str()),
            title,
        ),
        _ => tag,
    }
}

fn convert(ev: Event) -> Event {
    match ev {
        Event::Start(tag) => Event::Start(convert_tag(tag)),
        _ => ev,
    }
}
