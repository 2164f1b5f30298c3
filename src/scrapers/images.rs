//! Image URL resolution across lazy-loading conventions.
//!
//! Newspaper templates rarely put the real image in `src`: the visible value is
//! often a base64 placeholder while the real URL sits in a `data-*` attribute
//! or a `srcset`. [`resolve_image_url`] checks the known conventions in a fixed
//! order and [`normalize_url`] turns whatever it found into an absolute URL.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use url::Url;

static IMG_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("static selector"));
static PICTURE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("picture").expect("static selector"));
static SOURCE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("source").expect("static selector"));

const DATA_URI_PREFIX: &str = "data:image";

/// Find the best image URL inside an article element.
///
/// Resolution order, first usable value wins:
///
/// 1. `data-src` of the first `<img>`
/// 2. `data-original` of the first `<img>`
/// 3. first candidate of the first `<img>`'s `srcset`
/// 4. first candidate of the `srcset` on the first `<source>` of the first `<picture>`
/// 5. `src` of the first `<img>`
///
/// Empty values and `data:image` placeholders are skipped, except in rule 4
/// which returns whatever candidate it finds.
///
/// The returned URL is raw; pass it through [`normalize_url`].
pub fn resolve_image_url(article: ElementRef<'_>) -> Option<String> {
    let img = article.select(&IMG_SELECTOR).next();
    let img_attr = |name: &str| img.and_then(|el| el.value().attr(name));

    if let Some(url) = img_attr("data-src").and_then(real_image) {
        return Some(url.to_string());
    }
    if let Some(url) = img_attr("data-original").and_then(real_image) {
        return Some(url.to_string());
    }
    if let Some(url) = img_attr("srcset")
        .and_then(first_srcset_candidate)
        .and_then(real_image)
    {
        return Some(url.to_string());
    }

    // <picture> sources are taken as-is, placeholders included.
    if let Some(picture) = article.select(&PICTURE_SELECTOR).next() {
        if let Some(url) = picture
            .select(&SOURCE_SELECTOR)
            .next()
            .and_then(|source| source.value().attr("srcset"))
            .and_then(first_srcset_candidate)
        {
            return Some(url.to_string());
        }
    }

    img_attr("src").and_then(real_image).map(str::to_string)
}

/// Make a scraped URL absolute.
///
/// - `//host/path` gets an `https:` scheme
/// - anything starting with `http` is returned unchanged
/// - everything else is prefixed with the scheme and host of `origin`
///
/// The prefix is plain concatenation: the path is kept byte for byte, with no
/// dot-segment removal or percent-encoding. A path without a leading `/` gets
/// one.
///
/// # Arguments
///
/// * `raw` - URL as found in the page
/// * `origin` - site the page belongs to; only its scheme and host are used
pub fn normalize_url(raw: &str, origin: &Url) -> String {
    if raw.starts_with("//") {
        format!("https:{raw}")
    } else if raw.starts_with("http") {
        raw.to_string()
    } else {
        let origin = origin.origin().ascii_serialization();
        let slash = if raw.starts_with('/') { "" } else { "/" };
        format!("{origin}{slash}{raw}")
    }
}

/// URL part of the first comma-separated `srcset` candidate.
fn first_srcset_candidate(srcset: &str) -> Option<&str> {
    srcset
        .split(',')
        .next()
        .and_then(|candidate| candidate.split_whitespace().next())
}

fn real_image(value: &str) -> Option<&str> {
    (!value.is_empty() && !value.starts_with(DATA_URI_PREFIX)).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const PLACEHOLDER: &str = "data:image/gif;base64,R0lGODlhAQABAAAAACw=";

    fn resolve(fragment: &str) -> Option<String> {
        let html = Html::parse_fragment(&format!("<article>{fragment}</article>"));
        let selector = Selector::parse("article").unwrap();
        let article = html.select(&selector).next().unwrap();
        resolve_image_url(article)
    }

    fn origin() -> Url {
        Url::parse("https://www.dawn.com").unwrap()
    }

    #[test]
    fn test_prefers_data_src_over_src() {
        let url = resolve(r#"<img data-src="/lazy.jpg" src="/plain.jpg">"#);
        assert_eq!(url.as_deref(), Some("/lazy.jpg"));
    }

    #[test]
    fn test_rejects_data_uri_data_src() {
        let url = resolve(&format!(
            r#"<img data-src="{PLACEHOLDER}" data-original="/original.jpg" src="/plain.jpg">"#
        ));
        assert_eq!(url.as_deref(), Some("/original.jpg"));
    }

    #[test]
    fn test_uses_first_srcset_candidate() {
        let url = resolve(
            r#"<img src="/small.jpg" srcset="/a-480.jpg 480w, /a-800.jpg 800w">"#,
        );
        assert_eq!(url.as_deref(), Some("/a-480.jpg"));
    }

    #[test]
    fn test_placeholder_srcset_falls_through_to_picture() {
        let url = resolve(&format!(
            r#"<picture><source srcset="//cdn.example.com/p.webp 1x"><img srcset="{PLACEHOLDER} 1x" src="/plain.jpg"></picture>"#
        ));
        assert_eq!(url.as_deref(), Some("//cdn.example.com/p.webp"));
    }

    #[test]
    fn test_picture_source_keeps_data_uri() {
        let url = resolve(&format!(
            r#"<picture><source srcset="{PLACEHOLDER} 1x"></picture><img src="/plain.jpg">"#
        ));
        // The comma inside the data URI ends the first srcset candidate.
        assert_eq!(url.as_deref(), Some("data:image/gif;base64"));
    }

    #[test]
    fn test_falls_back_to_src() {
        assert_eq!(resolve(r#"<img src="/plain.jpg">"#).as_deref(), Some("/plain.jpg"));
    }

    #[test]
    fn test_no_image() {
        assert_eq!(resolve("<h2><a href=\"/x\">Title</a></h2>"), None);
        assert_eq!(resolve(&format!(r#"<img src="{PLACEHOLDER}">"#)), None);
        assert_eq!(resolve(r#"<img data-src="" src="">"#), None);
    }

    #[test]
    fn test_only_first_img_is_considered() {
        let url = resolve(r#"<img alt="no source"><img src="/second.jpg">"#);
        assert_eq!(url, None);
    }

    #[test]
    fn test_normalize_protocol_relative() {
        assert_eq!(
            normalize_url("//cdn.example.com/x.jpg", &origin()),
            "https://cdn.example.com/x.jpg"
        );
    }

    #[test]
    fn test_normalize_root_relative() {
        assert_eq!(
            normalize_url("/images/a.jpg", &origin()),
            "https://www.dawn.com/images/a.jpg"
        );
    }

    #[test]
    fn test_normalize_keeps_relative_path_verbatim() {
        assert_eq!(
            normalize_url("/news/a b/../c?x=1", &origin()),
            "https://www.dawn.com/news/a b/../c?x=1"
        );
    }

    #[test]
    fn test_normalize_path_without_leading_slash() {
        assert_eq!(
            normalize_url("images/a.jpg", &origin()),
            "https://www.dawn.com/images/a.jpg"
        );
        let page = Url::parse("https://www.dawn.com/newspaper/front-page/2013-01-02").unwrap();
        assert_eq!(normalize_url("images/a.jpg", &page), "https://www.dawn.com/images/a.jpg");
    }

    #[test]
    fn test_normalize_absolute_unchanged() {
        assert_eq!(
            normalize_url("https://cdn.example.com/b.jpg", &origin()),
            "https://cdn.example.com/b.jpg"
        );
        assert_eq!(
            normalize_url("http://cdn.example.com/b.jpg", &origin()),
            "http://cdn.example.com/b.jpg"
        );
    }
}
