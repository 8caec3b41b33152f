//! `Gallery:` directive
//!
//! A line such as `Gallery: wiring.png, enclosure.jpg` in a markdown body is
//! replaced by a gallery block plus its lightbox. Images are looked up under
//! the media directory of the document's project (or the blog).

use lazy_static::lazy_static;
use regex::Regex;

use super::ContentKind;
use crate::helpers::html_escape;

lazy_static! {
    static ref GALLERY_LINE: Regex = Regex::new(r"^\s*Gallery:\s*(.*?)\s*$").unwrap();
}

/// One image of a gallery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImage {
    pub filename: String,
    pub path: String,
    pub alt: String,
}

/// URL prefix under which a document's images are served
pub fn media_base(kind: ContentKind, group_key: Option<&str>) -> String {
    match (kind, group_key) {
        (ContentKind::Project, Some(key)) => format!("/media/projects/{}", key),
        _ => "/media/blog".to_string(),
    }
}

/// Parse the comma separated file list of a directive
pub fn parse_gallery_list(list: &str, base: &str) -> Vec<GalleryImage> {
    list.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(|filename| GalleryImage {
            filename: filename.to_string(),
            path: format!("{}/{}", base, filename),
            alt: alt_text(filename),
        })
        .collect()
}

/// File name without extension, `-` and `_` turned into spaces
fn alt_text(filename: &str) -> String {
    let stem = match filename.rfind('.') {
        Some(pos) if pos > 0 && !filename[pos..].contains('/') => &filename[..pos],
        _ => filename,
    };
    stem.replace(['-', '_'], " ")
}

/// Gallery markup for `images`. No blank lines, so markdown keeps it as a
/// single raw HTML block.
pub fn render_gallery(images: &[GalleryImage], id: &str) -> String {
    if images.is_empty() {
        return String::new();
    }

    let id = html_escape(id);
    let mut out = format!(r#"<div class="gallery" id="{}">"#, id);
    out.push('\n');
    for (index, img) in images.iter().enumerate() {
        let path = html_escape(&img.path);
        out.push_str(&format!(
            concat!(
                r#"<div class="gallery-item">"#,
                r#"<a href="{path}" class="gallery-link" data-gallery="{id}" data-index="{index}">"#,
                r#"<div class="gallery-image-wrapper">"#,
                r#"<img src="{path}" alt="{alt}" loading="lazy" class="gallery-image">"#,
                r#"<div class="gallery-overlay"><span class="gallery-icon">&#128269;</span></div>"#,
                r#"</div></a></div>"#,
                "\n"
            ),
            path = path,
            id = id,
            index = index,
            alt = html_escape(&img.alt),
        ));
    }
    out.push_str("</div>\n");

    out.push_str(&format!(
        concat!(
            r#"<div class="gallery-lightbox" id="lightbox-{id}">"#,
            "\n",
            r#"<button class="lightbox-close" onclick="closeLightbox('{id}')">&times;</button>"#,
            "\n",
            r#"<button class="lightbox-prev" onclick="navigateLightbox('{id}', -1)">&#10094;</button>"#,
            "\n",
            r#"<button class="lightbox-next" onclick="navigateLightbox('{id}', 1)">&#10095;</button>"#,
            "\n",
            r#"<div class="lightbox-content"><img src="" alt="" id="lightbox-image-{id}"></div>"#,
            "\n",
            r#"<div class="lightbox-caption" id="lightbox-caption-{id}"></div>"#,
            "\n",
            "</div>"
        ),
        id = id
    ));
    out
}

/// Replace every `Gallery:` line outside fenced code with gallery markup.
///
/// Ids count from `gallery-0` for each call, one per emitted gallery.
pub fn expand_directives(markdown: &str, base: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut counter = 0usize;
    let mut fence: Option<(char, usize)> = None;

    for line in markdown.split_inclusive('\n') {
        let trimmed = line.trim_start();

        if let Some((ch, len)) = fence_marker(trimmed) {
            match fence {
                None => fence = Some((ch, len)),
                Some((open, open_len)) if open == ch && len >= open_len => {
                    if trimmed.trim_end().chars().all(|c| c == ch) {
                        fence = None;
                    }
                }
                Some(_) => {}
            }
            out.push_str(line);
            continue;
        }

        if fence.is_none() {
            if let Some(caps) = GALLERY_LINE.captures(line.trim_end_matches(['\n', '\r'])) {
                let images = parse_gallery_list(&caps[1], base);
                if !images.is_empty() {
                    let html = render_gallery(&images, &format!("gallery-{}", counter));
                    counter += 1;
                    out.push('\n');
                    out.push_str(&html);
                    out.push_str("\n\n");
                    continue;
                }
            }
        }

        out.push_str(line);
    }

    out
}

/// `(fence char, run length)` when the line opens or closes a code fence
fn fence_marker(line: &str) -> Option<(char, usize)> {
    let ch = line.chars().next()?;
    if ch != '`' && ch != '~' {
        return None;
    }
    let len = line.chars().take_while(|&c| c == ch).count();
    (len >= 3).then_some((ch, len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_base() {
        assert_eq!(
            media_base(ContentKind::Project, Some("weather-station")),
            "/media/projects/weather-station"
        );
        assert_eq!(media_base(ContentKind::Blog, None), "/media/blog");
    }

    #[test]
    fn test_parse_gallery_list() {
        let images = parse_gallery_list(" wiring-diagram.png, , front_panel.v2.jpg ", "/media/blog");
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].path, "/media/blog/wiring-diagram.png");
        assert_eq!(images[0].alt, "wiring diagram");
        assert_eq!(images[1].alt, "front panel.v2");
    }

    #[test]
    fn test_render_gallery_structure() {
        let images = parse_gallery_list("a.png, b.png", "/media/blog");
        let html = render_gallery(&images, "gallery-0");
        assert!(html.starts_with(r#"<div class="gallery" id="gallery-0">"#));
        assert!(html.contains(r#"data-gallery="gallery-0" data-index="1""#));
        assert!(html.contains(r#"id="lightbox-gallery-0""#));
        assert!(html.contains("closeLightbox('gallery-0')"));
        assert!(html.contains("navigateLightbox('gallery-0', -1)"));
        assert!(html.contains(r#"id="lightbox-image-gallery-0""#));
        assert!(html.contains(r#"id="lightbox-caption-gallery-0""#));
        assert!(!html.contains("\n\n"));
        assert!(render_gallery(&[], "gallery-0").is_empty());
    }

    #[test]
    fn test_expand_numbers_galleries_per_document() {
        let md = "Intro\n\nGallery: a.png\n\nMiddle\n\nGallery: b.png, c.png\n";
        let out = expand_directives(md, "/media/projects/p");
        assert!(out.contains(r#"id="gallery-0""#));
        assert!(out.contains(r#"id="gallery-1""#));
        assert!(!out.contains("Gallery:"));

        // a second document starts over
        let again = expand_directives("Gallery: z.png\n", "/media/blog");
        assert!(again.contains(r#"id="gallery-0""#));
        assert!(!again.contains("gallery-1"));
    }

    #[test]
    fn test_expand_skips_fenced_code_and_empty_lists() {
        let md = "```text\nGallery: a.png\n```\n\nGallery: ,\n\n~~~\nGallery: b.png\n~~~\n";
        let out = expand_directives(md, "/media/blog");
        assert_eq!(out, md);
    }

    #[test]
    fn test_expand_escapes_file_names() {
        let out = expand_directives("Gallery: <x>.png\n", "/media/blog");
        assert!(out.contains("/media/blog/&lt;x&gt;.png"));
        assert!(!out.contains("<x>"));
    }
}
