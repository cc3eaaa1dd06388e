//! Single post pages: type marker, title and direct image address

use scraper::Html;
use url::Url;

use super::selector;
use crate::config::SourceConfig;
use crate::error::Result;

/// Compiled selectors for reading a post page
pub struct PostPageSelectors {
    marker: scraper::Selector,
    title: scraper::Selector,
    image: scraper::Selector,
}

impl PostPageSelectors {
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            marker: selector(&config.marker_selector)?,
            title: selector(&config.title_selector)?,
            image: selector(&config.image_selector)?,
        })
    }
}

/// What a post page turned out to hold
#[derive(Debug, Clone, PartialEq)]
pub enum PostPage {
    /// Exactly one image item
    SingleImage { title: String, image_url: Url },
    /// No marker (animated) or several (album/gallery)
    Unsupported { markers: usize },
    /// One marker but no title or image element to go with it
    Incomplete(&'static str),
}

/// Classify a post page and pull out its title and image address
///
/// Protocol-relative image addresses such as `//i.imgur.com/abc.jpg` always
/// become `https:`; other relative addresses resolve against `page_url`.
pub fn parse_post_page(html: &str, page_url: &Url, selectors: &PostPageSelectors) -> PostPage {
    let document = Html::parse_document(html);

    let markers = document.select(&selectors.marker).count();
    if markers != 1 {
        return PostPage::Unsupported { markers };
    }

    let Some(title) = document
        .select(&selectors.title)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
    else {
        return PostPage::Incomplete("title");
    };

    let Some(image_url) = document
        .select(&selectors.image)
        .next()
        .and_then(|el| el.value().attr("src"))
        .and_then(|src| resolve_image_src(page_url, src))
    else {
        return PostPage::Incomplete("image");
    };

    PostPage::SingleImage { title, image_url }
}

fn resolve_image_src(page_url: &Url, src: &str) -> Option<Url> {
    let src = src.trim();
    if src.starts_with("//") {
        Url::parse(&format!("https:{}", src)).ok()
    } else {
        page_url.join(src).ok()
    }
}
